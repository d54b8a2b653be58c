//! Particle and cell-instance state.
//!
//! A [`Particle`] is a mutable record advanced in place every frame by the
//! flow integrator; particles are created once at sketch start and never
//! destroyed. A [`CellInstance`] is the static counterpart used by the
//! cell-grid sketches: its XY never moves, only its z offset oscillates
//! with time and the field value under it.

use glam::{Vec2, Vec3};

/// Scene bounds in scene units (the scaled mask image dimensions).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Center of the scene, used as the camera target.
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

/// A single flow-field particle.
#[derive(Clone, Copy, Debug)]
pub struct Particle {
    /// Position in scene units; z is implicitly 0.
    pub position: Vec2,
    /// Current velocity.
    pub velocity: Vec2,
    /// Force accumulator; zeroed every frame after integration.
    pub acceleration: Vec2,
    /// Velocity magnitude cap. May be overwritten per frame when the sketch
    /// couples field strength to speed.
    pub max_speed: f32,
    /// Steering force magnitude cap.
    pub max_force: f32,
}

impl Particle {
    pub const DEFAULT_MAX_SPEED: f32 = 1.0;
    pub const DEFAULT_MAX_FORCE: f32 = 1.0;
    /// Initial downward drift shared by all particles.
    pub const INITIAL_VELOCITY: Vec2 = Vec2::new(0.0, -0.1);

    /// Create a particle at the given position with the standard initial
    /// velocity and limits.
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            velocity: Self::INITIAL_VELOCITY,
            acceleration: Vec2::ZERO,
            max_speed: Self::DEFAULT_MAX_SPEED,
            max_force: Self::DEFAULT_MAX_FORCE,
        }
    }

    /// Accumulate a force into the acceleration.
    pub fn apply_force(&mut self, force: Vec2) {
        self.acceleration += force;
    }

    /// Fold the accumulated acceleration into velocity, clamp the velocity
    /// magnitude to `max_speed`, zero the accumulator, and advance the
    /// position.
    pub fn integrate(&mut self) {
        self.velocity += self.acceleration;
        self.velocity = clamp_magnitude(self.velocity, self.max_speed);
        self.acceleration = Vec2::ZERO;
        self.position += self.velocity;
    }

    /// Wrap the position against the scene bounds.
    ///
    /// x wraps high-to-low only; y wraps in both directions. The asymmetry
    /// is deliberate and part of every sketch's look.
    pub fn wrap_edges(&mut self, bounds: Bounds) {
        if self.position.x > bounds.width {
            self.position.x = 0.0;
        }
        if self.position.y > bounds.height {
            self.position.y = 0.0;
        }
        if self.position.y < 0.0 {
            self.position.y = bounds.height - 1.0;
        }
    }
}

/// Clamp a vector's magnitude to `max`. A non-positive `max` collapses the
/// vector to zero.
pub fn clamp_magnitude(v: Vec2, max: f32) -> Vec2 {
    if max <= 0.0 {
        return Vec2::ZERO;
    }
    let len_sq = v.length_squared();
    if len_sq > max * max {
        v * (max / len_sq.sqrt())
    } else {
        v
    }
}

/// One instance of the static cell grid.
///
/// XY is fixed at creation; `offset.z` is recomputed every frame from
/// elapsed time and the field value of the cell this instance mirrors.
#[derive(Clone, Copy, Debug)]
pub struct CellInstance {
    /// Instance position written to the instance buffer.
    pub offset: Vec3,
    /// Per-instance rotation angle in radians.
    pub angle: f32,
    /// Flat index of the field cell this instance mirrors.
    pub index: u32,
}

impl CellInstance {
    pub fn new(offset: Vec3, angle: f32, index: u32) -> Self {
        Self {
            offset,
            angle,
            index,
        }
    }
}

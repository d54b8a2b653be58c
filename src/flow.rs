//! Flow integration: advancing particles and cells against the field.
//!
//! The integrator advances every particle by exactly one simulation step per
//! displayed frame. Each step looks up the field cell under the particle,
//! derives a steering value from it, applies the configured steering
//! strategy plus a constant bias force, integrates, and wraps against the
//! scene bounds.
//!
//! Two steering strategies exist, as distinct named variants so each can be
//! configured and tested directly:
//!
//! - [`Steering::SpeedFromField`] overwrites the particle's `max_speed` with
//!   the clamped field value. Bright cells let particles run, dark cells
//!   freeze them (or the reverse, with an inverted field).
//! - [`Steering::ForceFromField`] applies the clamped field value as a
//!   steering force along +x, leaving `max_speed` alone.
//!
//! No step can fail: out-of-range field lookups steer with a neutral zero.

use glam::{Vec2, Vec3};

use crate::field::FieldGrid;
use crate::particle::{Bounds, CellInstance, Particle};

/// How the field value under a particle steers it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Steering {
    /// Overwrite the particle's `max_speed` with the clamped field value.
    #[default]
    SpeedFromField,
    /// Apply the clamped field value as a force along +x.
    ForceFromField,
}

/// Per-frame particle integrator.
///
/// Holds its own scratch buffer of per-particle steering values; the buffer
/// is allocated once and reused every frame, and doubles as the input for
/// per-particle shading after the step.
pub struct FlowIntegrator {
    steering: Steering,
    bias: Vec2,
    steer_values: Vec<f32>,
}

impl FlowIntegrator {
    /// Constant downward bias applied to every particle every frame.
    pub const DEFAULT_BIAS: Vec2 = Vec2::new(0.0, -1.0);

    /// Create an integrator for `count` particles.
    pub fn new(steering: Steering, count: usize) -> Self {
        Self {
            steering,
            bias: Self::DEFAULT_BIAS,
            steer_values: vec![0.0; count],
        }
    }

    /// Override the constant bias force.
    pub fn with_bias(mut self, bias: Vec2) -> Self {
        self.bias = bias;
        self
    }

    /// The configured steering strategy.
    pub fn steering(&self) -> Steering {
        self.steering
    }

    /// Advance every particle by one step.
    ///
    /// `particles` must be the same slice every frame; its length may not
    /// exceed the count the integrator was created for.
    pub fn step(&mut self, particles: &mut [Particle], field: &FieldGrid, bounds: Bounds) {
        assert!(
            particles.len() <= self.steer_values.len(),
            "particle count grew past the integrator's capacity"
        );

        for (i, p) in particles.iter_mut().enumerate() {
            let raw = field.value_at(p.position);
            let steer = raw.clamp(-p.max_force, p.max_force);

            match self.steering {
                Steering::SpeedFromField => p.max_speed = steer,
                Steering::ForceFromField => p.apply_force(Vec2::new(steer, 0.0)),
            }
            p.apply_force(self.bias);

            p.integrate();
            p.wrap_edges(bounds);

            self.steer_values[i] = steer;
        }
    }

    /// Steering values computed by the last [`step`](Self::step), one per
    /// particle. Used as the shade interpolation factor.
    pub fn steer_values(&self) -> &[f32] {
        &self.steer_values
    }
}

/// Bright end of the particle shade ramp.
pub const SHADE_BRIGHT: Vec3 = Vec3::new(1.0, 1.0, 1.0);
/// Dark end of the particle shade ramp.
pub const SHADE_DARK: Vec3 = Vec3::new(0.0, 0.0, 0.0);

/// Particle color for a steering value: white at 0, black at 1.
pub fn shade(t: f32) -> Vec3 {
    SHADE_BRIGHT.lerp(SHADE_DARK, t.clamp(0.0, 1.0))
}

/// Per-frame oscillation for the static cell-grid sketches.
///
/// Each cell instance keeps its XY and swings its z offset with elapsed
/// time, scaled by the field value of the cell it mirrors: flat where the
/// field is silent, waving where it is strong.
#[derive(Clone, Copy, Debug)]
pub struct CellWave {
    amplitude: f32,
}

impl CellWave {
    pub const DEFAULT_AMPLITUDE: f32 = 10.0;

    pub fn new() -> Self {
        Self {
            amplitude: Self::DEFAULT_AMPLITUDE,
        }
    }

    /// Set the oscillation amplitude in scene units.
    pub fn with_amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Recompute every instance's z offset for the given elapsed time.
    pub fn step(&self, cells: &mut [CellInstance], field: &FieldGrid, elapsed: f32) {
        let swing = elapsed.sin() * self.amplitude;
        for cell in cells.iter_mut() {
            cell.offset.z = swing * field.value(cell.index as usize);
        }
    }
}

impl Default for CellWave {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker_field() -> FieldGrid {
        FieldGrid::from_values(
            4,
            4,
            1.0,
            1.0,
            vec![
                1.0, 0.0, 1.0, 0.0, //
                0.0, 1.0, 0.0, 1.0, //
                1.0, 0.0, 1.0, 0.0, //
                0.0, 1.0, 0.0, 1.0,
            ],
        )
    }

    #[test]
    fn test_speed_from_field_overwrites_max_speed() {
        let field = checker_field();
        let bounds = Bounds::new(field.width, field.height);
        let mut particles = vec![Particle::at(Vec2::new(0.5, 0.5))];

        let mut integrator = FlowIntegrator::new(Steering::SpeedFromField, 1);
        integrator.step(&mut particles, &field, bounds);

        assert_eq!(particles[0].max_speed, 1.0);
        assert_eq!(integrator.steer_values()[0], 1.0);
    }

    #[test]
    fn test_force_from_field_keeps_max_speed() {
        let field = checker_field();
        let bounds = Bounds::new(field.width, field.height);
        let mut particles = vec![Particle::at(Vec2::new(0.5, 0.5))];

        let mut integrator =
            FlowIntegrator::new(Steering::ForceFromField, 1).with_bias(Vec2::ZERO);
        integrator.step(&mut particles, &field, bounds);

        assert_eq!(particles[0].max_speed, Particle::DEFAULT_MAX_SPEED);
        // Field pushed along +x.
        assert!(particles[0].velocity.x > 0.0);
    }

    #[test]
    fn test_out_of_range_lookup_is_neutral() {
        let field = checker_field();
        let bounds = Bounds::new(100.0, 100.0);
        // Outside the 4x4 field but inside the bounds.
        let mut particles = vec![Particle::at(Vec2::new(50.0, 50.0))];

        let mut integrator =
            FlowIntegrator::new(Steering::ForceFromField, 1).with_bias(Vec2::ZERO);
        integrator.step(&mut particles, &field, bounds);

        // Neutral steering: only the initial drift remains.
        assert_eq!(particles[0].velocity, Particle::INITIAL_VELOCITY);
        assert_eq!(integrator.steer_values()[0], 0.0);
    }

    #[test]
    fn test_velocity_clamped_after_many_steps() {
        let field = checker_field();
        let bounds = Bounds::new(field.width, field.height);
        let mut particles: Vec<Particle> = (0..8)
            .map(|i| Particle::at(Vec2::new(i as f32 * 0.5, 2.0)))
            .collect();

        let mut integrator = FlowIntegrator::new(Steering::ForceFromField, particles.len());
        for _ in 0..100 {
            integrator.step(&mut particles, &field, bounds);
            for p in &particles {
                assert!(p.velocity.length() <= p.max_speed + 1e-5);
            }
        }
    }

    #[test]
    fn test_scratch_buffer_never_grows() {
        let field = checker_field();
        let bounds = Bounds::new(field.width, field.height);
        let mut particles = vec![Particle::at(Vec2::ZERO); 16];

        let mut integrator = FlowIntegrator::new(Steering::SpeedFromField, 16);
        let before = integrator.steer_values().len();
        for _ in 0..10 {
            integrator.step(&mut particles, &field, bounds);
        }
        assert_eq!(integrator.steer_values().len(), before);
    }

    #[test]
    fn test_shade_endpoints() {
        assert_eq!(shade(0.0), SHADE_BRIGHT);
        assert_eq!(shade(1.0), SHADE_DARK);
        let mid = shade(0.5);
        assert!((mid.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_cell_wave_scales_with_field() {
        let field = checker_field();
        let mut cells: Vec<CellInstance> = (0..16)
            .map(|i| CellInstance::new(Vec3::new(i as f32, 0.0, 0.0), 0.0, i))
            .collect();

        let wave = CellWave::new().with_amplitude(2.0);
        let t = 1.0_f32;
        wave.step(&mut cells, &field, t);

        // Cells over silent field stay flat; active cells swing.
        assert_eq!(cells[1].offset.z, 0.0);
        assert!((cells[0].offset.z - t.sin() * 2.0).abs() < 1e-6);
        // XY untouched.
        assert_eq!(cells[5].offset.x, 5.0);
    }

    #[test]
    fn test_cell_wave_at_zero_time() {
        let field = checker_field();
        let mut cells = vec![CellInstance::new(Vec3::new(0.0, 0.0, 5.0), 0.0, 0)];
        CellWave::new().step(&mut cells, &field, 0.0);
        assert_eq!(cells[0].offset.z, 0.0);
    }
}

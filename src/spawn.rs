//! Spawn helpers for laying out particles and cell instances.
//!
//! A [`SpawnContext`] wraps a small seeded RNG plus the index of the
//! instance being spawned, so sketch setup code stays short:
//!
//! ```ignore
//! let particles: Vec<Particle> = (0..count)
//!     .map(|i| {
//!         let mut ctx = SpawnContext::new(i, count, bounds);
//!         Particle::at(ctx.random_in_bounds())
//!     })
//!     .collect();
//! ```
//!
//! Seeding mixes the instance index with wall-clock nanoseconds: layouts
//! differ between runs but stay independent per instance.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

use crate::particle::Bounds;

/// Context provided per spawned instance with randomization helpers.
pub struct SpawnContext {
    /// Index of the instance being spawned (0 to count-1).
    pub index: u32,
    /// Total number of instances being spawned.
    pub count: u32,
    /// Scene bounds instances are placed within.
    pub bounds: Bounds,
    rng: SmallRng,
}

impl SpawnContext {
    /// Create a spawn context for one instance.
    pub fn new(index: u32, count: u32, bounds: Bounds) -> Self {
        let seed = index as u64
            ^ (std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(42));

        Self {
            index,
            count,
            bounds,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Deterministic variant for reproducible layouts and tests.
    pub fn with_seed(index: u32, count: u32, bounds: Bounds, seed: u64) -> Self {
        Self {
            index,
            count,
            bounds,
            rng: SmallRng::seed_from_u64(seed ^ index as u64),
        }
    }

    /// Normalized progress through the spawn (0.0 to 1.0).
    #[inline]
    pub fn progress(&self) -> f32 {
        self.index as f32 / self.count as f32
    }

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in the given range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        self.rng.gen_range(min..max)
    }

    /// Random angle in radians.
    #[inline]
    pub fn random_angle(&mut self) -> f32 {
        self.rng.gen_range(0.0..TAU)
    }

    /// Random point within the scene bounds.
    pub fn random_in_bounds(&mut self) -> Vec2 {
        Vec2::new(
            self.rng.gen::<f32>() * self.bounds.width,
            self.rng.gen::<f32>() * self.bounds.height,
        )
    }

    /// Position on a 2D grid filling the bounds, one slot per instance.
    ///
    /// Instance `i` lands in column `i % cols`, row `i / cols`.
    pub fn grid_position(&self, cols: u32, rows: u32) -> Vec2 {
        let idx = self.index % (cols * rows);
        let x = idx % cols;
        let y = idx / cols;

        Vec2::new(
            (x as f32 + 0.5) / cols as f32 * self.bounds.width,
            (y as f32 + 0.5) / rows as f32 * self.bounds.height,
        )
    }

    /// Grid position jittered by up to half a cell in each direction.
    pub fn jittered_grid_position(&mut self, cols: u32, rows: u32) -> Vec2 {
        let base = self.grid_position(cols, rows);
        let half_w = self.bounds.width / cols as f32 * 0.5;
        let half_h = self.bounds.height / rows as f32 * 0.5;
        base + Vec2::new(
            self.random_range(-half_w, half_w),
            self.random_range(-half_h, half_h),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress() {
        let ctx = SpawnContext::new(50, 100, Bounds::new(10.0, 10.0));
        assert!((ctx.progress() - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_random_in_bounds() {
        let bounds = Bounds::new(320.0, 240.0);
        let mut ctx = SpawnContext::with_seed(0, 1, bounds, 7);
        for _ in 0..100 {
            let p = ctx.random_in_bounds();
            assert!(p.x >= 0.0 && p.x <= bounds.width);
            assert!(p.y >= 0.0 && p.y <= bounds.height);
        }
    }

    #[test]
    fn test_seeded_reproducible() {
        let bounds = Bounds::new(100.0, 100.0);
        let mut a = SpawnContext::with_seed(3, 10, bounds, 99);
        let mut b = SpawnContext::with_seed(3, 10, bounds, 99);
        assert_eq!(a.random_in_bounds(), b.random_in_bounds());
    }

    #[test]
    fn test_grid_position_corners() {
        let bounds = Bounds::new(100.0, 100.0);
        let first = SpawnContext::with_seed(0, 16, bounds, 0).grid_position(4, 4);
        let last = SpawnContext::with_seed(15, 16, bounds, 0).grid_position(4, 4);

        assert_eq!(first, Vec2::new(12.5, 12.5));
        assert_eq!(last, Vec2::new(87.5, 87.5));
    }
}

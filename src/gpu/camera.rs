//! Orbit camera for viewing a sketch.

use glam::{Mat4, Vec3};

use crate::particle::Bounds;

/// Orbit camera: yaw/pitch around a fixed target, distance on scroll.
pub struct Camera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
}

impl Camera {
    /// Create a camera framing the given scene bounds, targeting the
    /// scene center. Set up once at scene construction.
    pub fn framing(bounds: Bounds) -> Self {
        let center = bounds.center();
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance: bounds.height.max(bounds.width) * 1.4,
            target: Vec3::new(center.x, center.y, 0.0),
        }
    }

    /// The camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// The view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    /// Combined view-projection matrix for the given aspect ratio.
    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let proj = Mat4::perspective_rh(
            45.0_f32.to_radians(),
            aspect,
            0.1,
            self.distance * 10.0,
        );
        proj * self.view_matrix()
    }

    /// Apply a mouse drag in pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * 0.005;
        self.pitch = (self.pitch + dy * 0.005).clamp(-1.5, 1.5);
    }

    /// Apply a scroll delta.
    pub fn zoom(&mut self, scroll: f32) {
        self.distance = (self.distance - scroll * self.distance * 0.1).max(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framing_targets_center() {
        let camera = Camera::framing(Bounds::new(200.0, 100.0));
        assert_eq!(camera.target, Vec3::new(100.0, 50.0, 0.0));
        assert!(camera.distance > 100.0);
    }

    #[test]
    fn test_position_at_zero_angles() {
        let camera = Camera::framing(Bounds::new(100.0, 100.0));
        let pos = camera.position();
        // Zero yaw/pitch: straight out along +z from the target.
        assert!((pos.x - camera.target.x).abs() < 1e-4);
        assert!((pos.y - camera.target.y).abs() < 1e-4);
        assert!(pos.z > 0.0);
    }

    #[test]
    fn test_pitch_clamped() {
        let mut camera = Camera::framing(Bounds::new(100.0, 100.0));
        camera.orbit(0.0, 1e6);
        assert!(camera.pitch <= 1.5);
    }
}

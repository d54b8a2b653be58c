//! Bridging simulation state into flat per-instance attribute buffers.
//!
//! The renderer draws one mesh many times, positioned and colored by flat
//! per-instance attribute data. After the integrator has advanced all
//! state for a frame, the bridge copies the relevant scalars into a
//! staging buffer at `index * stride + k` and marks the buffer dirty
//! exactly once - not per instance - so the harness re-uploads it at most
//! once per frame.
//!
//! Buffers are allocated once at sketch construction and never resized;
//! a frame's bridge pass is O(n) with no allocation.

use bytemuck::cast_slice;

use crate::flow::shade;
use crate::particle::{CellInstance, Particle};

/// A fixed-size staging buffer for one per-instance attribute.
#[derive(Debug)]
pub struct InstanceBuffer {
    data: Vec<f32>,
    stride: usize,
    dirty: bool,
}

impl InstanceBuffer {
    /// Allocate a buffer for `count` instances of `stride` floats each.
    /// This is the only allocation the buffer ever makes.
    pub fn new(count: usize, stride: usize) -> Self {
        assert!(stride > 0, "instance stride must be at least 1");
        Self {
            data: vec![0.0; count * stride],
            stride,
            dirty: false,
        }
    }

    /// Number of instances.
    pub fn count(&self) -> usize {
        self.data.len() / self.stride
    }

    /// Floats per instance.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Total float count (`count * stride`). Constant for the buffer's
    /// lifetime.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer holds no instances.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write one instance's attribute values. `values` must hold exactly
    /// `stride` floats.
    #[inline]
    pub fn write(&mut self, index: usize, values: &[f32]) {
        debug_assert_eq!(values.len(), self.stride);
        let at = index * self.stride;
        self.data[at..at + self.stride].copy_from_slice(values);
    }

    /// Mark the buffer as changed since the last upload.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether the buffer changed since the last upload.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag, returning whether an upload is due. The
    /// harness calls this once per frame before `queue.write_buffer`.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// Raw float contents.
    pub fn as_floats(&self) -> &[f32] {
        &self.data
    }

    /// Contents as bytes, ready for the GPU queue.
    pub fn as_bytes(&self) -> &[u8] {
        cast_slice(&self.data)
    }
}

/// Copy particle positions into an offset buffer (stride 3: x, y, 0).
pub fn bridge_particle_offsets(offsets: &mut InstanceBuffer, particles: &[Particle]) {
    debug_assert_eq!(offsets.stride(), 3);
    for (i, p) in particles.iter().enumerate() {
        offsets.write(i, &[p.position.x, p.position.y, 0.0]);
    }
    offsets.mark_dirty();
}

/// Copy per-particle shades into a color buffer (stride 3: r, g, b),
/// interpolating the shade ramp by each particle's steering value.
pub fn bridge_particle_colors(colors: &mut InstanceBuffer, steer_values: &[f32]) {
    debug_assert_eq!(colors.stride(), 3);
    for (i, &t) in steer_values.iter().enumerate() {
        let c = shade(t);
        colors.write(i, &[c.x, c.y, c.z]);
    }
    colors.mark_dirty();
}

/// Copy cell offsets into an offset buffer (stride 3).
pub fn bridge_cell_offsets(offsets: &mut InstanceBuffer, cells: &[CellInstance]) {
    debug_assert_eq!(offsets.stride(), 3);
    for (i, cell) in cells.iter().enumerate() {
        offsets.write(i, &[cell.offset.x, cell.offset.y, cell.offset.z]);
    }
    offsets.mark_dirty();
}

/// Copy the static per-cell attributes (angle, instance index) into their
/// buffers (stride 1 each). Runs once at init; these never change.
pub fn bridge_cell_statics(
    angles: &mut InstanceBuffer,
    indices: &mut InstanceBuffer,
    cells: &[CellInstance],
) {
    debug_assert_eq!(angles.stride(), 1);
    debug_assert_eq!(indices.stride(), 1);
    for (i, cell) in cells.iter().enumerate() {
        angles.write(i, &[cell.angle]);
        indices.write(i, &[cell.index as f32]);
    }
    angles.mark_dirty();
    indices.mark_dirty();
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};

    #[test]
    fn test_len_is_count_times_stride() {
        let buf = InstanceBuffer::new(100, 3);
        assert_eq!(buf.len(), 300);
        assert_eq!(buf.count(), 100);
        assert_eq!(buf.stride(), 3);
    }

    #[test]
    fn test_len_constant_after_writes() {
        let mut buf = InstanceBuffer::new(10, 3);
        let before = buf.len();
        for i in 0..10 {
            buf.write(i, &[1.0, 2.0, 3.0]);
        }
        assert_eq!(buf.len(), before);
    }

    #[test]
    fn test_dirty_cycle() {
        let mut buf = InstanceBuffer::new(4, 1);
        assert!(!buf.is_dirty());
        buf.mark_dirty();
        assert!(buf.is_dirty());
        assert!(buf.take_dirty());
        assert!(!buf.is_dirty());
        assert!(!buf.take_dirty());
    }

    #[test]
    fn test_bridge_particle_offsets() {
        let particles = vec![
            Particle::at(Vec2::new(1.0, 2.0)),
            Particle::at(Vec2::new(3.0, 4.0)),
        ];
        let mut offsets = InstanceBuffer::new(2, 3);
        bridge_particle_offsets(&mut offsets, &particles);

        assert_eq!(offsets.as_floats(), &[1.0, 2.0, 0.0, 3.0, 4.0, 0.0]);
        assert!(offsets.is_dirty());
    }

    #[test]
    fn test_bridge_particle_colors() {
        let mut colors = InstanceBuffer::new(2, 3);
        bridge_particle_colors(&mut colors, &[0.0, 1.0]);

        // First particle white, second black.
        assert_eq!(colors.as_floats(), &[1.0, 1.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_bridge_cell_offsets_and_statics() {
        let cells = vec![
            CellInstance::new(Vec3::new(1.0, 2.0, 3.0), 0.5, 0),
            CellInstance::new(Vec3::new(4.0, 5.0, 6.0), 1.5, 1),
        ];
        let mut offsets = InstanceBuffer::new(2, 3);
        let mut angles = InstanceBuffer::new(2, 1);
        let mut indices = InstanceBuffer::new(2, 1);

        bridge_cell_offsets(&mut offsets, &cells);
        bridge_cell_statics(&mut angles, &mut indices, &cells);

        assert_eq!(offsets.as_floats(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(angles.as_floats(), &[0.5, 1.5]);
        assert_eq!(indices.as_floats(), &[0.0, 1.0]);
    }

    #[test]
    fn test_as_bytes_length() {
        let buf = InstanceBuffer::new(5, 3);
        assert_eq!(buf.as_bytes().len(), 5 * 3 * 4);
    }
}

//! # maskflow - image-driven flow field sketches
//!
//! Small generative-art sketches: thousands of instanced particles (or one
//! instance per grid cell) steered by the brightness of a mask image,
//! rendered in real time with wgpu, optionally perturbed by a decaying
//! mouse-trail texture.
//!
//! ## Quick Start
//!
//! ```ignore
//! use maskflow::prelude::*;
//!
//! fn main() -> Result<(), SketchError> {
//!     SketchConfig::new("mask.jpeg")
//!         .with_field(FieldConfig::new(100).inverted(true))
//!         .with_particles(10_000, Steering::SpeedFromField)
//!         .run()
//! }
//! ```
//!
//! ## How a sketch works
//!
//! 1. The mask image is decoded once and downsampled into a
//!    [`FieldGrid`](field::FieldGrid): one brightness scalar per grid cell.
//! 2. Particles (or static cell instances) are spawned once.
//! 3. Every displayed frame, the flow integrator advances each particle
//!    against the field - looking up the cell under it, steering, applying
//!    a constant bias, integrating with a velocity clamp, and wrapping at
//!    the scene edges - or re-derives each cell's z offset from elapsed
//!    time and its field value.
//! 4. The attribute bridge copies the results into flat staging buffers
//!    and marks them dirty once; the harness uploads each dirty buffer to
//!    its GPU instance buffer and draws.
//!
//! Buffers are allocated once at start and never resized; a frame does no
//! allocation.
//!
//! ## Steering strategies
//!
//! The field can drive particles two ways, chosen per sketch:
//!
//! - [`Steering::SpeedFromField`](flow::Steering::SpeedFromField) - the
//!   field value overwrites each particle's speed cap. Motion stalls in
//!   weak cells and flows through strong ones.
//! - [`Steering::ForceFromField`](flow::Steering::ForceFromField) - the
//!   field value pushes particles sideways as a force.
//!
//! ## Pointer trail
//!
//! With [`SketchConfig::with_trail`](sketch::SketchConfig::with_trail),
//! pointer positions accumulate in an offscreen raster as decaying radial
//! gradients, uploaded as a texture the shader samples - mouse proximity
//! brightens the sketch around the cursor.

pub mod bridge;
pub mod error;
pub mod field;
pub mod flow;
mod gpu;
mod harness;
pub mod input;
pub mod particle;
pub mod shader;
pub mod sketch;
pub mod spawn;
pub mod textures;
pub mod time;
pub mod trail;

pub use bridge::InstanceBuffer;
pub use error::{GpuError, MaskError, SketchError};
pub use field::{FieldConfig, FieldGrid};
pub use flow::{CellWave, FlowIntegrator, Steering};
pub use glam::{Vec2, Vec3};
pub use particle::{Bounds, CellInstance, Particle};
pub use sketch::{MaskSource, Sketch, SketchConfig, SketchKind};
pub use spawn::SpawnContext;
pub use textures::MaskImage;
pub use trail::TrailCanvas;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use maskflow::prelude::*;
/// ```
pub mod prelude {
    pub use crate::bridge::InstanceBuffer;
    pub use crate::error::{GpuError, MaskError, SketchError};
    pub use crate::field::{FieldConfig, FieldGrid};
    pub use crate::flow::{CellWave, FlowIntegrator, Steering};
    pub use crate::particle::{Bounds, CellInstance, Particle};
    pub use crate::sketch::{MaskSource, Sketch, SketchConfig, SketchKind};
    pub use crate::spawn::SpawnContext;
    pub use crate::textures::MaskImage;
    pub use crate::time::Time;
    pub use crate::trail::TrailCanvas;
    pub use crate::{Vec2, Vec3};
}

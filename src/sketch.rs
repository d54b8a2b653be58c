//! Sketch configuration and per-frame simulation state.
//!
//! A sketch is configured with method chaining and then either built for
//! manual driving or run directly:
//!
//! ```ignore
//! use maskflow::prelude::*;
//!
//! SketchConfig::new("mask.jpeg")
//!     .with_field(FieldConfig::new(100).inverted(true))
//!     .with_particles(10_000, Steering::SpeedFromField)
//!     .run()?;
//! ```
//!
//! The built [`Sketch`] owns everything the simulation touches: the mask,
//! the sampled field, the particle or cell state, the staging instance
//! buffers and the optional trail canvas. [`Sketch::advance`] performs
//! exactly one simulation step per call - the harness calls it once per
//! displayed frame, then hands the sketch to the GPU state for upload.

use std::path::PathBuf;

use glam::{Vec2, Vec3};

use crate::bridge::{
    bridge_cell_offsets, bridge_cell_statics, bridge_particle_colors, bridge_particle_offsets,
    InstanceBuffer,
};
use crate::error::SketchError;
use crate::field::{FieldConfig, FieldGrid};
use crate::flow::{CellWave, FlowIntegrator, Steering};
use crate::particle::{Bounds, CellInstance, Particle};
use crate::spawn::SpawnContext;
use crate::textures::MaskImage;
use crate::time::Time;
use crate::trail::TrailCanvas;

/// Where the mask comes from.
pub enum MaskSource {
    /// Load and decode from a file at build time.
    Path(PathBuf),
    /// Use an already-built image (procedural masks, tests).
    Image(MaskImage),
}

impl From<&str> for MaskSource {
    fn from(path: &str) -> Self {
        MaskSource::Path(PathBuf::from(path))
    }
}

impl From<String> for MaskSource {
    fn from(path: String) -> Self {
        MaskSource::Path(PathBuf::from(path))
    }
}

impl From<MaskImage> for MaskSource {
    fn from(mask: MaskImage) -> Self {
        MaskSource::Image(mask)
    }
}

/// What a sketch simulates and draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SketchKind {
    /// Moving particles steered by the field.
    Particles,
    /// One static instance per field cell, oscillating in z.
    Cells,
}

enum Mode {
    Particles { count: u32, steering: Steering },
    Cells,
}

/// Builder for a sketch.
pub struct SketchConfig {
    mask: MaskSource,
    field: FieldConfig,
    mode: Mode,
    bias: Vec2,
    amplitude: f32,
    trail: Option<(u32, u32)>,
    seed: Option<u64>,
    title: String,
}

impl SketchConfig {
    /// Create a configuration for the given mask source.
    pub fn new(mask: impl Into<MaskSource>) -> Self {
        Self {
            mask: mask.into(),
            field: FieldConfig::default(),
            mode: Mode::Particles {
                count: 10_000,
                steering: Steering::SpeedFromField,
            },
            bias: FlowIntegrator::DEFAULT_BIAS,
            amplitude: CellWave::DEFAULT_AMPLITUDE,
            trail: None,
            seed: None,
            title: "maskflow".to_string(),
        }
    }

    /// Set the field sampling configuration.
    pub fn with_field(mut self, field: FieldConfig) -> Self {
        self.field = field;
        self
    }

    /// Simulate moving particles with the given count and steering
    /// strategy.
    pub fn with_particles(mut self, count: u32, steering: Steering) -> Self {
        self.mode = Mode::Particles { count, steering };
        self
    }

    /// Simulate one static cell instance per field cell.
    pub fn with_cells(mut self) -> Self {
        self.mode = Mode::Cells;
        self
    }

    /// Override the constant bias force applied to every particle.
    pub fn with_bias(mut self, bias: Vec2) -> Self {
        self.bias = bias;
        self
    }

    /// Set the cell-wave oscillation amplitude in scene units.
    pub fn with_amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Enable the pointer-trail texture with the given raster size.
    /// Should match the window size so pointer coordinates land where the
    /// pointer is.
    pub fn with_trail(mut self, width: u32, height: u32) -> Self {
        self.trail = Some((width, height));
        self
    }

    /// Seed the spawn RNG for a reproducible layout.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the window title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Load the mask, sample the field, and assemble the simulation state.
    pub fn build(self) -> Result<Sketch, SketchError> {
        let mask = match self.mask {
            MaskSource::Path(path) => MaskImage::open(path)?,
            MaskSource::Image(mask) => mask,
        };

        let field = FieldGrid::sample(&mask, &self.field);
        let bounds = Bounds::new(field.width, field.height);

        let seed = self.seed;
        let spawn = move |i: u32, count: u32| match seed {
            Some(seed) => SpawnContext::with_seed(i, count, bounds, seed),
            None => SpawnContext::new(i, count, bounds),
        };

        let sim = match self.mode {
            Mode::Particles { count, steering } => {
                let particles: Vec<Particle> = (0..count)
                    .map(|i| {
                        let mut ctx = spawn(i, count);
                        Particle::at(ctx.random_in_bounds())
                    })
                    .collect();

                let integrator = FlowIntegrator::new(steering, particles.len()).with_bias(self.bias);
                let mut offsets = InstanceBuffer::new(particles.len(), 3);
                let mut colors = InstanceBuffer::new(particles.len(), 3);
                bridge_particle_offsets(&mut offsets, &particles);
                bridge_particle_colors(&mut colors, integrator.steer_values());

                SimState::Particles {
                    particles,
                    integrator,
                    offsets,
                    colors,
                }
            }
            Mode::Cells => {
                let count = field.len() as u32;
                let cells: Vec<CellInstance> = (0..count)
                    .map(|i| {
                        let mut ctx = spawn(i, count);
                        let pos = ctx.jittered_grid_position(field.cols, field.rows);
                        CellInstance::new(Vec3::new(pos.x, pos.y, 0.0), ctx.random_angle(), i)
                    })
                    .collect();

                let mut offsets = InstanceBuffer::new(cells.len(), 3);
                let mut angles = InstanceBuffer::new(cells.len(), 1);
                let mut indices = InstanceBuffer::new(cells.len(), 1);
                bridge_cell_offsets(&mut offsets, &cells);
                bridge_cell_statics(&mut angles, &mut indices, &cells);

                SimState::Cells {
                    cells,
                    wave: CellWave::new().with_amplitude(self.amplitude),
                    offsets,
                    angles,
                    indices,
                }
            }
        };

        Ok(Sketch {
            mask,
            field,
            bounds,
            sim,
            trail: self.trail.map(|(w, h)| TrailCanvas::new(w, h)),
            time: Time::new(),
            title: self.title,
        })
    }

    /// Build the sketch and run it in a window. Blocks until the window
    /// closes.
    pub fn run(self) -> Result<(), SketchError> {
        crate::harness::run(self.build()?)
    }
}

enum SimState {
    Particles {
        particles: Vec<Particle>,
        integrator: FlowIntegrator,
        offsets: InstanceBuffer,
        colors: InstanceBuffer,
    },
    Cells {
        cells: Vec<CellInstance>,
        wave: CellWave,
        offsets: InstanceBuffer,
        angles: InstanceBuffer,
        indices: InstanceBuffer,
    },
}

/// A built sketch: all CPU-side simulation state for one run.
pub struct Sketch {
    mask: MaskImage,
    field: FieldGrid,
    bounds: Bounds,
    sim: SimState,
    trail: Option<TrailCanvas>,
    time: Time,
    title: String,
}

impl Sketch {
    /// What this sketch simulates.
    pub fn kind(&self) -> SketchKind {
        match self.sim {
            SimState::Particles { .. } => SketchKind::Particles,
            SimState::Cells { .. } => SketchKind::Cells,
        }
    }

    /// Scene bounds (the scaled mask dimensions).
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// The mask image driving this sketch.
    pub fn mask(&self) -> &MaskImage {
        &self.mask
    }

    /// The sampled field.
    pub fn field(&self) -> &FieldGrid {
        &self.field
    }

    /// Window title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Number of drawn instances.
    pub fn instance_count(&self) -> u32 {
        self.offsets().count() as u32
    }

    /// Half-extent of a cell quad in scene units.
    pub fn cell_scale(&self) -> f32 {
        self.field.cell_width.min(self.field.cell_height) * 0.45
    }

    /// Offset staging buffer (stride 3), present in every mode.
    pub fn offsets(&self) -> &InstanceBuffer {
        match &self.sim {
            SimState::Particles { offsets, .. } => offsets,
            SimState::Cells { offsets, .. } => offsets,
        }
    }

    pub fn offsets_mut(&mut self) -> &mut InstanceBuffer {
        match &mut self.sim {
            SimState::Particles { offsets, .. } => offsets,
            SimState::Cells { offsets, .. } => offsets,
        }
    }

    /// Color staging buffer, particle sketches only.
    pub fn colors(&self) -> Option<&InstanceBuffer> {
        match &self.sim {
            SimState::Particles { colors, .. } => Some(colors),
            SimState::Cells { .. } => None,
        }
    }

    pub fn colors_mut(&mut self) -> Option<&mut InstanceBuffer> {
        match &mut self.sim {
            SimState::Particles { colors, .. } => Some(colors),
            SimState::Cells { .. } => None,
        }
    }

    /// Angle staging buffer, cell sketches only.
    pub fn angles(&self) -> Option<&InstanceBuffer> {
        match &self.sim {
            SimState::Cells { angles, .. } => Some(angles),
            SimState::Particles { .. } => None,
        }
    }

    pub fn angles_mut(&mut self) -> Option<&mut InstanceBuffer> {
        match &mut self.sim {
            SimState::Cells { angles, .. } => Some(angles),
            SimState::Particles { .. } => None,
        }
    }

    /// Instance-index staging buffer, cell sketches only.
    pub fn cell_indices(&self) -> Option<&InstanceBuffer> {
        match &self.sim {
            SimState::Cells { indices, .. } => Some(indices),
            SimState::Particles { .. } => None,
        }
    }

    pub fn cell_indices_mut(&mut self) -> Option<&mut InstanceBuffer> {
        match &mut self.sim {
            SimState::Cells { indices, .. } => Some(indices),
            SimState::Particles { .. } => None,
        }
    }

    /// The trail canvas, when enabled.
    pub fn trail(&self) -> Option<&TrailCanvas> {
        self.trail.as_ref()
    }

    pub fn trail_mut(&mut self) -> Option<&mut TrailCanvas> {
        self.trail.as_mut()
    }

    /// The particles, for inspection. Empty for cell sketches.
    pub fn particles(&self) -> &[Particle] {
        match &self.sim {
            SimState::Particles { particles, .. } => particles,
            SimState::Cells { .. } => &[],
        }
    }

    /// Record a pointer position into the trail, if one is enabled.
    pub fn record_pointer(&mut self, x: f32, y: f32) {
        if let Some(trail) = &mut self.trail {
            trail.record(x, y);
        }
    }

    /// Run exactly one simulation step: advance time, the trail, the
    /// particle or cell state, and re-bridge the instance buffers.
    ///
    /// Returns `(elapsed, delta)` seconds for the frame's uniforms.
    pub fn advance(&mut self) -> (f32, f32) {
        let (elapsed, delta) = self.time.update();

        if let Some(trail) = &mut self.trail {
            trail.advance();
        }

        match &mut self.sim {
            SimState::Particles {
                particles,
                integrator,
                offsets,
                colors,
            } => {
                integrator.step(particles, &self.field, self.bounds);
                bridge_particle_offsets(offsets, particles);
                bridge_particle_colors(colors, integrator.steer_values());
            }
            SimState::Cells {
                cells,
                wave,
                offsets,
                ..
            } => {
                wave.step(cells, &self.field, elapsed);
                bridge_cell_offsets(offsets, cells);
            }
        }

        (elapsed, delta)
    }
}

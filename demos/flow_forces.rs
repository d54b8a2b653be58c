//! Flow field particles, force-steered.
//!
//! Same field, different coupling: the brightness under each particle
//! pushes it sideways as a force while gravity pulls it down, tracing
//! diagonal streaks through the bright regions.
//! Run with: cargo run --example flow_forces [mask.jpeg]

use maskflow::prelude::*;

fn main() -> Result<(), SketchError> {
    let mask = match std::env::args().nth(1) {
        Some(path) => MaskImage::open(path)?,
        None => MaskImage::checkerboard(512, 64),
    };

    SketchConfig::new(mask)
        .with_field(FieldConfig::new(100))
        .with_particles(10_000, Steering::ForceFromField)
        .with_bias(Vec2::new(0.0, -1.0))
        .with_title("maskflow - flow forces")
        .run()
}

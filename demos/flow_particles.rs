//! Flow field particles, speed-steered.
//!
//! Ten thousand particles drift downward across the mask; the inverted
//! brightness field sets each particle's speed cap, so motion pools in the
//! bright regions of the source and streams through the dark ones.
//! Run with: cargo run --example flow_particles [mask.jpeg]

use maskflow::prelude::*;

fn main() -> Result<(), SketchError> {
    let mask = match std::env::args().nth(1) {
        Some(path) => MaskImage::open(path)?,
        None => MaskImage::noise(512, 42),
    };

    SketchConfig::new(mask)
        .with_field(FieldConfig::new(100).inverted(true))
        .with_particles(10_000, Steering::SpeedFromField)
        .with_title("maskflow - flow particles")
        .run()
}

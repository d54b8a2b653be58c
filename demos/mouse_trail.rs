//! Pointer-trail particles.
//!
//! The speed-steered particle sketch with the mouse-trail texture enabled:
//! moving the pointer leaves a decaying glow in an offscreen raster, and
//! the shader brightens particles near it. The trail raster matches the
//! window size so pointer coordinates land where the pointer is.
//! Run with: cargo run --example mouse_trail [mask.jpeg]

use maskflow::prelude::*;

fn main() -> Result<(), SketchError> {
    let mask = match std::env::args().nth(1) {
        Some(path) => MaskImage::open(path)?,
        None => MaskImage::noise(512, 21),
    };

    SketchConfig::new(mask)
        .with_field(FieldConfig::new(100).inverted(true))
        .with_particles(10_000, Steering::SpeedFromField)
        .with_trail(1280, 720)
        .with_title("maskflow - mouse trail")
        .run()
}

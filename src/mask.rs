// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! External mask layers
//!
//! A host hands the carver masks (areas to preserve, areas to discard,
//! areas that should resist crooked seams) as ordinary pixel buffers.
//! A mask need not be the size of the image: it is placed at an offset
//! and only the overlapping pixels count.

use crate::error::{invalid_geometry, Result};

/// A borrowed mask buffer and its placement over the image.
#[derive(Debug, Clone, Copy)]
pub struct MaskLayer<'a> {
    /// Row-major samples, `width * height * bpp` bytes.
    pub pixels: &'a [u8],
    /// Layer width in pixels.
    pub width: usize,
    /// Layer height in pixels.
    pub height: usize,
    /// Channels per pixel, 1 to 4.  With 2 or 4 channels the last one
    /// is alpha.
    pub bpp: usize,
    /// Image coordinate of the layer's top-left pixel.
    pub offset: (i64, i64),
}

impl<'a> MaskLayer<'a> {
    /// A layer placed at the image origin.
    pub fn new(pixels: &'a [u8], width: usize, height: usize, bpp: usize) -> Self {
        MaskLayer {
            pixels,
            width,
            height,
            bpp,
            offset: (0, 0),
        }
    }

    /// Move the layer to `(dx, dy)`.
    pub fn at(mut self, dx: i64, dy: i64) -> Self {
        self.offset = (dx, dy);
        self
    }

    /// Check the buffer against the declared geometry.
    pub fn validate(&self) -> Result<()> {
        if self.bpp == 0 || self.bpp > 4 {
            return Err(invalid_geometry(format!(
                "mask layers carry 1 to 4 channels, not {}",
                self.bpp
            )));
        }
        let expected = self.width * self.height * self.bpp;
        if self.pixels.len() != expected {
            return Err(invalid_geometry(format!(
                "a {}x{}x{} mask needs {} bytes, got {}",
                self.width,
                self.height,
                self.bpp,
                expected,
                self.pixels.len()
            )));
        }
        Ok(())
    }

    /// Mask strength at layer pixel `(x, y)`: mean color times alpha,
    /// in `[0, 1]`.
    pub fn intensity(&self, x: usize, y: usize) -> f64 {
        let start = (y * self.width + x) * self.bpp;
        let pixel = &self.pixels[start..start + self.bpp];
        let (color, alpha) = match self.bpp {
            2 | 4 => (&pixel[..self.bpp - 1], f64::from(pixel[self.bpp - 1]) / 255.0),
            _ => (pixel, 1.0),
        };
        let sum: u32 = color.iter().map(|&c| u32::from(c)).sum();
        f64::from(sum) / (255.0 * color.len() as f64) * alpha
    }

    /// Every layer pixel that lands inside a `width` x `height` image,
    /// as `(image_x, image_y, intensity)`.
    pub fn overlap(self, width: usize, height: usize) -> impl Iterator<Item = (usize, usize, f64)> + 'a {
        let (dx, dy) = self.offset;
        (0..self.height).flat_map(move |ly| {
            (0..self.width).filter_map(move |lx| {
                let (ix, iy) = (lx as i64 + dx, ly as i64 + dy);
                if ix < 0 || iy < 0 || ix >= width as i64 || iy >= height as i64 {
                    None
                } else {
                    Some((ix as usize, iy as usize, self.intensity(lx, ly)))
                }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_scales_intensity() {
        let pixels = [255, 255, 255, 255, 255, 255, 255, 0, 0, 0, 0, 255];
        let layer = MaskLayer::new(&pixels, 3, 1, 4);
        assert_eq!(layer.intensity(0, 0), 1.0);
        assert_eq!(layer.intensity(1, 0), 0.0);
        assert_eq!(layer.intensity(2, 0), 0.0);
    }

    #[test]
    fn offset_layers_are_clipped() {
        let pixels = [255u8; 4];
        let layer = MaskLayer::new(&pixels, 2, 2, 1).at(-1, 1);
        let hits: Vec<_> = layer.overlap(3, 2).collect();
        assert_eq!(hits, vec![(0, 1, 1.0)]);
    }

    #[test]
    fn short_buffers_are_refused() {
        let pixels = [0u8; 5];
        assert!(MaskLayer::new(&pixels, 2, 1, 3).validate().is_err());
        assert!(MaskLayer::new(&pixels, 1, 1, 5).validate().is_err());
    }
}

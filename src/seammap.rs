// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Seam maps
//!
//! When asked to, the carver remembers where every seam of an axis
//! pass went, in the coordinates of the image it was constructed from.
//! At the end of the pass the record is painted into a transparent
//! RGBA image: each seam pixel tinted along a gradient from the start
//! color (first seam) to the end color (last seam).

use crate::config::Axis;
use crate::error::Result;
use crate::grid::Grid;
use crate::seamfinder::Seam;
use crate::twodmap::TwoDimensionalMap;
use image::{Rgba, RgbaImage};
use itertools::iproduct;
use num_traits::clamp;

/// The seams of one axis pass, drawn at the original resolution.
#[derive(Debug, Clone)]
pub struct SeamMap {
    /// The axis the seams shrank or grew.
    pub axis: Axis,
    /// Number of seams drawn.
    pub seams: usize,
    /// Transparent except where a seam passed.
    pub image: RgbaImage,
}

// Seam order per original pixel; zero means untouched.
struct Pass {
    axis: Axis,
    order: TwoDimensionalMap<u32>,
    seams: u32,
}

/// Collects seam positions while a resize runs.
pub(crate) struct SeamRecorder {
    width: usize,
    height: usize,
    colors: ([u8; 4], [u8; 4]),
    current: Option<Pass>,
    finished: Vec<SeamMap>,
}

fn blend(start: u8, end: u8, t: f64) -> u8 {
    let value = f64::from(start) + (f64::from(end) - f64::from(start)) * t;
    num_traits::NumCast::from(clamp(value.round(), 0.0, 255.0)).unwrap_or(end)
}

impl SeamRecorder {
    /// A recorder for images that were `width` x `height` at
    /// construction.
    pub fn new(width: usize, height: usize, colors: ([u8; 4], [u8; 4])) -> Self {
        SeamRecorder {
            width,
            height,
            colors,
            current: None,
            finished: Vec::new(),
        }
    }

    pub fn set_colors(&mut self, colors: ([u8; 4], [u8; 4])) {
        self.colors = colors;
    }

    /// Open a pass for `axis`, closing any pass left open.
    pub fn begin(&mut self, axis: Axis) -> Result<()> {
        self.finish();
        self.current = Some(Pass {
            axis,
            order: TwoDimensionalMap::new(self.width, self.height)?,
            seams: 0,
        });
        Ok(())
    }

    /// Note the seam about to be removed from (or duplicated in) `grid`.
    pub fn record(&mut self, grid: &Grid, seam: &Seam) {
        let (pass, maps) = match (self.current.as_mut(), grid.maps()) {
            (Some(pass), Some(maps)) => (pass, maps),
            _ => return,
        };
        pass.seams += 1;
        for (y, &x) in seam.iter().enumerate() {
            let [ox, oy] = maps.origin[(x, y)];
            pass.order[(ox as usize, oy as usize)] = pass.seams;
        }
    }

    /// Close the open pass and paint it.
    pub fn finish(&mut self) {
        let pass = match self.current.take() {
            Some(pass) => pass,
            None => return,
        };
        let (start, end) = self.colors;
        let span = f64::from(pass.seams.saturating_sub(1).max(1));
        let mut image = RgbaImage::new(self.width as u32, self.height as u32);
        for (y, x) in iproduct!(0..self.height, 0..self.width) {
            let order = pass.order[(x, y)];
            if order == 0 {
                continue;
            }
            let t = f64::from(order - 1) / span;
            let mut color = [0u8; 4];
            for (c, channel) in color.iter_mut().enumerate() {
                *channel = blend(start[c], end[c], t);
            }
            image.put_pixel(x as u32, y as u32, Rgba(color));
        }
        self.finished.push(SeamMap {
            axis: pass.axis,
            seams: pass.seams as usize,
            image,
        });
    }

    /// Every finished pass, oldest first.
    pub fn maps(&self) -> &[SeamMap] {
        &self.finished
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.finished.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seams_are_tinted_by_order() {
        let mut grid = Grid::primary(&[0; 9], 3, 3, 1).unwrap();
        let mut recorder = SeamRecorder::new(3, 3, ([0, 0, 0, 255], [200, 100, 0, 255]));
        recorder.begin(Axis::Width).unwrap();

        let first = Seam::from(vec![0, 1, 2]);
        recorder.record(&grid, &first);
        grid.shrink_by_one(&first);
        recorder.record(&grid, &Seam::from(vec![0, 0, 0]));
        recorder.finish();

        let map = &recorder.maps()[0];
        assert_eq!((map.axis, map.seams), (Axis::Width, 2));
        assert_eq!(map.image.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(map.image.get_pixel(1, 0), &Rgba([200, 100, 0, 255]));
        assert_eq!(map.image.get_pixel(0, 2), &Rgba([200, 100, 0, 255]));
        assert_eq!(map.image.get_pixel(2, 2), &Rgba([0, 0, 0, 255]));
        assert_eq!(map.image.get_pixel(2, 0), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn gradients_round_to_the_nearest_level() {
        assert_eq!(blend(0, 255, 0.5), 128);
        assert_eq!(blend(200, 100, 0.25), 175);
        assert_eq!(blend(9, 9, 1.0), 9);
    }

    #[test]
    fn nothing_is_recorded_outside_a_pass() {
        let grid = Grid::primary(&[0; 4], 2, 2, 1).unwrap();
        let mut recorder = SeamRecorder::new(2, 2, ([255; 4], [255; 4]));
        recorder.record(&grid, &Seam::from(vec![0, 0]));
        recorder.finish();
        assert!(recorder.maps().is_empty());
    }
}

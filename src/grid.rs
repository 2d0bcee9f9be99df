// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The pixel grid
//!
//! A grid is the raster being carved: color samples plus, for the
//! primary raster only, every per-pixel scalar the carver maintains.
//! All of it is stored in `TwoDimensionalMap`s that share one stride,
//! so removing or inserting a seam is the same row shift applied to
//! each field in lock-step.
//!
//! Auxiliary rasters are grids with no maps.  They follow the seams of
//! the primary and never compute their own.

use crate::cq;
use crate::error::{invalid_geometry, CarveError, Result};
use crate::flipper::Orientation;
use crate::seamfinder::Seam;
use crate::twodmap::{reserve, TwoDimensionalMap};
use itertools::iproduct;

/// One color sample.  Only the first `bpp` channels mean anything.
pub type Sample = [u8; 4];

/// The per-pixel scalars of a primary raster.
#[derive(Debug)]
pub struct Maps {
    /// Local importance.
    pub energy: TwoDimensionalMap<f64>,
    /// Additive importance from preservation and discard masks.
    pub bias: TwoDimensionalMap<f64>,
    /// Cumulative minimum cost of any seam ending here.
    pub cost: TwoDimensionalMap<f64>,
    /// Column offset to this pixel's predecessor in the row above.
    pub least: TwoDimensionalMap<i8>,
    /// The construction-time image coordinate of this pixel.
    pub origin: TwoDimensionalMap<[u32; 2]>,
    /// Per-pixel multiplier on the rigidity penalty, once a rigidity
    /// mask has been added.
    pub rigidity: Option<TwoDimensionalMap<f64>>,
}

impl Maps {
    fn new(stride: usize, rows: usize) -> Result<Self> {
        let mut origin = TwoDimensionalMap::new(stride, rows)?;
        for (y, x) in iproduct!(0..rows, 0..stride) {
            origin[(x, y)] = [x as u32, y as u32];
        }
        Ok(Maps {
            energy: TwoDimensionalMap::new(stride, rows)?,
            bias: TwoDimensionalMap::new(stride, rows)?,
            cost: TwoDimensionalMap::new(stride, rows)?,
            least: TwoDimensionalMap::new(stride, rows)?,
            origin,
            rigidity: None,
        })
    }

    fn try_clone(&self) -> Result<Self> {
        Ok(Maps {
            energy: self.energy.try_clone()?,
            bias: self.bias.try_clone()?,
            cost: self.cost.try_clone()?,
            least: self.least.try_clone()?,
            origin: self.origin.try_clone()?,
            rigidity: match &self.rigidity {
                Some(mask) => Some(mask.try_clone()?),
                None => None,
            },
        })
    }

    /// The rigidity multiplier at `(x, y)`; 1 when no mask was given.
    #[inline]
    pub fn rigidity_at(&self, x: usize, y: usize) -> f64 {
        self.rigidity.as_ref().map_or(1.0, |mask| mask[(x, y)])
    }
}

/// The color raster: geometry plus samples.
#[derive(Debug)]
pub struct Raster {
    w: usize,
    h: usize,
    bpp: usize,
    orientation: Orientation,
    color: TwoDimensionalMap<Sample>,
}

impl Raster {
    /// Logical width in the current orientation.
    pub fn width(&self) -> usize {
        self.w
    }

    /// Logical height in the current orientation.
    pub fn height(&self) -> usize {
        self.h
    }

    /// Backing-store width.
    pub fn w0(&self) -> usize {
        self.color.stride()
    }

    /// Channels per pixel.
    pub fn bpp(&self) -> usize {
        self.bpp
    }

    /// The sample at raster coordinate `(x, y)`.
    pub fn sample(&self, x: usize, y: usize) -> Sample {
        self.color[(x, y)]
    }

    /// Average channel intensity in `[0, 1]`, used for gradients.
    #[inline]
    pub fn read(&self, x: usize, y: usize) -> f64 {
        let sample = &self.color[(x, y)];
        let sum: u32 = sample[..self.bpp].iter().map(|&c| u32::from(c)).sum();
        f64::from(sum) / (255.0 * self.bpp as f64)
    }
}

/// A raster being carved, with or without maps.
#[derive(Debug)]
pub struct Grid {
    raster: Raster,
    maps: Option<Maps>,
}

fn check_geometry(pixels: &[u8], width: usize, height: usize, bpp: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(invalid_geometry(format!(
            "images must be at least 1x1, got {}x{}",
            width, height
        )));
    }
    if bpp == 0 || bpp > 4 {
        return Err(invalid_geometry(format!(
            "supported channel depths are 1 to 4, got {}",
            bpp
        )));
    }
    let expected = width
        .checked_mul(height)
        .and_then(|area| area.checked_mul(bpp))
        .ok_or_else(|| invalid_geometry("image dimensions overflow"))?;
    if pixels.len() != expected {
        return Err(invalid_geometry(format!(
            "a {}x{}x{} image needs {} bytes, got {}",
            width,
            height,
            bpp,
            expected,
            pixels.len()
        )));
    }
    Ok(())
}

fn average(a: Sample, b: Sample) -> Sample {
    let mut out = [0u8; 4];
    for (c, (p, q)) in out.iter_mut().zip(a.iter().zip(b.iter())) {
        *c = ((u16::from(*p) + u16::from(*q) + 1) / 2) as u8;
    }
    out
}

impl Grid {
    fn build(pixels: &[u8], width: usize, height: usize, bpp: usize, with_maps: bool) -> Result<Self> {
        check_geometry(pixels, width, height, bpp)?;
        let mut color = TwoDimensionalMap::new(width, height)?;
        for (i, chunk) in pixels.chunks_exact(bpp).enumerate() {
            let cell: &mut Sample = &mut color[(i % width, i / width)];
            cell[..bpp].copy_from_slice(chunk);
        }
        let maps = cq!(with_maps, Some(Maps::new(width, height)?), None);
        Ok(Grid {
            raster: Raster {
                w: width,
                h: height,
                bpp,
                orientation: Orientation::Normal,
                color,
            },
            maps,
        })
    }

    /// A primary raster, with maps, from a row-major buffer.
    pub fn primary(pixels: &[u8], width: usize, height: usize, bpp: usize) -> Result<Self> {
        Self::build(pixels, width, height, bpp, true)
    }

    /// An auxiliary raster: color only.
    pub fn auxiliary(pixels: &[u8], width: usize, height: usize, bpp: usize) -> Result<Self> {
        Self::build(pixels, width, height, bpp, false)
    }

    /// A copy that reports allocation failure instead of aborting.
    pub fn try_clone(&self) -> Result<Self> {
        Ok(Grid {
            raster: Raster {
                w: self.raster.w,
                h: self.raster.h,
                bpp: self.raster.bpp,
                orientation: self.raster.orientation,
                color: self.raster.color.try_clone()?,
            },
            maps: match &self.maps {
                Some(maps) => Some(maps.try_clone()?),
                None => None,
            },
        })
    }

    /// The color raster.
    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    /// The maps, if this is a primary raster.
    pub fn maps(&self) -> Option<&Maps> {
        self.maps.as_ref()
    }

    /// Split into the raster and the maps for the map builders.
    pub(crate) fn split_mut(&mut self) -> Result<(&Raster, &mut Maps)> {
        match self.maps.as_mut() {
            Some(maps) => Ok((&self.raster, maps)),
            None => Err(CarveError::AuxiliaryRaster),
        }
    }

    /// Mutable maps of a primary raster.
    pub(crate) fn maps_mut(&mut self) -> Result<&mut Maps> {
        self.maps.as_mut().ok_or(CarveError::AuxiliaryRaster)
    }

    /// Logical width in the current orientation.
    pub fn width(&self) -> usize {
        self.raster.w
    }

    /// Logical height in the current orientation.
    pub fn height(&self) -> usize {
        self.raster.h
    }

    /// Backing-store width; never less than `width()`.
    pub fn w0(&self) -> usize {
        self.raster.w0()
    }

    /// Channels per pixel.
    pub fn bpp(&self) -> usize {
        self.raster.bpp
    }

    /// Current orientation.
    pub fn orientation(&self) -> Orientation {
        self.raster.orientation
    }

    /// Whether rows currently hold image columns.
    pub fn is_transposed(&self) -> bool {
        self.raster.orientation == Orientation::Transposed
    }

    /// Average channel intensity at raster coordinate `(x, y)`.
    pub fn read(&self, x: usize, y: usize) -> f64 {
        self.raster.read(x, y)
    }

    /// `(width, height)` of the image, whatever the orientation.
    pub fn image_dimensions(&self) -> (usize, usize) {
        self.raster.orientation.dimensions(self.raster.w, self.raster.h)
    }

    /// The sample at image coordinate `(x, y)`.
    pub fn image_sample(&self, x: usize, y: usize) -> Sample {
        let (rx, ry) = self.raster.orientation.to_raster(x, y);
        self.raster.color[(rx, ry)]
    }

    /// The image as a row-major buffer in normal orientation.
    pub fn to_pixels(&self) -> Result<Vec<u8>> {
        let (width, height) = self.image_dimensions();
        let bpp = self.raster.bpp;
        let mut pixels = reserve(width * height * bpp)?;
        for (y, x) in iproduct!(0..height, 0..width) {
            pixels.extend_from_slice(&self.image_sample(x, y)[..bpp]);
        }
        Ok(pixels)
    }

    /// Remove the seam: every row drops its seam column and the rest of
    /// the row slides left.  The maps, when present, move with the
    /// color.
    pub fn shrink_by_one(&mut self, seam: &Seam) {
        debug_assert_eq!(seam.len(), self.raster.h);
        let w = self.raster.w;
        for (y, &x) in seam.iter().enumerate() {
            self.raster.color.remove_at(y, x, w);
            if let Some(maps) = self.maps.as_mut() {
                maps.energy.remove_at(y, x, w);
                maps.bias.remove_at(y, x, w);
                maps.cost.remove_at(y, x, w);
                maps.least.remove_at(y, x, w);
                maps.origin.remove_at(y, x, w);
                if let Some(mask) = maps.rigidity.as_mut() {
                    mask.remove_at(y, x, w);
                }
            }
        }
        self.raster.w -= 1;
    }

    /// Make room for the logical width to reach `width` without further
    /// reallocation.
    pub fn reserve_width(&mut self, width: usize) -> Result<()> {
        if width <= self.w0() {
            return Ok(());
        }
        self.raster.color.widen(width)?;
        if let Some(maps) = self.maps.as_mut() {
            maps.energy.widen(width)?;
            maps.bias.widen(width)?;
            maps.cost.widen(width)?;
            maps.least.widen(width)?;
            maps.origin.widen(width)?;
            if let Some(mask) = maps.rigidity.as_mut() {
                mask.widen(width)?;
            }
        }
        Ok(())
    }

    /// Insert a column at the seam: in every row a new pixel appears at
    /// the seam position, blended from its left neighbor and the seam
    /// pixel it pushes right.  Bias and rigidity are blended the same
    /// way; energy, cost and backtrack are left stale and must be
    /// rebuilt.
    pub fn grow_by_one(&mut self, seam: &Seam) -> Result<()> {
        debug_assert_eq!(seam.len(), self.raster.h);
        let w = self.raster.w;
        if w == self.w0() {
            self.reserve_width(w + 1 + w / 2)?;
        }
        for (y, &x) in seam.iter().enumerate() {
            let left = cq!(x == 0, x, x - 1);
            let color = &mut self.raster.color;
            let blended = average(color[(left, y)], color[(x, y)]);
            color.insert_at(y, x, w, blended);
            if let Some(maps) = self.maps.as_mut() {
                let bias = (maps.bias[(left, y)] + maps.bias[(x, y)]) / 2.0;
                maps.bias.insert_at(y, x, w, bias);
                let origin = maps.origin[(x, y)];
                maps.origin.insert_at(y, x, w, origin);
                maps.energy.insert_at(y, x, w, 0.0);
                maps.cost.insert_at(y, x, w, 0.0);
                maps.least.insert_at(y, x, w, 0);
                if let Some(mask) = maps.rigidity.as_mut() {
                    let factor = (mask[(left, y)] + mask[(x, y)]) / 2.0;
                    mask.insert_at(y, x, w, factor);
                }
            }
        }
        self.raster.w += 1;
        Ok(())
    }

    /// Exchange rows and columns.  Color, bias, rigidity and origins
    /// survive exactly; energy, cost and backtrack come back zeroed and
    /// must be rebuilt.
    pub fn transpose(&mut self) -> Result<()> {
        let (w, h) = (self.raster.w, self.raster.h);
        self.raster.color = self.raster.color.transpose(w)?;
        if let Some(maps) = self.maps.as_mut() {
            maps.bias = maps.bias.transpose(w)?;
            maps.origin = maps.origin.transpose(w)?;
            if let Some(mask) = maps.rigidity.as_mut() {
                *mask = mask.transpose(w)?;
            }
            maps.energy = TwoDimensionalMap::new(h, w)?;
            maps.cost = TwoDimensionalMap::new(h, w)?;
            maps.least = TwoDimensionalMap::new(h, w)?;
        }
        self.raster.w = h;
        self.raster.h = w;
        self.raster.orientation = self.raster.orientation.flip();
        Ok(())
    }

    /// Overwrite every origin with the pixel's current raster
    /// coordinate, so a scratch copy can report seams in the columns of
    /// the grid it was cloned from.
    pub(crate) fn tag_positions(&mut self) -> Result<()> {
        let (w, h) = (self.raster.w, self.raster.h);
        let maps = self.maps_mut()?;
        for (y, x) in iproduct!(0..h, 0..w) {
            maps.origin[(x, y)] = [x as u32, y as u32];
        }
        Ok(())
    }

    /// Create the rigidity mask if it does not exist yet.
    pub(crate) fn rigidity_mask(&mut self) -> Result<&mut TwoDimensionalMap<f64>> {
        let (stride, rows) = (self.w0(), self.raster.h);
        let maps = self.maps_mut()?;
        let mask = match maps.rigidity.take() {
            Some(mask) => mask,
            None => TwoDimensionalMap::new(stride, rows)?,
        };
        Ok(maps.rigidity.get_or_insert(mask))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 4x3 RGB, every channel of pixel (x, y) set to 10 * y + x.
    fn ramp() -> Vec<u8> {
        (0..3u8)
            .flat_map(|y| (0..4u8).flat_map(move |x| vec![10 * y + x; 3]))
            .collect()
    }

    fn column_of(grid: &Grid, y: usize) -> Vec<u8> {
        (0..grid.width()).map(|x| grid.raster().sample(x, y)[0]).collect()
    }

    #[test]
    fn read_is_the_normalized_channel_average() {
        let grid = Grid::primary(&[255, 0, 0, 255, 255, 255], 2, 1, 3).unwrap();
        assert!((grid.read(0, 0) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(grid.read(1, 0), 1.0);
    }

    #[test]
    fn bad_geometry_is_rejected() {
        assert!(Grid::primary(&[], 0, 1, 3).is_err());
        assert!(Grid::primary(&[0; 5], 1, 1, 5).is_err());
        assert!(Grid::primary(&[0; 5], 2, 1, 3).is_err());
    }

    #[test]
    fn shrink_drops_one_column_per_row() {
        let mut grid = Grid::primary(&ramp(), 4, 3, 3).unwrap();
        grid.shrink_by_one(&Seam::from(vec![1, 2, 3]));
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.w0(), 4);
        assert_eq!(column_of(&grid, 0), vec![0, 2, 3]);
        assert_eq!(column_of(&grid, 1), vec![10, 11, 13]);
        assert_eq!(column_of(&grid, 2), vec![20, 21, 22]);
        let maps = grid.maps().unwrap();
        assert_eq!(maps.origin[(1, 0)], [2, 0]);
        assert_eq!(maps.origin[(2, 1)], [3, 1]);
    }

    #[test]
    fn grow_blends_the_new_column() {
        let mut grid = Grid::primary(&ramp(), 4, 3, 3).unwrap();
        grid.grow_by_one(&Seam::from(vec![2, 0, 3])).unwrap();
        assert_eq!(grid.width(), 5);
        assert!(grid.w0() >= 5);
        assert_eq!(column_of(&grid, 0), vec![0, 1, 2, 2, 3]);
        assert_eq!(column_of(&grid, 1), vec![10, 10, 11, 12, 13]);
        assert_eq!(column_of(&grid, 2), vec![20, 21, 22, 23, 23]);
        assert_eq!(grid.maps().unwrap().origin[(3, 2)], [3, 2]);
    }

    #[test]
    fn transposing_twice_restores_everything() {
        let pixels: Vec<u8> = (0..24 * 4).map(|v| (v * 7 % 256) as u8).collect();
        let mut grid = Grid::primary(&pixels, 4, 6, 4).unwrap();
        grid.transpose().unwrap();
        assert!(grid.is_transposed());
        assert_eq!((grid.width(), grid.height()), (6, 4));
        assert_eq!(grid.image_dimensions(), (4, 6));
        assert_eq!(grid.to_pixels().unwrap(), pixels);
        grid.transpose().unwrap();
        assert!(!grid.is_transposed());
        assert_eq!((grid.width(), grid.height()), (4, 6));
        assert_eq!(grid.to_pixels().unwrap(), pixels);
        assert_eq!(grid.maps().unwrap().origin[(3, 5)], [3, 5]);
    }

    #[test]
    fn auxiliary_grids_have_no_maps() {
        let mut grid = Grid::auxiliary(&ramp(), 4, 3, 3).unwrap();
        assert!(grid.maps().is_none());
        assert!(grid.split_mut().is_err());
        grid.shrink_by_one(&Seam::from(vec![0, 0, 0]));
        assert_eq!(column_of(&grid, 2), vec![21, 22, 23]);
    }
}

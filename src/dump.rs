// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Render the energy map as a grayscale image.  Useful for seeing what
//! the carver thinks is important, and for debugging energy functions.

use crate::energy::EnergyFunction;
use crate::energymap::energy_at;
use crate::error::{CarveError, Result};
use crate::grid::Grid;
use image::{GrayImage, Luma};
use itertools::iproduct;
use num_traits::{clamp, NumCast};

/// The energy of every visible pixel, in image orientation, scaled so
/// that the most energetic pixel is white.  Negative energies (heavily
/// discarded areas) render black.
pub fn energy_image(grid: &Grid, function: EnergyFunction) -> Result<GrayImage> {
    let maps = grid.maps().ok_or(CarveError::AuxiliaryRaster)?;
    let raster = grid.raster();
    let orientation = grid.orientation();
    let (width, height) = grid.image_dimensions();

    let energies: Vec<f64> = iproduct!(0..height, 0..width)
        .map(|(y, x)| {
            let (rx, ry) = orientation.to_raster(x, y);
            energy_at(raster, maps, function, rx, ry)
        })
        .collect();
    let factor = energies.iter().cloned().fold(0.0, f64::max);

    let mut out = GrayImage::new(width as u32, height as u32);
    for (i, energy) in energies.iter().enumerate() {
        let scaled = if factor > 0.0 { energy * 255.0 / factor } else { 0.0 };
        let level: u8 = NumCast::from(clamp(scaled.round(), 0.0, 255.0)).unwrap_or(0);
        out.put_pixel((i % width) as u32, (i / width) as u32, Luma([level]));
    }
    Ok(out)
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Seams, and how we find them.
//!
//! Once the cost map is built, the cheapest seam is read straight off
//! it: find the cheapest pixel in the bottom row and follow the
//! backtrack offsets up to the top.

use crate::cq;
use crate::error::{CarveError, Result};
use crate::grid::Grid;
use crate::twodmap::{allocate, reserve};
use itertools::Itertools;
use std::cmp::Ordering;
use std::ops::Index;

/// One column index per row, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seam(Vec<usize>);

impl Seam {
    /// Number of rows the seam spans.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for a seam over zero rows.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The column indices, top row first.
    pub fn iter(&self) -> std::slice::Iter<'_, usize> {
        self.0.iter()
    }

    /// The columns as a slice.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Whether consecutive rows never step further than `max_step`
    /// columns apart.
    pub fn is_connected(&self, max_step: usize) -> bool {
        self.0
            .iter()
            .tuple_windows()
            .all(|(a, b)| cq!(a > b, a - b, b - a) <= max_step)
    }
}

impl From<Vec<usize>> for Seam {
    fn from(columns: Vec<usize>) -> Self {
        Seam(columns)
    }
}

impl Index<usize> for Seam {
    type Output = usize;

    fn index(&self, y: usize) -> &usize {
        &self.0[y]
    }
}

fn by_cost(a: &f64, b: &f64) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// Backtrack the cost map of `grid` into its cheapest vertical seam.
/// Ties in the bottom row go to the leftmost column.
pub fn trace_seam(grid: &Grid) -> Result<Seam> {
    let maps = grid.maps().ok_or(CarveError::AuxiliaryRaster)?;
    let (w, h) = (grid.width(), grid.height());
    let bottom = &maps.cost.row(h - 1)[..w];
    let mut x = bottom.iter().position_min_by(|a, b| by_cost(a, b)).unwrap_or(0);

    let mut columns = allocate(h)?;
    columns[h - 1] = x;
    for y in (1..h).rev() {
        x = (x as isize + isize::from(maps.least[(x, y)])) as usize;
        columns[y - 1] = x;
    }
    Ok(Seam(columns))
}

/// Translate a seam through the origin map: each row's seam pixel is
/// replaced by the column recorded in its origin.  Used on scratch
/// grids whose origins were tagged with the columns of their parent.
pub(crate) fn origin_columns(grid: &Grid, seam: &Seam) -> Result<Seam> {
    let maps = grid.maps().ok_or(CarveError::AuxiliaryRaster)?;
    let mut columns = reserve(seam.len())?;
    columns.extend(
        seam.iter()
            .enumerate()
            .map(|(y, &x)| maps.origin[(x, y)][0] as usize),
    );
    Ok(Seam(columns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::EnergyFunction;
    use crate::energymap::{build_cost_map, build_energy_map};
    use crate::rigidity::RigidityTable;

    fn traced(pixels: &[u8], width: usize, height: usize, delta_x: usize) -> Seam {
        let mut grid = Grid::primary(pixels, width, height, 1).unwrap();
        build_energy_map(&mut grid, EnergyFunction::Norm).unwrap();
        build_cost_map(&mut grid, &RigidityTable::new(0.0, delta_x)).unwrap();
        trace_seam(&grid).unwrap()
    }

    #[test]
    fn flat_images_carve_the_leftmost_column() {
        let seam = traced(&[7; 12], 4, 3, 1);
        assert_eq!(seam.as_slice(), &[0, 0, 0]);
    }

    #[test]
    fn seams_route_around_edges() {
        // A dark diagonal through a bright image: the pixels beside the
        // diagonal carry the gradient, so the seam slips past its top.
        #[rustfmt::skip]
        let pixels = [
            0, 255, 255, 255, 255,
            255, 0, 255, 255, 255,
            255, 255, 0, 255, 255,
            255, 255, 255, 0, 255,
        ];
        let seam = traced(&pixels, 5, 4, 1);
        assert!(seam.is_connected(1));
        assert_eq!(seam.as_slice(), &[2, 1, 0, 0]);
    }

    #[test]
    fn connectivity_is_checked_pairwise() {
        assert!(Seam::from(vec![3, 2, 2, 3]).is_connected(1));
        assert!(!Seam::from(vec![3, 1]).is_connected(1));
        assert!(Seam::from(vec![5, 5]).is_connected(0));
    }
}

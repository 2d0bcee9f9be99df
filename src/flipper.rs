// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Image dimensional flipper
//!
//! The engine only knows how to carve vertical seams.  To carve
//! horizontal ones, the rasters are physically transposed so that
//! every column becomes a contiguous row, carved, and left that way
//! until the other axis is wanted again.  A raster is therefore always
//! in one of two states, and every coordinate that crosses the public
//! boundary goes through the mapping here.

use crate::config::Axis;
use crate::error::Result;
use crate::grid::Grid;

/// Whether a raster's rows are image rows or image columns.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Orientation {
    /// Rows are image rows.
    Normal,
    /// Rows are image columns.
    Transposed,
}

impl Orientation {
    /// The orientation in which seams shrink or grow `axis`.
    pub fn for_axis(axis: Axis) -> Self {
        match axis {
            Axis::Width => Orientation::Normal,
            Axis::Height => Orientation::Transposed,
        }
    }

    /// The other state.
    pub fn flip(self) -> Self {
        match self {
            Orientation::Normal => Orientation::Transposed,
            Orientation::Transposed => Orientation::Normal,
        }
    }

    /// Map an image coordinate to raster storage; the mapping is its
    /// own inverse.
    #[inline]
    pub fn to_raster(self, x: usize, y: usize) -> (usize, usize) {
        match self {
            Orientation::Normal => (x, y),
            Orientation::Transposed => (y, x),
        }
    }

    /// Map a `(width, height)` pair the same way.
    #[inline]
    pub fn dimensions(self, width: usize, height: usize) -> (usize, usize) {
        self.to_raster(width, height)
    }
}

/// Bring the primary grid and everything attached to it into the
/// orientation that carves `axis`.  Each raster is flipped on its own
/// account, so an auxiliary raster that sat out a pass catches up.
pub(crate) fn orient(primary: &mut Grid, auxiliary: &mut [Grid], axis: Axis) -> Result<()> {
    let wanted = Orientation::for_axis(axis);
    for raster in std::iter::once(primary).chain(auxiliary.iter_mut()) {
        if raster.orientation() != wanted {
            raster.transpose()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_is_an_involution() {
        let t = Orientation::Transposed;
        let (x, y) = t.to_raster(3, 7);
        assert_eq!(t.to_raster(x, y), (3, 7));
        assert_eq!(t.flip().flip(), t);
        assert_eq!(Orientation::Normal.dimensions(4, 6), (4, 6));
        assert_eq!(t.dimensions(4, 6), (6, 4));
    }

    #[test]
    fn orient_flips_only_when_needed() {
        let pixels: Vec<u8> = (0..24).collect();
        let mut grid = Grid::primary(&pixels, 4, 6, 1).unwrap();
        let mut aux = vec![Grid::auxiliary(&pixels, 4, 6, 1).unwrap()];

        orient(&mut grid, &mut aux, Axis::Width).unwrap();
        assert_eq!(grid.orientation(), Orientation::Normal);

        orient(&mut grid, &mut aux, Axis::Height).unwrap();
        assert_eq!(grid.orientation(), Orientation::Transposed);
        assert_eq!(aux[0].orientation(), Orientation::Transposed);
        assert_eq!((grid.width(), grid.height()), (6, 4));

        orient(&mut grid, &mut aux, Axis::Height).unwrap();
        assert_eq!(grid.orientation(), Orientation::Transposed);
    }
}

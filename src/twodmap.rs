// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The two-dimensional arena every per-pixel field lives in.
//!
//! The map is physically `stride` columns wide, but the carver only
//! ever looks at the first `width` columns of each row, where `width`
//! is tracked by the owner.  Removing a seam shifts the tail of each
//! row one step left and leaves junk past the logical edge; inserting
//! one shifts it right into that junk.  Nothing is reallocated until
//! an insertion runs out of stride.

use crate::error::{CarveError, Result};
use std::ops::{Index, IndexMut};

/// An empty vector with room for `len` values, reporting allocator
/// refusal instead of aborting the process.
pub(crate) fn reserve<P>(len: usize) -> Result<Vec<P>> {
    let bytes = len.saturating_mul(std::mem::size_of::<P>());
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| CarveError::OutOfMemory { bytes })?;
    Ok(data)
}

/// Allocate `len` default values, fallibly.
pub(crate) fn allocate<P: Default + Copy>(len: usize) -> Result<Vec<P>> {
    let mut data = reserve(len)?;
    data.resize(len, P::default());
    Ok(data)
}

fn area(stride: usize, rows: usize) -> Result<usize> {
    stride
        .checked_mul(rows)
        .ok_or(CarveError::OutOfMemory { bytes: usize::MAX })
}

/// Defines the basic map: an addressable two-dimensional field holding
/// whatever the carver needs per pixel: color samples, energies,
/// cumulative costs, backtrack offsets or original coordinates.
#[derive(Debug, PartialEq)]
pub struct TwoDimensionalMap<P: Default + Copy> {
    stride: usize,
    rows: usize,
    data: Vec<P>,
}

impl<P: Default + Copy> TwoDimensionalMap<P> {
    /// Define a new map, filled with the default value of its content
    /// type.
    pub fn new(stride: usize, rows: usize) -> Result<Self> {
        Ok(TwoDimensionalMap {
            stride,
            rows,
            data: allocate(area(stride, rows)?)?,
        })
    }

    /// The physical width of a row.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    // Absolutely, the number one name of this game is keep the index
    // math in a singular location and never, ever mess with it.
    fn get_index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.stride && y < self.rows);
        y * self.stride + x
    }

    /// The whole physical row `y`, including anything past the logical
    /// edge.
    pub fn row(&self, y: usize) -> &[P] {
        let start = y * self.stride;
        &self.data[start..start + self.stride]
    }

    /// Mutable access to the whole physical row `y`.
    pub fn row_mut(&mut self, y: usize) -> &mut [P] {
        let start = y * self.stride;
        &mut self.data[start..start + self.stride]
    }

    /// Drop column `x` of row `y`, pulling the rest of the logical row
    /// (`width` columns before the removal) one step left.
    pub fn remove_at(&mut self, y: usize, x: usize, width: usize) {
        debug_assert!(x < width && width <= self.stride);
        self.row_mut(y).copy_within(x + 1..width, x);
    }

    /// Open a new column `x` in row `y` holding `value`, pushing the
    /// rest of the logical row (`width` columns before the insertion)
    /// one step right.  The caller guarantees `width < stride`.
    pub fn insert_at(&mut self, y: usize, x: usize, width: usize, value: P) {
        debug_assert!(x <= width && width < self.stride);
        let row = self.row_mut(y);
        row.copy_within(x..width, x + 1);
        row[x] = value;
    }

    /// Re-lay the map with a wider stride, keeping the contents of
    /// every row.
    pub fn widen(&mut self, stride: usize) -> Result<()> {
        if stride <= self.stride {
            return Ok(());
        }
        let mut data = allocate(area(stride, self.rows)?)?;
        for (y, row) in data.chunks_mut(stride).enumerate() {
            row[..self.stride].copy_from_slice(self.row(y));
        }
        self.data = data;
        self.stride = stride;
        Ok(())
    }

    /// A compact copy with rows and columns exchanged.  Only the first
    /// `width` columns are carried; the result is `rows` wide and
    /// `width` tall.
    pub fn transpose(&self, width: usize) -> Result<Self> {
        let mut flipped = Self::new(self.rows, width)?;
        for y in 0..self.rows {
            for x in 0..width {
                flipped[(y, x)] = self[(x, y)];
            }
        }
        Ok(flipped)
    }

    /// A copy that reports allocation failure instead of aborting.
    pub fn try_clone(&self) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(self.data.len())
            .map_err(|_| CarveError::OutOfMemory {
                bytes: self.data.len().saturating_mul(std::mem::size_of::<P>()),
            })?;
        data.extend_from_slice(&self.data);
        Ok(TwoDimensionalMap {
            stride: self.stride,
            rows: self.rows,
            data,
        })
    }
}

impl<P: Default + Copy> Index<(usize, usize)> for TwoDimensionalMap<P> {
    type Output = P;

    /// A convenience addressing mode for getting values.
    fn index(&self, (x, y): (usize, usize)) -> &P {
        let index = self.get_index(x, y);
        &self.data[index]
    }
}

impl<P: Default + Copy> IndexMut<(usize, usize)> for TwoDimensionalMap<P> {
    /// A convenience addressing mode for setting values.
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut P {
        let index = self.get_index(x, y);
        &mut self.data[index]
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Energy and cost maps
//!
//! The energy map says how important every pixel is; the cost map
//! says how expensive the cheapest seam ending at every pixel is, and
//! which pixel in the row above it came from.
//!
//! Both can be built from scratch, but rebuilding them after every
//! single-pixel-wide removal would make carving quadratic in the image
//! area.  After a removal only a thin band around the seam has a new
//! energy, and only the costs downstream of that band (plus the pixels
//! whose upper neighbors slid past the seam) can change.  The update
//! functions walk that corridor row by row, widening it wherever a cost
//! actually changed and letting it collapse back to the seam wherever
//! nothing did.

use crate::cq;
use crate::energy::EnergyFunction;
use crate::error::Result;
use crate::grid::{Grid, Maps, Raster};
use crate::rigidity::RigidityTable;
use crate::seamfinder::Seam;
use itertools::iproduct;

// Central difference in the interior, one-sided at the borders.
#[inline]
fn gradient<F: Fn(usize) -> f64>(read: F, i: usize, n: usize) -> f64 {
    if n < 2 {
        0.0
    } else if i == 0 {
        read(1) - read(0)
    } else if i == n - 1 {
        read(i) - read(i - 1)
    } else {
        (read(i + 1) - read(i - 1)) / 2.0
    }
}

/// The energy of raster pixel `(x, y)`: the energy function applied to
/// the brightness gradient, plus the pixel's bias scaled down by the
/// backing width.
pub fn energy_at(raster: &Raster, maps: &Maps, function: EnergyFunction, x: usize, y: usize) -> f64 {
    let (w, h) = (raster.width(), raster.height());
    let gx = gradient(|i| raster.read(i, y), x, w);
    let gy = gradient(|j| raster.read(x, j), y, h);
    function.apply(gx, gy) + maps.bias[(x, y)] / raster.w0() as f64
}

/// Recompute the energy of every visible pixel.
pub fn build_energy_map(grid: &mut Grid, function: EnergyFunction) -> Result<()> {
    let (raster, maps) = grid.split_mut()?;
    for (y, x) in iproduct!(0..raster.height(), 0..raster.width()) {
        let energy = energy_at(raster, maps, function, x, y);
        maps.energy[(x, y)] = energy;
    }
    Ok(())
}

/// The columns of row `y` whose energy a removal of `seam` invalidated,
/// in post-removal coordinates: the two pixels that became neighbors,
/// plus any pixel whose upper or lower neighbor was swapped for another
/// because the adjacent row's seam took a different column.
pub fn energy_band(seam: &Seam, y: usize, width: usize) -> (usize, usize) {
    let s = seam[y];
    let (mut lo, mut hi) = (s.saturating_sub(1), s);
    let above = y.checked_sub(1);
    let below = cq!(y + 1 < seam.len(), Some(y + 1), None);
    for n in above.into_iter().chain(below) {
        lo = lo.min(seam[n]);
        hi = hi.max(seam[n].saturating_sub(1));
    }
    (lo, hi.min(width - 1))
}

/// Refresh the energy map after `seam` has been removed from `grid`.
pub fn update_energy_map(grid: &mut Grid, function: EnergyFunction, seam: &Seam) -> Result<()> {
    let (raster, maps) = grid.split_mut()?;
    for y in 0..raster.height() {
        let (lo, hi) = energy_band(seam, y, raster.width());
        for x in lo..=hi {
            let energy = energy_at(raster, maps, function, x, y);
            maps.energy[(x, y)] = energy;
        }
    }
    Ok(())
}

// 1. Given a pixel coordinate *not* in the first row,
// 2. every pixel within delta_x columns of it in the row above is a
//    possible predecessor,
// 3. each costs its own cumulative cost plus the rigidity penalty for
//    the step, scaled by this pixel's rigidity factor,
// 4. and the cheapest wins, the leftmost on ties.
#[inline]
fn cost_at(maps: &Maps, table: &RigidityTable, width: usize, x: usize, y: usize) -> (f64, i8) {
    let energy = maps.energy[(x, y)];
    if y == 0 {
        return (energy, 0);
    }
    let dx = table.delta_x();
    let factor = maps.rigidity_at(x, y);
    let (mut best, mut offset) = (f64::INFINITY, 0isize);
    for px in x.saturating_sub(dx)..=(x + dx).min(width - 1) {
        let step = px as isize - x as isize;
        let candidate = maps.cost[(px, y - 1)] + table.penalty(step) * factor;
        if candidate < best {
            best = candidate;
            offset = step;
        }
    }
    (energy + best, offset as i8)
}

/// Build the cumulative cost map and backtrack offsets from the
/// current energy map.
pub fn build_cost_map(grid: &mut Grid, table: &RigidityTable) -> Result<()> {
    let (raster, maps) = grid.split_mut()?;
    let w = raster.width();
    for (y, x) in iproduct!(0..raster.height(), 0..w) {
        let (cost, least) = cost_at(maps, table, w, x, y);
        maps.cost[(x, y)] = cost;
        maps.least[(x, y)] = least;
    }
    Ok(())
}

/// Refresh the cost map after `seam` has been removed and the energy
/// map updated.  Only the corridor that can have changed is visited.
pub fn update_cost_map(grid: &mut Grid, table: &RigidityTable, seam: &Seam) -> Result<()> {
    let (raster, maps) = grid.split_mut()?;
    let w = raster.width();
    let dx = table.delta_x();

    // Columns of the previous row whose cost actually changed.
    let mut changed: Option<(usize, usize)> = None;
    for y in 0..raster.height() {
        let (mut lo, mut hi) = energy_band(seam, y, w);
        if y > 0 {
            // Pixels whose upper neighborhood straddles the seam now see
            // different predecessors.
            let (a, b) = (seam[y], seam[y - 1]);
            lo = lo.min(a.min(b).saturating_sub(dx + 1));
            hi = hi.max(a.max(b) + dx);
            if let Some((first, last)) = changed {
                lo = lo.min(first.saturating_sub(dx));
                hi = hi.max(last + dx);
            }
        }
        let hi = hi.min(w - 1);

        changed = None;
        for x in lo..=hi {
            let (cost, least) = cost_at(maps, table, w, x, y);
            if cost != maps.cost[(x, y)] {
                changed = Some(changed.map_or((x, x), |(first, _)| (first, x)));
            }
            maps.cost[(x, y)] = cost;
            maps.least[(x, y)] = least;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seamfinder::trace_seam;

    // Deterministic clutter, so that costs differ almost everywhere.
    fn noise(width: usize, height: usize) -> Vec<u8> {
        (0..width * height * 3)
            .map(|i| (i.wrapping_mul(2_654_435_761) >> 7) as u8)
            .collect()
    }

    fn assert_maps_match(incremental: &Grid, function: EnergyFunction, table: &RigidityTable) {
        let mut fresh = incremental.try_clone().unwrap();
        build_energy_map(&mut fresh, function).unwrap();
        build_cost_map(&mut fresh, table).unwrap();
        let (a, b) = (incremental.maps().unwrap(), fresh.maps().unwrap());
        for (y, x) in iproduct!(0..fresh.height(), 0..fresh.width()) {
            assert_eq!(a.energy[(x, y)], b.energy[(x, y)], "energy at ({}, {})", x, y);
            assert_eq!(a.cost[(x, y)], b.cost[(x, y)], "cost at ({}, {})", x, y);
            assert_eq!(a.least[(x, y)], b.least[(x, y)], "least at ({}, {})", x, y);
        }
    }

    fn carve_and_compare(function: EnergyFunction, rigidity: f64, delta_x: usize, steps: usize) {
        let (width, height) = (17, 11);
        let mut grid = Grid::primary(&noise(width, height), width, height, 3).unwrap();
        let table = RigidityTable::new(rigidity, delta_x);
        build_energy_map(&mut grid, function).unwrap();
        build_cost_map(&mut grid, &table).unwrap();
        for _ in 0..steps {
            let seam = trace_seam(&grid).unwrap();
            grid.shrink_by_one(&seam);
            update_energy_map(&mut grid, function, &seam).unwrap();
            update_cost_map(&mut grid, &table, &seam).unwrap();
            assert_maps_match(&grid, function, &table);
        }
    }

    #[test]
    fn incremental_updates_match_a_rebuild() {
        carve_and_compare(EnergyFunction::Norm, 0.0, 1, 10);
    }

    #[test]
    fn incremental_updates_match_with_rigidity() {
        carve_and_compare(EnergyFunction::SumAbs, 0.5, 1, 8);
    }

    #[test]
    fn incremental_updates_match_with_wide_steps() {
        carve_and_compare(EnergyFunction::BiasedNorm, 0.0, 2, 8);
        carve_and_compare(EnergyFunction::XAbs, 0.0, 0, 6);
    }

    #[test]
    fn borders_use_one_sided_differences() {
        let mut grid = Grid::primary(&[0, 51, 255], 3, 1, 1).unwrap();
        build_energy_map(&mut grid, EnergyFunction::XAbs).unwrap();
        let energy = &grid.maps().unwrap().energy;
        assert!((energy[(0, 0)] - 0.2).abs() < 1e-12);
        assert!((energy[(1, 0)] - 0.5).abs() < 1e-12);
        assert!((energy[(2, 0)] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn bias_is_scaled_by_the_backing_width() {
        let mut grid = Grid::primary(&[9; 4], 4, 1, 1).unwrap();
        grid.maps_mut().unwrap().bias[(2, 0)] = 10.0;
        build_energy_map(&mut grid, EnergyFunction::Null).unwrap();
        assert_eq!(grid.maps().unwrap().energy[(2, 0)], 2.5);
    }

    #[test]
    fn straight_seams_are_preferred_when_rigid() {
        let mut grid = Grid::primary(&[0; 9], 3, 3, 1).unwrap();
        build_energy_map(&mut grid, EnergyFunction::Norm).unwrap();
        build_cost_map(&mut grid, &RigidityTable::new(1.0, 1)).unwrap();
        let least = &grid.maps().unwrap().least;
        assert!((0..3).all(|x| least[(x, 2)] == 0));

        build_cost_map(&mut grid, &RigidityTable::new(0.0, 1)).unwrap();
        let least = &grid.maps().unwrap().least;
        assert_eq!(least[(1, 2)], -1);
    }

    #[test]
    fn the_band_covers_the_new_neighbors() {
        let seam = Seam::from(vec![3, 4, 4, 3]);
        assert_eq!(energy_band(&seam, 0, 8), (2, 3));
        assert_eq!(energy_band(&seam, 1, 8), (3, 4));
        assert_eq!(energy_band(&seam, 3, 3), (2, 2));
    }
}

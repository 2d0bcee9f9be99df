// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The rigidity table: what it costs a seam to step sideways.

use crate::cq;

/// Subtracted from the straight-down entry so that, all else being
/// equal, a rigid seam goes straight.
pub const STRAIGHT_EPSILON: f64 = 1e-5;

/// Penalties indexed by backtrack offset, `-delta_x ..= delta_x`.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidityTable {
    delta_x: usize,
    penalties: Vec<f64>,
}

impl RigidityTable {
    /// Build the table for a rigidity coefficient and a maximum seam
    /// step.  A rigidity of zero yields an all-zero table, leaving tie
    /// breaks to offset order alone.
    pub fn new(rigidity: f64, delta_x: usize) -> Self {
        let dx = delta_x as isize;
        let penalties = (-dx..=dx)
            .map(|offset| {
                if rigidity > 0.0 {
                    let step = (offset * offset) as f64;
                    rigidity * step - cq!(offset == 0, STRAIGHT_EPSILON, 0.0)
                } else {
                    0.0
                }
            })
            .collect();
        RigidityTable { delta_x, penalties }
    }

    /// The largest sideways step a seam may take between two rows.
    pub fn delta_x(&self) -> usize {
        self.delta_x
    }

    /// The penalty for stepping `offset` columns between rows.
    #[inline]
    pub fn penalty(&self, offset: isize) -> f64 {
        self.penalties[(offset + self.delta_x as isize) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn penalties_grow_with_the_square_of_the_step() {
        let table = RigidityTable::new(2.0, 2);
        assert_eq!(table.penalty(-2), 8.0);
        assert_eq!(table.penalty(1), 2.0);
        assert_eq!(table.penalty(0), -STRAIGHT_EPSILON);
    }

    #[test]
    fn zero_rigidity_is_flat() {
        let table = RigidityTable::new(0.0, 1);
        assert!((-1..=1).all(|offset| table.penalty(offset) == 0.0));
    }
}

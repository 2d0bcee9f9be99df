// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Calculate the energy of a gradient
//!
//! Given the brightness gradient at a pixel, decide how important that
//! pixel is.  Several functions have been provided here, from the
//! classic Euclidean norm to a null function that turns the carver
//! into a plain (if slow) cropper.  The set is closed: a carver picks
//! one at construction and may swap it before its maps are built.

use crate::error::{invalid_parameter, CarveError};
use std::fmt;
use std::str::FromStr;

/// The vertical gradient weight used by [`EnergyFunction::BiasedNorm`].
pub const VERTICAL_BIAS: f64 = 0.1;

/// Maps a gradient `(gx, gy)` to a non-negative importance.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EnergyFunction {
    /// `sqrt(gx² + gy²)`
    Norm,
    /// `sqrt(gx² + 0.1·gy²)`: the vertical gradient matters less, which
    /// suits carving vertical seams.
    BiasedNorm,
    /// `(|gx| + |gy|) / 2`
    SumAbs,
    /// `|gx|`
    XAbs,
    /// `|gy|`
    YAbs,
    /// Always zero: no content awareness at all.
    Null,
}

impl Default for EnergyFunction {
    fn default() -> Self {
        EnergyFunction::Norm
    }
}

impl EnergyFunction {
    /// Every variant, in declaration order.
    pub const ALL: [EnergyFunction; 6] = [
        EnergyFunction::Norm,
        EnergyFunction::BiasedNorm,
        EnergyFunction::SumAbs,
        EnergyFunction::XAbs,
        EnergyFunction::YAbs,
        EnergyFunction::Null,
    ];

    /// Apply the function to a gradient.
    #[inline]
    pub fn apply(self, gx: f64, gy: f64) -> f64 {
        match self {
            EnergyFunction::Norm => (gx * gx + gy * gy).sqrt(),
            EnergyFunction::BiasedNorm => (gx * gx + VERTICAL_BIAS * gy * gy).sqrt(),
            EnergyFunction::SumAbs => (gx.abs() + gy.abs()) / 2.0,
            EnergyFunction::XAbs => gx.abs(),
            EnergyFunction::YAbs => gy.abs(),
            EnergyFunction::Null => 0.0,
        }
    }

    /// The short name accepted by `FromStr`.
    pub fn name(self) -> &'static str {
        match self {
            EnergyFunction::Norm => "norm",
            EnergyFunction::BiasedNorm => "bias",
            EnergyFunction::SumAbs => "sumabs",
            EnergyFunction::XAbs => "xabs",
            EnergyFunction::YAbs => "yabs",
            EnergyFunction::Null => "null",
        }
    }
}

impl fmt::Display for EnergyFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EnergyFunction {
    type Err = CarveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EnergyFunction::ALL
            .iter()
            .copied()
            .find(|function| function.name() == s)
            .ok_or_else(|| invalid_parameter("energy", format!("unknown energy function '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_variants_compute_what_they_claim() {
        assert_eq!(EnergyFunction::Norm.apply(3.0, -4.0), 5.0);
        assert!((EnergyFunction::BiasedNorm.apply(0.0, 1.0) - VERTICAL_BIAS.sqrt()).abs() < 1e-12);
        assert_eq!(EnergyFunction::SumAbs.apply(-1.0, 0.5), 0.75);
        assert_eq!(EnergyFunction::XAbs.apply(-0.25, 9.0), 0.25);
        assert_eq!(EnergyFunction::YAbs.apply(9.0, -0.25), 0.25);
        assert_eq!(EnergyFunction::Null.apply(9.0, 9.0), 0.0);
    }

    #[test]
    fn energies_are_never_negative() {
        let gradients = [(-1.0, -1.0), (0.5, -0.5), (0.0, 0.0), (-0.3, 0.9)];
        for function in EnergyFunction::ALL.iter() {
            for (gx, gy) in gradients.iter() {
                assert!(function.apply(*gx, *gy) >= 0.0, "{} went negative", function);
            }
        }
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for function in EnergyFunction::ALL.iter() {
            assert_eq!(function.name().parse::<EnergyFunction>().unwrap(), *function);
        }
        assert!("sobel".parse::<EnergyFunction>().is_err());
    }
}

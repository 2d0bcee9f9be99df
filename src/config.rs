// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Carver configuration
//!
//! Everything a host can tune about a carver.  The values are plain
//! data; `validate` is the single place that decides what is legal,
//! and the carver calls it before any of them reach the engine.

use crate::cq;
use crate::energy::EnergyFunction;
use crate::error::{invalid_parameter, CarveError, Result};
use std::fmt;
use std::str::FromStr;

/// The widest sideways step a seam may take between two rows.
pub const MAX_DELTA_X: usize = 16;

/// One of the two image dimensions.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Axis {
    /// Carved with vertical seams.
    Width,
    /// Carved with horizontal seams, i.e. vertical seams of the
    /// transposed image.
    Height,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(cq!(*self == Axis::Width, "width", "height"))
    }
}

/// Which dimension a two-axis resize tackles first.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResizeOrder {
    /// Width, then height.
    WidthFirst,
    /// Height, then width.
    HeightFirst,
}

impl Default for ResizeOrder {
    fn default() -> Self {
        ResizeOrder::WidthFirst
    }
}

impl ResizeOrder {
    /// The axes in the order they are processed.
    pub fn axes(self) -> [Axis; 2] {
        match self {
            ResizeOrder::WidthFirst => [Axis::Width, Axis::Height],
            ResizeOrder::HeightFirst => [Axis::Height, Axis::Width],
        }
    }
}

impl FromStr for ResizeOrder {
    type Err = CarveError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "width" | "width-first" => Ok(ResizeOrder::WidthFirst),
            "height" | "height-first" => Ok(ResizeOrder::HeightFirst),
            _ => Err(invalid_parameter("order", format!("unknown resize order '{}'", s))),
        }
    }
}

/// How a carver finds and removes seams.
#[derive(Debug, Clone, PartialEq)]
pub struct CarverConfig {
    /// The gradient-to-importance function.
    pub energy: EnergyFunction,
    /// Penalty coefficient for seams that wander sideways.
    pub rigidity: f64,
    /// The widest sideways step between rows; 0 forces straight seams.
    pub delta_x: usize,
    /// Which axis a two-axis resize handles first.
    pub resize_order: ResizeOrder,
    /// Whether attached auxiliary rasters follow the primary's seams.
    pub carve_auxiliary: bool,
    /// Whether every seam is recorded for visualization.
    pub record_seams: bool,
    /// Upper bound on the growth factor of a single enlargement pass.
    pub enlargement_step: f64,
    /// Seam-map colors for the first and last seam of a pass.
    pub seam_colors: ([u8; 4], [u8; 4]),
}

impl Default for CarverConfig {
    fn default() -> Self {
        CarverConfig {
            energy: EnergyFunction::Norm,
            rigidity: 0.0,
            delta_x: 1,
            resize_order: ResizeOrder::WidthFirst,
            carve_auxiliary: true,
            record_seams: false,
            enlargement_step: 2.0,
            seam_colors: ([255, 0, 0, 255], [255, 255, 0, 255]),
        }
    }
}

impl CarverConfig {
    /// The default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different energy function.
    pub fn with_energy(mut self, energy: EnergyFunction) -> Self {
        self.energy = energy;
        self
    }

    /// Set the rigidity coefficient.
    pub fn with_rigidity(mut self, rigidity: f64) -> Self {
        self.rigidity = rigidity;
        self
    }

    /// Set the maximum seam step.
    pub fn with_delta_x(mut self, delta_x: usize) -> Self {
        self.delta_x = delta_x;
        self
    }

    /// Set the axis order.
    pub fn with_resize_order(mut self, order: ResizeOrder) -> Self {
        self.resize_order = order;
        self
    }

    /// Carve attached auxiliary rasters, or leave them alone.
    pub fn with_carve_auxiliary(mut self, carve: bool) -> Self {
        self.carve_auxiliary = carve;
        self
    }

    /// Record seams for visualization.
    pub fn with_record_seams(mut self, record: bool) -> Self {
        self.record_seams = record;
        self
    }

    /// Set the enlargement step.
    pub fn with_enlargement_step(mut self, step: f64) -> Self {
        self.enlargement_step = step;
        self
    }

    /// Set the seam-map gradient colors.
    pub fn with_seam_colors(mut self, start: [u8; 4], end: [u8; 4]) -> Self {
        self.seam_colors = (start, end);
        self
    }

    /// Refuse values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !self.rigidity.is_finite() || self.rigidity < 0.0 {
            return Err(invalid_parameter(
                "rigidity",
                format!("must be a finite, non-negative number, got {}", self.rigidity),
            ));
        }
        if self.delta_x > MAX_DELTA_X {
            return Err(invalid_parameter(
                "delta_x",
                format!("must be at most {}, got {}", MAX_DELTA_X, self.delta_x),
            ));
        }
        if !(self.enlargement_step > 1.0 && self.enlargement_step <= 2.0) {
            return Err(invalid_parameter(
                "enlargement_step",
                format!("must lie in (1, 2], got {}", self.enlargement_step),
            ));
        }
        Ok(())
    }
}

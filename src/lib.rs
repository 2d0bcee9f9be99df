// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Content-aware image resizing.
//!
//! A `Carver` takes a raw pixel buffer and shrinks or stretches it one
//! seam at a time, where a seam is a connected path of unimportant
//! pixels from the top of the image to the bottom (or from the left to
//! the right).  Importance comes from the image's gradients and from
//! whatever bias the host paints on top.
//!
//! ```no_run
//! use liquidseam::{Carver, CarverConfig};
//!
//! # fn main() -> liquidseam::Result<()> {
//! let pixels = vec![0u8; 64 * 48 * 3];
//! let mut carver = Carver::new(&pixels, 64, 48, 3, CarverConfig::default())?;
//! carver.resize(48, 48)?;
//! assert_eq!(carver.pixels()?.len(), 48 * 48 * 3);
//! # Ok(())
//! # }
//! ```

// #![deny(missing_docs)]

pub mod ternary;

pub mod twodmap;

pub mod error;
pub use error::{CarveError, Result};

pub mod energy;
pub use energy::EnergyFunction;

pub mod rigidity;

pub mod config;
pub use config::{Axis, CarverConfig, ResizeOrder};

pub mod mask;
pub use mask::MaskLayer;

pub mod flipper;
pub mod grid;

pub mod energymap;

pub mod seamfinder;
pub use seamfinder::Seam;

pub mod progress;
pub use progress::{CancelFlag, Progress, Silent};

pub mod seammap;
pub use seammap::SeamMap;

pub mod dump;

pub mod seamcarver;
pub use seamcarver::{AuxId, Carver};

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Carving errors
//!
//! Every failure the engine can produce.  There are only two real
//! families: the caller asked for something nonsensical, which is
//! rejected at the call that asked for it, or the allocator said no,
//! which is fatal to the carver that was in the middle of working.

use failure::Fail;

/// Everything that can go wrong while building or driving a carver.
#[derive(Debug, Fail)]
pub enum CarveError {
    /// A buffer could not be allocated.  The carver that reported this
    /// must be thrown away.
    #[fail(display = "out of memory allocating {} bytes", bytes)]
    OutOfMemory {
        /// The size of the failed request.
        bytes: usize,
    },

    /// Dimensions or buffer sizes that make no sense.
    #[fail(display = "invalid geometry: {}", reason)]
    InvalidGeometry {
        /// What was wrong.
        reason: String,
    },

    /// A configuration value outside its legal range.
    #[fail(display = "invalid parameter '{}': {}", parameter, reason)]
    InvalidParameter {
        /// The parameter name.
        parameter: &'static str,
        /// Why it was refused.
        reason: String,
    },

    /// An energy or cost operation was requested on an auxiliary
    /// raster, which carries color only.
    #[fail(display = "auxiliary rasters carry no energy or cost maps")]
    AuxiliaryRaster,

    /// An auxiliary raster handle that this carver never issued.
    #[fail(display = "no auxiliary raster with index {}", index)]
    UnknownRaster {
        /// The offending handle.
        index: usize,
    },

    /// The cancel flag was raised between two seam steps.
    #[fail(display = "resize canceled")]
    Canceled,

    /// A previous resize ran out of memory and left this carver in an
    /// undefined state.
    #[fail(display = "carver is unusable after an earlier allocation failure")]
    Poisoned,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CarveError>;

pub(crate) fn invalid_geometry(reason: impl Into<String>) -> CarveError {
    CarveError::InvalidGeometry {
        reason: reason.into(),
    }
}

pub(crate) fn invalid_parameter(parameter: &'static str, reason: impl Into<String>) -> CarveError {
    CarveError::InvalidParameter {
        parameter,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let err = invalid_parameter("rigidity", "must be finite");
        assert_eq!(err.to_string(), "invalid parameter 'rigidity': must be finite");
        let err = CarveError::OutOfMemory { bytes: 1024 };
        assert_eq!(err.to_string(), "out of memory allocating 1024 bytes");
    }
}

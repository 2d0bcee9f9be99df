// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Progress reporting and cancellation
//!
//! Carving is synchronous.  The carver reports after every seam step
//! through a `Progress` implementation and, between steps, checks a
//! shared flag the host may raise to stop it.

use crate::config::Axis;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receives progress from a running resize.  Fractions passed to
/// `update` never decrease within one axis and end at 1.0 unless the
/// resize is canceled.
pub trait Progress {
    /// An axis pass of `steps` seam operations is starting.
    fn start(&mut self, _axis: Axis, _steps: usize) {}

    /// The fraction of the current axis pass done so far.
    fn update(&mut self, axis: Axis, fraction: f64);

    /// The axis pass is over.
    fn finish(&mut self, _axis: Axis) {}
}

impl<F: FnMut(Axis, f64)> Progress for F {
    fn update(&mut self, axis: Axis, fraction: f64) {
        self(axis, fraction)
    }
}

/// Reports nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Progress for Silent {
    fn update(&mut self, _axis: Axis, _fraction: f64) {}
}

/// A flag the host raises to stop a resize between two seam steps.
#[derive(Debug, Default, Clone)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// A lowered flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the running (or next) resize to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a cancel is pending.
    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Consume a pending cancel, returning whether there was one.
    pub(crate) fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_progress_sinks() {
        let mut seen = Vec::new();
        {
            let mut sink = |axis: Axis, fraction: f64| seen.push((axis, fraction));
            sink.start(Axis::Width, 2);
            sink.update(Axis::Width, 0.5);
            sink.finish(Axis::Width);
        }
        assert_eq!(seen, vec![(Axis::Width, 0.5)]);
    }

    #[test]
    fn clones_share_the_flag() {
        let flag = CancelFlag::new();
        let handle = flag.clone();
        handle.cancel();
        assert!(flag.is_canceled());
        assert!(flag.take());
        assert!(!handle.is_canceled());
    }
}

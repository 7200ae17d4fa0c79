// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The feature-collector contract `VifExtractor::extract` writes to.
//!
//! A real deployment hands the extractor a sink backed by its own
//! feature database; [`VecSink`] is the in-memory stand-in this crate's
//! own tests use.

use crate::error::Error;

/// An appender keyed by feature name and frame index.
///
/// `VifExtractor::extract` calls `append` exactly four times per frame,
/// once per scale, in scale order. A failure on one append does not
/// stop the remaining three from being attempted.
pub trait FeatureSink {
    fn append(&mut self, name: &str, frame_index: u64, value: f64) -> Result<(), Error>;
}

/// A `FeatureSink` that records every append into a `Vec`, in call
/// order. Useful for tests and simple standalone tools.
#[derive(Default)]
pub struct VecSink {
    entries: Vec<(String, u64, f64)>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[(String, u64, f64)] {
        &self.entries
    }

    /// The value recorded for `name` at `frame_index`, if any.
    pub fn value(&self, name: &str, frame_index: u64) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, idx, _)| n == name && *idx == frame_index)
            .map(|(_, _, v)| *v)
    }
}

impl FeatureSink for VecSink {
    fn append(&mut self, name: &str, frame_index: u64, value: f64) -> Result<(), Error> {
        self.entries.push((name.to_string(), frame_index, value));
        Ok(())
    }
}

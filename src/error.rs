// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// Describes extractor failures.
///
/// This enum covers the three ways `VifExtractor` can fail: the
/// one-time scratch arena allocation at construction, an invalid
/// frame passed to `extract`, and a sink that rejects one of the four
/// per-scale feature appends.
#[derive(Debug)]
pub enum Error {
    /// The scratch arena could not be allocated.
    OutOfMemory,
    /// The reference or distorted frame's geometry doesn't match the
    /// extractor's configured dimensions, or its backing slice is too
    /// short for its own stride and bit depth.
    InvalidFrame(&'static str),
    /// A `FeatureSink::append` call failed.
    SinkAppend(&'static str),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for Error {}

impl From<fallible_collections::TryReserveError> for Error {
    fn from(_: fallible_collections::TryReserveError) -> Error {
        Error::OutOfMemory
    }
}

pub(crate) type Result<T> = std::result::Result<T, Error>;

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! An integer fixed-point Visual Information Fidelity (VIF) feature
//! extractor core.
//!
//! Given a reference frame and a distorted copy of the same
//! dimensions, [`VifExtractor::extract`] runs a four-scale separable
//! Gaussian pyramid and emits one numerator/denominator-derived score
//! per scale through a [`FeatureSink`]. The numeric pipeline is an
//! integer reimplementation of a floating-point reference metric:
//! filter coefficients, rounding constants and the log-table scaling
//! are chosen to reproduce that reference's scores rather than to be
//! independently "correct", so they should not be adjusted without
//! re-deriving them from the reference implementation.
//!
//! This crate only implements the numeric core. Decoding frames from a
//! container, scheduling extraction across many frames, and feeding
//! scores into a larger quality model are all left to the host.

#[macro_use]
extern crate log;

mod arena;
pub mod c_api;
mod error;
mod frame;
mod kernel;
mod log_table;
mod mirror;
mod plane;
mod reduce;
mod sink;
mod statistic;
mod vif_statistic;

mod extractor;

pub use error::Error;
pub use extractor::VifExtractor;
pub use frame::Frame;
pub use sink::{FeatureSink, VecSink};

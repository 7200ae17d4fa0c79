//! A C-callable surface over `VifExtractor`, for hosts that can't link
//! the Rust API directly.
//!
//! An extractor is an opaque pointer from `vif_extractor_new` to
//! `vif_extractor_free`, and failures are reported as a null pointer or
//! a nonzero status rather than a panic or an exception crossing the
//! FFI boundary.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use crate::error::Error;
use crate::extractor::VifExtractor;
use crate::frame::Frame;
use crate::sink::FeatureSink;

/// An opaque handle to a `VifExtractor`.
#[allow(bad_style)]
pub struct vif_extractor_t {
    _rusty_handle: VifExtractor,
}

/// A feature-append callback: `userdata`, a NUL-terminated feature
/// name, the frame index, and the score. Returns `0` on success,
/// nonzero to signal a sink failure.
#[allow(bad_style)]
pub type vif_append_fn = extern "C" fn(userdata: *mut c_void, name: *const c_char, frame_index: u64, value: f64) -> i32;

struct CallbackSink {
    callback: vif_append_fn,
    userdata: *mut c_void,
}

impl FeatureSink for CallbackSink {
    fn append(&mut self, name: &str, frame_index: u64, value: f64) -> Result<(), Error> {
        let c_name = CString::new(name).map_err(|_| Error::SinkAppend("feature name contains a NUL byte"))?;
        let status = (self.callback)(self.userdata, c_name.as_ptr(), frame_index, value);
        if status == 0 {
            Ok(())
        } else {
            Err(Error::SinkAppend("sink callback returned a nonzero status"))
        }
    }
}

/// Allocates a VIF extractor for `width x height` frames.
///
/// Returns `NULL` on allocation failure; the caller owns the returned
/// pointer and must eventually pass it to `vif_extractor_free`.
#[no_mangle]
pub extern "C" fn vif_extractor_new(width: usize, height: usize) -> *mut vif_extractor_t {
    match VifExtractor::new(width, height) {
        Ok(extractor) => Box::into_raw(Box::new(vif_extractor_t { _rusty_handle: extractor })),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Runs the four-scale pipeline over one reference/distorted frame
/// pair and reports each scale's score through `callback`, in scale
/// order. Returns `0` on success, nonzero if either frame is invalid
/// for `extractor`'s configured geometry or any callback invocation
/// reports failure; every scale is still attempted regardless.
///
/// # Safety
/// `extractor` must be a live pointer returned by `vif_extractor_new`.
/// `ref_data` must point to at least `ref_stride_bytes * height`
/// readable bytes, and likewise for `dis_data`/`dis_stride_bytes`.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn vif_extractor_extract(
    extractor: *mut vif_extractor_t,
    ref_data: *const u8,
    ref_stride_bytes: usize,
    dis_data: *const u8,
    dis_stride_bytes: usize,
    width: usize,
    height: usize,
    bit_depth: u8,
    frame_index: u64,
    callback: vif_append_fn,
    userdata: *mut c_void,
) -> i32 {
    if extractor.is_null() || ref_data.is_null() || dis_data.is_null() {
        return -1;
    }
    let extractor = &mut (*extractor)._rusty_handle;

    let ref_bytes = std::slice::from_raw_parts(ref_data, ref_stride_bytes * height);
    let dis_bytes = std::slice::from_raw_parts(dis_data, dis_stride_bytes * height);

    let reference = match Frame::new(width, height, bit_depth, ref_stride_bytes, ref_bytes) {
        Ok(f) => f,
        Err(_) => return -1,
    };
    let distorted = match Frame::new(width, height, bit_depth, dis_stride_bytes, dis_bytes) {
        Ok(f) => f,
        Err(_) => return -1,
    };

    let mut sink = CallbackSink { callback, userdata };
    match extractor.extract(&reference, &distorted, frame_index, &mut sink) {
        Ok(()) => 0,
        Err(_) => -1,
    }
}

/// Frees an extractor allocated by `vif_extractor_new`. A null pointer
/// is accepted and ignored.
///
/// # Safety
/// `extractor` must be a live pointer from `vif_extractor_new`, or null.
#[no_mangle]
pub unsafe extern "C" fn vif_extractor_free(extractor: *mut vif_extractor_t) {
    if extractor.is_null() {
        return;
    }
    let _ = Box::from_raw(extractor);
}

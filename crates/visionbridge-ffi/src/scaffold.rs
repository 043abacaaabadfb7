// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Boundary plumbing shared by the exports: argument decoding, the
// thread-local last error, and the panic guard.

use std::cell::RefCell;
use std::ffi::{CStr, CString, c_char};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use tracing::{error, warn};
use visionbridge_core::error::VisionError;

use crate::error::{BridgeError, VbStatus};

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

pub(crate) fn set_last_error(message: &str) {
    let c_message = CString::new(message.replace('\0', " ")).unwrap_or_default();
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(c_message));
}

pub(crate) fn clear_last_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

/// Pointer to the current thread's last error, or null.
///
/// The pointer stays valid until the slot is next written on this thread.
pub(crate) fn last_error_ptr() -> *const c_char {
    LAST_ERROR.with(|slot| {
        slot.borrow()
            .as_ref()
            .map_or(std::ptr::null(), |message| message.as_ptr())
    })
}

/// Borrow a NUL-terminated UTF-8 string argument.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
pub(crate) unsafe fn cstr_arg<'a>(
    ptr: *const c_char,
    name: &'static str,
) -> Result<&'a str, BridgeError> {
    if ptr.is_null() {
        return Err(BridgeError::NullArgument(name));
    }
    // SAFETY: non-null and NUL-terminated per the caller contract.
    let raw = unsafe { CStr::from_ptr(ptr) };
    raw.to_str().map_err(|_| {
        VisionError::InvalidArgument(format!("`{name}` is not valid UTF-8")).into()
    })
}

/// Borrow a path argument.
///
/// # Safety
///
/// Same contract as [`cstr_arg`].
pub(crate) unsafe fn path_arg<'a>(
    ptr: *const c_char,
    name: &'static str,
) -> Result<&'a Path, BridgeError> {
    // SAFETY: forwarded caller contract.
    let text = unsafe { cstr_arg(ptr, name) }?;
    if text.is_empty() {
        return Err(VisionError::InvalidArgument(format!("`{name}` is empty")).into());
    }
    Ok(Path::new(text))
}

/// Run `body` behind the boundary guard.
///
/// Clears the last error, catches panics, logs failures, and records them as
/// the last error. Returns the status the export should report on failure.
pub(crate) fn guard<T>(
    op: &'static str,
    body: impl FnOnce() -> Result<T, BridgeError>,
) -> Result<T, VbStatus> {
    clear_last_error();
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            warn!(op, error = %err, "FFI call failed");
            set_last_error(&err.to_string());
            Err(err.status())
        }
        Err(_) => {
            error!(op, "Panic caught at FFI boundary");
            set_last_error(&format!("{op}: internal panic"));
            Err(VbStatus::Panic)
        }
    }
}

/// Flatten a status-returning guard result.
pub(crate) fn status_code(result: Result<VbStatus, VbStatus>) -> i32 {
    match result {
        Ok(status) | Err(status) => status as i32,
    }
}

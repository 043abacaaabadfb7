// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// visionbridge-ffi — C ABI exported to mobile hosts (Flutter `dart:ffi`,
// Swift, Kotlin/JNI).
//
// Every `vb_*` export is synchronous and stateless between calls. Exports
// never unwind across the boundary: failures are logged, recorded as the
// thread's last error, and reported as a status code or an empty result.
// Memory handed to the caller is released through the matching `vb_*_free`
// function. The C declarations live in `include/visionbridge.h`.

mod error;
mod exports;
mod logging;
mod scaffold;

#[cfg(target_os = "android")]
pub mod android;

pub use error::{BridgeError, VbStatus};
pub use exports::*;

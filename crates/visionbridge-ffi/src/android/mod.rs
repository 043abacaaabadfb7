// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android JNI entry points.
//
// Kotlin/Java hosts declare the matching natives on
// `com.visionbridge.VisionBridge`:
//
// ```kotlin
// object VisionBridge {
//     init { System.loadLibrary("visionbridge") }
//     external fun version(): String
//     external fun convertToGray(input: String, output: String): Int
//     external fun detectCircles(path: String): IntArray
// }
// ```
//
// `detectCircles` returns `[x0, y0, r0, x1, y1, r1, ...]`; failures return an
// empty array and are logged to logcat. Flutter hosts use the `vb_*` C ABI
// instead.

#![cfg(target_os = "android")]

use jni::JNIEnv;
use jni::objects::{JClass, JString};
use jni::sys::{jint, jintArray, jsize, jstring};

use tracing::error;
use visionbridge_core::error::VisionError;
use visionbridge_imaging::{CircleDetector, convert_to_gray};

use crate::error::{BridgeError, VbStatus};
use crate::logging;
use crate::scaffold::{guard, status_code};

/// Convenience: map any `jni::errors::Error` into a bridge error.
fn jni_err(context: &str, e: jni::errors::Error) -> BridgeError {
    BridgeError::Vision(VisionError::InvalidArgument(format!("{context}: {e}")))
}

/// Copy a Java string argument into Rust.
fn java_string(env: &mut JNIEnv, value: &JString, name: &'static str) -> Result<String, BridgeError> {
    if value.is_null() {
        return Err(BridgeError::NullArgument(name));
    }
    env.get_string(value)
        .map(String::from)
        .map_err(|e| jni_err(name, e))
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_visionbridge_VisionBridge_version<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
) -> jstring {
    logging::init();
    match env.new_string(env!("CARGO_PKG_VERSION")) {
        Ok(version) => version.into_raw(),
        Err(e) => {
            error!(error = %e, "Failed to allocate version string");
            std::ptr::null_mut()
        }
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_visionbridge_VisionBridge_convertToGray<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    input: JString<'local>,
    output: JString<'local>,
) -> jint {
    logging::init();
    let result = guard("convertToGray", || {
        let input = java_string(&mut env, &input, "input")?;
        let output = java_string(&mut env, &output, "output")?;
        convert_to_gray(&input, &output)?;
        Ok(VbStatus::Ok)
    });
    status_code(result)
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_visionbridge_VisionBridge_detectCircles<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    path: JString<'local>,
) -> jintArray {
    logging::init();
    let flattened: Vec<jint> = guard("detectCircles", || {
        let path = java_string(&mut env, &path, "path")?;
        let circles = CircleDetector::default().detect_in_file(&path)?;
        Ok(circles
            .iter()
            .map(|c| c.to_record())
            .flat_map(|r| [r.x, r.y, r.radius])
            .collect())
    })
    .unwrap_or_default();

    let array = match env.new_int_array(flattened.len() as jsize) {
        Ok(array) => array,
        Err(e) => {
            error!(error = %e, "Failed to allocate result array");
            return std::ptr::null_mut();
        }
    };
    if let Err(e) = env.set_int_array_region(&array, 0, &flattened) {
        error!(error = %e, "Failed to fill result array");
        return std::ptr::null_mut();
    }
    array.into_raw()
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `extern "C"` entry points.

use std::ffi::c_char;
use std::path::Path;

use tracing::{debug, info};
use visionbridge_core::config::DetectionConfig;
use visionbridge_core::geometry::segments_cross;
use visionbridge_core::types::{Circle, DetectionRecord, Segment};
use visionbridge_imaging::{CircleDetector, convert_to_gray};

use crate::error::{BridgeError, VbStatus};
use crate::logging;
use crate::scaffold::{cstr_arg, guard, last_error_ptr, path_arg, set_last_error, status_code};

/// NUL-terminated crate version.
const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");

// ---------------------------------------------------------------------------
// Housekeeping
// ---------------------------------------------------------------------------

/// Library version as a static NUL-terminated string. Never null; do not free.
#[unsafe(no_mangle)]
pub extern "C" fn vb_version() -> *const c_char {
    VERSION.as_ptr().cast()
}

/// Install the logging backend. Safe to call more than once.
#[unsafe(no_mangle)]
pub extern "C" fn vb_init_logging() {
    logging::init();
}

/// Message describing the last failed call on this thread, or null.
///
/// The string is owned by the library and stays valid until the next
/// `vb_*` call on the same thread.
#[unsafe(no_mangle)]
pub extern "C" fn vb_last_error_message() -> *const c_char {
    last_error_ptr()
}

// ---------------------------------------------------------------------------
// Grayscale conversion
// ---------------------------------------------------------------------------

/// Convert the image at `input_path` to grayscale and write it to
/// `output_path` (format from extension). Returns a `VbStatus` code.
///
/// # Safety
///
/// Both arguments must be null or NUL-terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vb_convert_to_gray(
    input_path: *const c_char,
    output_path: *const c_char,
) -> i32 {
    let result = guard("vb_convert_to_gray", || {
        // SAFETY: caller contract.
        let input = unsafe { path_arg(input_path, "input_path") }?;
        let output = unsafe { path_arg(output_path, "output_path") }?;
        info!(input = %input.display(), output = %output.display(), "Grayscale conversion requested");
        convert_to_gray(input, output)?;
        Ok(VbStatus::Ok)
    });
    status_code(result)
}

// ---------------------------------------------------------------------------
// Circle detection: opaque list handle
// ---------------------------------------------------------------------------

/// Detections owned by the library, handed out as an opaque pointer.
pub struct VbCircleList {
    circles: Vec<Circle>,
}

/// Detect circles and return them as an opaque list, or null on failure.
///
/// Release the list with [`vb_circle_list_free`].
///
/// # Safety
///
/// `image_path` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vb_detect_circles(image_path: *const c_char) -> *mut VbCircleList {
    let result = guard("vb_detect_circles", || {
        // SAFETY: caller contract.
        let path = unsafe { path_arg(image_path, "image_path") }?;
        let circles = detect_default(path)?;
        Ok(Box::into_raw(Box::new(VbCircleList { circles })))
    });
    result.unwrap_or(std::ptr::null_mut())
}

/// Number of circles in `list` (0 for null).
///
/// # Safety
///
/// `list` must be null or a live pointer from [`vb_detect_circles`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vb_circle_list_len(list: *const VbCircleList) -> usize {
    // SAFETY: caller contract.
    unsafe { list.as_ref() }.map_or(0, |list| list.circles.len())
}

/// Copy circle `index` into `out`. Returns false when out of range or when
/// either pointer is null.
///
/// # Safety
///
/// `list` must be null or live; `out` must be null or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vb_circle_list_get(
    list: *const VbCircleList,
    index: usize,
    out: *mut Circle,
) -> bool {
    // SAFETY: caller contract.
    let Some(list) = (unsafe { list.as_ref() }) else {
        return false;
    };
    if out.is_null() {
        return false;
    }
    match list.circles.get(index) {
        Some(circle) => {
            // SAFETY: `out` is non-null and writable per the caller contract.
            unsafe { out.write(*circle) };
            true
        }
        None => false,
    }
}

/// Release a list from [`vb_detect_circles`]. Null is ignored.
///
/// # Safety
///
/// `list` must be null or a pointer not yet freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vb_circle_list_free(list: *mut VbCircleList) {
    if !list.is_null() {
        // SAFETY: pointer was produced by `Box::into_raw` in `vb_detect_circles`.
        drop(unsafe { Box::from_raw(list) });
    }
}

// ---------------------------------------------------------------------------
// Circle detection: flat record arrays
// ---------------------------------------------------------------------------

/// Detect circles and return a heap array of records, storing its length in
/// `*count`.
///
/// Returns null with `*count == 0` on failure and when nothing was found.
/// Release the array with [`vb_free_detections`].
///
/// # Safety
///
/// `image_path` must be null or a NUL-terminated string; `count` must be
/// null or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vb_get_detections(
    image_path: *const c_char,
    count: *mut usize,
) -> *mut DetectionRecord {
    let result = guard("vb_get_detections", || {
        // SAFETY: caller contract.
        let path = unsafe { path_arg(image_path, "image_path") }?;
        detect_default(path)
    });
    // SAFETY: caller contract.
    unsafe { hand_out(result, count) }
}

/// Same as [`vb_get_detections`] with a JSON `DetectionConfig`. A null
/// `config_json` uses the defaults; missing fields take their defaults.
///
/// # Safety
///
/// As [`vb_get_detections`]; `config_json` must be null or NUL-terminated.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vb_detect_circles_with_config(
    image_path: *const c_char,
    config_json: *const c_char,
    count: *mut usize,
) -> *mut DetectionRecord {
    let result = guard("vb_detect_circles_with_config", || {
        // SAFETY: caller contract.
        let path = unsafe { path_arg(image_path, "image_path") }?;
        let config = if config_json.is_null() {
            DetectionConfig::default()
        } else {
            // SAFETY: caller contract.
            let json = unsafe { cstr_arg(config_json, "config_json") }?;
            DetectionConfig::from_json_str(json)?
        };
        Ok(CircleDetector::new(config)?.detect_in_file(path)?)
    });
    // SAFETY: caller contract.
    unsafe { hand_out(result, count) }
}

/// Detect circles in an encoded image held in memory (PNG, JPEG, ...).
///
/// # Safety
///
/// `data` must be null or readable for `len` bytes; `count` must be null or
/// writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vb_get_detections_from_bytes(
    data: *const u8,
    len: usize,
    count: *mut usize,
) -> *mut DetectionRecord {
    let result = guard("vb_get_detections_from_bytes", || {
        if data.is_null() {
            return Err(BridgeError::NullArgument("data"));
        }
        // SAFETY: non-null and readable for `len` bytes per the caller contract.
        let bytes = unsafe { std::slice::from_raw_parts(data, len) };
        Ok(CircleDetector::default().detect_in_bytes(bytes)?)
    });
    // SAFETY: caller contract.
    unsafe { hand_out(result, count) }
}

/// Release an array from any record-returning detection call.
///
/// `count` must be the value that call stored. Null is ignored.
///
/// # Safety
///
/// `records` must be null or an array not yet freed, paired with its count.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vb_free_detections(records: *mut DetectionRecord, count: usize) {
    if records.is_null() {
        return;
    }
    let slice = std::ptr::slice_from_raw_parts_mut(records, count);
    // SAFETY: produced by `Box::<[DetectionRecord]>::into_raw` with this length.
    drop(unsafe { Box::from_raw(slice) });
}

/// Detect circles into a caller-owned buffer.
///
/// `*count` receives the number of circles found. At most `capacity`
/// records are written; when more were found the call returns
/// `BufferTooSmall`. Passing a null `buffer` with `capacity == 0` queries
/// the count only.
///
/// # Safety
///
/// `image_path` must be null or NUL-terminated; `buffer` must be null or
/// writable for `capacity` records; `count` must be null or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vb_detect_into(
    image_path: *const c_char,
    buffer: *mut DetectionRecord,
    capacity: usize,
    count: *mut usize,
) -> i32 {
    // SAFETY: caller contract.
    unsafe { store_count(count, 0) };
    let result = guard("vb_detect_into", || {
        if buffer.is_null() && capacity > 0 {
            return Err(BridgeError::NullArgument("buffer"));
        }
        // SAFETY: caller contract.
        let path = unsafe { path_arg(image_path, "image_path") }?;
        let circles = detect_default(path)?;

        let written = circles.len().min(capacity);
        for (i, circle) in circles.iter().take(written).enumerate() {
            // SAFETY: `i < capacity` and the buffer is writable for `capacity`.
            unsafe { buffer.add(i).write(circle.to_record()) };
        }
        // SAFETY: caller contract.
        unsafe { store_count(count, circles.len()) };

        if circles.len() > capacity {
            set_last_error(&format!(
                "buffer holds {capacity} records but {} circles were detected",
                circles.len()
            ));
            Ok(VbStatus::BufferTooSmall)
        } else {
            Ok(VbStatus::Ok)
        }
    });
    status_code(result)
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Whether segment `(x1, y1)-(x2, y2)` crosses segment `(x3, y3)-(x4, y4)`.
#[unsafe(no_mangle)]
#[allow(clippy::too_many_arguments)]
pub extern "C" fn vb_segments_cross(
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    x3: i32,
    y3: i32,
    x4: i32,
    y4: i32,
) -> bool {
    segments_cross(
        &Segment::from_coords([x1, y1, x2, y2]),
        &Segment::from_coords([x3, y3, x4, y4]),
    )
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The single detection path behind every default-config export.
fn detect_default(path: &Path) -> Result<Vec<Circle>, BridgeError> {
    Ok(CircleDetector::default().detect_in_file(path)?)
}

/// Write `value` through `count` when it is non-null.
///
/// # Safety
///
/// `count` must be null or writable.
unsafe fn store_count(count: *mut usize, value: usize) {
    if !count.is_null() {
        // SAFETY: non-null and writable per the caller contract.
        unsafe { count.write(value) };
    }
}

/// Move detections into a boxed slice owned by the caller.
///
/// # Safety
///
/// `count` must be null or writable.
unsafe fn hand_out(
    result: Result<Vec<Circle>, VbStatus>,
    count: *mut usize,
) -> *mut DetectionRecord {
    let records: Vec<DetectionRecord> = match result {
        Ok(circles) => circles.iter().map(Circle::to_record).collect(),
        Err(_) => Vec::new(),
    };
    // SAFETY: forwarded caller contract.
    unsafe { store_count(count, records.len()) };
    if records.is_empty() {
        return std::ptr::null_mut();
    }
    debug!(count = records.len(), "Returning detections");
    Box::into_raw(records.into_boxed_slice()).cast()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::{CStr, CString};

    use image::{GrayImage, Luma, Rgb, RgbImage};
    use imageproc::drawing::draw_filled_circle_mut;

    fn c_path(path: &Path) -> CString {
        CString::new(path.to_str().expect("utf-8 path")).expect("no interior NUL")
    }

    fn write_disks(dir: &Path) -> std::path::PathBuf {
        let mut img = GrayImage::from_pixel(320, 240, Luma([20u8]));
        for (center, radius) in [((80, 90), 45), ((230, 130), 50)] {
            draw_filled_circle_mut(&mut img, center, radius, Luma([235u8]));
        }
        let path = dir.join("disks.png");
        img.save(&path).expect("write fixture");
        path
    }

    fn last_error() -> Option<String> {
        let ptr = vb_last_error_message();
        if ptr.is_null() {
            None
        } else {
            Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
        }
    }

    fn list_records(list: *const VbCircleList) -> Vec<DetectionRecord> {
        let len = unsafe { vb_circle_list_len(list) };
        (0..len)
            .map(|i| {
                let mut circle = Circle::new(0.0, 0.0, 0.0);
                assert!(unsafe { vb_circle_list_get(list, i, &mut circle) });
                circle.to_record()
            })
            .collect()
    }

    #[test]
    fn version_is_non_empty() {
        let version = unsafe { CStr::from_ptr(vb_version()) };
        let text = version.to_str().expect("utf-8");
        assert!(!text.is_empty());
        assert_eq!(text, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn logging_can_be_initialised_twice() {
        vb_init_logging();
        vb_init_logging();
    }

    #[test]
    fn convert_to_gray_writes_single_channel_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("color.png");
        RgbImage::from_fn(40, 30, |x, y| Rgb([(x * 6) as u8, (y * 8) as u8, 200]))
            .save(&input)
            .expect("write fixture");
        let output = dir.path().join("gray.png");

        let status = unsafe { vb_convert_to_gray(c_path(&input).as_ptr(), c_path(&output).as_ptr()) };

        assert_eq!(status, VbStatus::Ok as i32);
        assert!(last_error().is_none());
        let written = image::open(&output).expect("output decodes");
        assert_eq!(written.color().channel_count(), 1);
    }

    #[test]
    fn convert_to_gray_reports_missing_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("missing.png");
        let output = dir.path().join("gray.png");

        let status = unsafe { vb_convert_to_gray(c_path(&input).as_ptr(), c_path(&output).as_ptr()) };

        assert_eq!(status, VbStatus::NotFound as i32);
        assert!(!output.exists());
        assert!(last_error().expect("error recorded").contains("missing.png"));
    }

    #[test]
    fn convert_to_gray_rejects_null() {
        let status = unsafe { vb_convert_to_gray(std::ptr::null(), std::ptr::null()) };
        assert_eq!(status, VbStatus::NullArgument as i32);
    }

    #[test]
    fn missing_file_yields_empty_results_everywhere() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = c_path(&dir.path().join("absent.jpg"));

        let list = unsafe { vb_detect_circles(path.as_ptr()) };
        assert!(list.is_null());
        assert_eq!(unsafe { vb_circle_list_len(list) }, 0);

        let mut count = 99usize;
        let records = unsafe { vb_get_detections(path.as_ptr(), &mut count) };
        assert!(records.is_null());
        assert_eq!(count, 0);
        assert!(last_error().is_some());

        let mut count = 99usize;
        let status = unsafe { vb_detect_into(path.as_ptr(), std::ptr::null_mut(), 0, &mut count) };
        assert_eq!(status, VbStatus::NotFound as i32);
        assert_eq!(count, 0);
    }

    #[test]
    fn corrupt_file_is_distinguished_from_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bad = dir.path().join("bad.png");
        std::fs::write(&bad, b"not an image").expect("write");

        let mut count = 0usize;
        let status = unsafe { vb_detect_into(c_path(&bad).as_ptr(), std::ptr::null_mut(), 0, &mut count) };
        assert_eq!(status, VbStatus::DecodeFailed as i32);
    }

    #[test]
    fn entry_points_agree() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = c_path(&write_disks(dir.path()));

        let list = unsafe { vb_detect_circles(path.as_ptr()) };
        assert!(!list.is_null());
        let from_list = list_records(list);
        unsafe { vb_circle_list_free(list) };

        let mut count = 0usize;
        let records = unsafe { vb_get_detections(path.as_ptr(), &mut count) };
        let from_array = if records.is_null() {
            Vec::new()
        } else {
            unsafe { std::slice::from_raw_parts(records, count) }.to_vec()
        };
        unsafe { vb_free_detections(records, count) };

        let mut buffer = [DetectionRecord::default(); 16];
        let mut found = 0usize;
        let status = unsafe {
            vb_detect_into(path.as_ptr(), buffer.as_mut_ptr(), buffer.len(), &mut found)
        };
        assert_eq!(status, VbStatus::Ok as i32);

        assert_eq!(count, 2, "got {from_array:?}");
        assert_eq!(from_list.len(), count);
        assert_eq!(found, count);
        assert_eq!(from_list, from_array);
        assert_eq!(&buffer[..found], from_array.as_slice());
    }

    #[test]
    fn config_variant_finds_disks_and_matches_bytes_variant() {
        let dir = tempfile::tempdir().expect("tempdir");
        let fixture = write_disks(dir.path());
        let path = c_path(&fixture);
        let json = CString::new(r#"{ "hough": { "acc_threshold": 30 } }"#).expect("json");

        let mut count = 0usize;
        let records = unsafe { vb_detect_circles_with_config(path.as_ptr(), json.as_ptr(), &mut count) };
        assert_eq!(count, 2, "{:?}", last_error());
        let mut found = unsafe { std::slice::from_raw_parts(records, count) }.to_vec();
        unsafe { vb_free_detections(records, count) };
        found.sort_by_key(|r| r.x);
        assert!((found[0].x - 80).abs() <= 3 && (found[0].y - 90).abs() <= 3);
        assert!((found[1].x - 230).abs() <= 3 && (found[1].y - 130).abs() <= 3);
        assert!((found[0].radius - 45).abs() <= 3);
        assert!((found[1].radius - 50).abs() <= 3);

        // The null config and the in-memory variant both use the defaults.
        let mut default_count = 0usize;
        let defaults = unsafe {
            vb_detect_circles_with_config(path.as_ptr(), std::ptr::null(), &mut default_count)
        };
        let bytes = std::fs::read(&fixture).expect("read");
        let mut bytes_count = 0usize;
        let from_bytes = unsafe {
            vb_get_detections_from_bytes(bytes.as_ptr(), bytes.len(), &mut bytes_count)
        };
        assert_eq!(default_count, bytes_count);
        unsafe {
            vb_free_detections(defaults, default_count);
            vb_free_detections(from_bytes, bytes_count);
        }
    }

    #[test]
    fn invalid_config_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = c_path(&write_disks(dir.path()));
        let json = CString::new(r#"{ "blur_kernel_size": 4 }"#).expect("json");

        let mut count = 7usize;
        let records = unsafe { vb_detect_circles_with_config(path.as_ptr(), json.as_ptr(), &mut count) };
        assert!(records.is_null());
        assert_eq!(count, 0);
        assert!(last_error().expect("error").contains("blur_kernel_size"));
    }

    #[test]
    fn small_buffer_reports_true_count() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = c_path(&write_disks(dir.path()));

        let mut total = 0usize;
        let status = unsafe { vb_detect_into(path.as_ptr(), std::ptr::null_mut(), 0, &mut total) };
        assert_eq!(total, 2);
        assert_eq!(status, VbStatus::BufferTooSmall as i32);
        assert!(last_error().is_some_and(|m| m.contains("buffer holds 0 records")));

        let mut all = [DetectionRecord::default(); 2];
        let mut found = 0usize;
        let status = unsafe { vb_detect_into(path.as_ptr(), all.as_mut_ptr(), 2, &mut found) };
        assert_eq!(status, VbStatus::Ok as i32);
        assert_eq!(found, 2);

        let mut one = [DetectionRecord::default(); 1];
        let mut found = 0usize;
        let status = unsafe { vb_detect_into(path.as_ptr(), one.as_mut_ptr(), 1, &mut found) };
        assert_eq!(status, VbStatus::BufferTooSmall as i32);
        assert_eq!(found, total);
        assert_eq!(one[0], all[0]);
    }

    #[test]
    fn null_buffer_with_capacity_is_rejected() {
        let mut count = 0usize;
        let status = unsafe {
            vb_detect_into(c"whatever.png".as_ptr(), std::ptr::null_mut(), 4, &mut count)
        };
        assert_eq!(status, VbStatus::NullArgument as i32);
    }

    #[test]
    fn list_accessors_tolerate_bad_input() {
        let mut circle = Circle::new(0.0, 0.0, 0.0);
        assert!(!unsafe { vb_circle_list_get(std::ptr::null(), 0, &mut circle) });
        unsafe { vb_circle_list_free(std::ptr::null_mut()) };
        unsafe { vb_free_detections(std::ptr::null_mut(), 0) };

        let list = Box::into_raw(Box::new(VbCircleList {
            circles: vec![Circle::new(1.0, 2.0, 3.0)],
        }));
        assert!(!unsafe { vb_circle_list_get(list, 1, &mut circle) });
        assert!(!unsafe { vb_circle_list_get(list, 0, std::ptr::null_mut()) });
        assert!(unsafe { vb_circle_list_get(list, 0, &mut circle) });
        assert_eq!(circle, Circle::new(1.0, 2.0, 3.0));
        unsafe { vb_circle_list_free(list) };
    }

    #[test]
    fn bytes_variant_rejects_null() {
        let mut count = 5usize;
        let records = unsafe { vb_get_detections_from_bytes(std::ptr::null(), 10, &mut count) };
        assert!(records.is_null());
        assert_eq!(count, 0);
    }

    #[test]
    fn segments_cross_over_ffi() {
        assert!(vb_segments_cross(0, 0, 10, 10, 0, 10, 10, 0));
        assert!(!vb_segments_cross(0, 0, 10, 0, 0, 5, 10, 5));
    }
}

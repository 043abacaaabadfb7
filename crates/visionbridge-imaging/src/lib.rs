// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// visionbridge-imaging — Image operations behind the VisionBridge C ABI.
//
// Provides image loading and grayscale conversion (`processor`) and a gradient
// Hough transform for circle detection (`hough`).

pub mod hough;
pub mod processor;

pub use hough::{CircleDetector, detect_circles};
pub use processor::{ImageProcessor, convert_to_gray};

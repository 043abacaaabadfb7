// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VisionError};

/// Parameters of the gradient Hough circle transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughParams {
    /// Inverse ratio of accumulator resolution to image resolution.
    pub dp: f32,
    /// Minimum distance between the centers of two accepted circles.
    pub min_dist: f32,
    /// Upper Canny threshold. The lower threshold is half of it.
    pub canny_high: f32,
    /// Votes a center needs in the accumulator, and edge support a radius
    /// needs, before a circle is accepted.
    pub acc_threshold: u32,
    pub min_radius: u32,
    /// Largest radius searched. `0` means the image diagonal.
    pub max_radius: u32,
    /// Optional cap on the number of circles returned.
    pub max_circles: Option<usize>,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            dp: 1.2,
            min_dist: 70.0,
            canny_high: 100.0,
            acc_threshold: 80,
            min_radius: 10,
            max_radius: 70,
            max_circles: None,
        }
    }
}

/// Settings for the circle detection pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Side of the square Gaussian kernel applied before detection (odd).
    pub blur_kernel_size: u32,
    /// Explicit blur sigma. When unset it is derived from the kernel size.
    pub blur_sigma: Option<f32>,
    pub hough: HoughParams,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            blur_kernel_size: 5,
            blur_sigma: None,
            hough: HoughParams::default(),
        }
    }
}

impl DetectionConfig {
    /// Gaussian sigma actually used for the pre-detection blur.
    pub fn effective_sigma(&self) -> f32 {
        self.blur_sigma
            .unwrap_or_else(|| sigma_for_kernel(self.blur_kernel_size))
    }

    /// Reject parameter combinations the detector cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.blur_kernel_size == 0 || self.blur_kernel_size % 2 == 0 {
            return Err(VisionError::InvalidConfig(format!(
                "blur_kernel_size must be odd and positive, got {}",
                self.blur_kernel_size
            )));
        }
        if let Some(sigma) = self.blur_sigma {
            if !(sigma.is_finite() && sigma > 0.0) {
                return Err(VisionError::InvalidConfig(format!(
                    "blur_sigma must be positive, got {sigma}"
                )));
            }
        }

        let hough = &self.hough;
        if !(hough.dp.is_finite() && hough.dp >= 1.0) {
            return Err(VisionError::InvalidConfig(format!(
                "dp must be >= 1, got {}",
                hough.dp
            )));
        }
        if !(hough.min_dist.is_finite() && hough.min_dist > 0.0) {
            return Err(VisionError::InvalidConfig(format!(
                "min_dist must be positive, got {}",
                hough.min_dist
            )));
        }
        if !(hough.canny_high.is_finite() && hough.canny_high > 0.0) {
            return Err(VisionError::InvalidConfig(format!(
                "canny_high must be positive, got {}",
                hough.canny_high
            )));
        }
        if hough.acc_threshold == 0 {
            return Err(VisionError::InvalidConfig(
                "acc_threshold must be at least 1".into(),
            ));
        }
        if hough.max_radius != 0 && hough.max_radius < hough.min_radius {
            return Err(VisionError::InvalidConfig(format!(
                "max_radius {} is smaller than min_radius {}",
                hough.max_radius, hough.min_radius
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Sigma matching a square Gaussian kernel of side `kernel_size`.
pub fn sigma_for_kernel(kernel_size: u32) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

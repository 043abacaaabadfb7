// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Circle detection by gradient Hough transform.

mod accumulator;
mod radius;

use std::path::Path;

use image::{DynamicImage, GrayImage};
use tracing::{debug, info, instrument, warn};
use visionbridge_core::config::DetectionConfig;
use visionbridge_core::error::Result;
use visionbridge_core::types::Circle;

use crate::processor::ImageProcessor;
use accumulator::{Accumulator, edge_points};
use radius::best_radius;

/// Detects circles in images with a two-stage gradient Hough transform.
///
/// ## Pipeline
///
/// 1. Grayscale conversion and Gaussian blur (see [`DetectionConfig`])
/// 2. Canny edges, Sobel gradients
/// 3. Every edge pixel votes along its gradient line for centers at
///    `min_radius..=max_radius`
/// 4. Local maxima of the 3×3-summed accumulator above `acc_threshold`
///    become center candidates, strongest first
/// 5. Each candidate far enough from accepted circles gets the radius with
///    the best edge support; it is accepted when that support exceeds
///    `acc_threshold`
#[derive(Debug, Clone)]
pub struct CircleDetector {
    config: DetectionConfig,
}

impl CircleDetector {
    /// Build a detector after validating `config`.
    pub fn new(config: DetectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Load the file at `path` and detect circles in it.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn detect_in_file(&self, path: impl AsRef<Path>) -> Result<Vec<Circle>> {
        let processor = ImageProcessor::open(path.as_ref())?;
        Ok(self.detect_in_image(processor.as_dynamic()))
    }

    /// Decode `data` (PNG, JPEG, ...) and detect circles in it.
    #[instrument(skip(self, data), fields(data_len = data.len()))]
    pub fn detect_in_bytes(&self, data: &[u8]) -> Result<Vec<Circle>> {
        let processor = ImageProcessor::from_bytes(data)?;
        Ok(self.detect_in_image(processor.as_dynamic()))
    }

    /// Grayscale, blur, and detect.
    pub fn detect_in_image(&self, image: &DynamicImage) -> Vec<Circle> {
        let blurred = ImageProcessor::from_dynamic(image.clone())
            .gaussian_blur(self.config.blur_kernel_size, self.config.blur_sigma)
            .to_luma8();
        self.detect(&blurred)
    }

    /// Run the transform on a grayscale plane that is already smoothed.
    #[instrument(skip_all, fields(width = gray.width(), height = gray.height()))]
    pub fn detect(&self, gray: &GrayImage) -> Vec<Circle> {
        let params = &self.config.hough;
        let (width, height) = gray.dimensions();
        if width < 3 || height < 3 {
            warn!("Image too small for circle detection");
            return Vec::new();
        }

        let max_radius = if params.max_radius == 0 {
            (width as f32).hypot(height as f32).ceil() as u32
        } else {
            params.max_radius
        };
        let min_radius = params.min_radius;

        let Some(mut acc) = Accumulator::new(width, height, params.dp) else {
            return Vec::new();
        };

        let edges = edge_points(gray, params.canny_high);
        if edges.is_empty() {
            debug!("No edge pixels; nothing to detect");
            return Vec::new();
        }
        for point in &edges {
            acc.vote(point, min_radius, max_radius);
        }

        let candidates = acc.centers(params.acc_threshold);
        debug!(
            edge_pixels = edges.len(),
            candidates = candidates.len(),
            "Accumulator scanned"
        );

        let min_r2 = (min_radius as f32).powi(2);
        let max_r2 = (max_radius as f32).powi(2);
        let min_dist2 = params.min_dist.powi(2);
        let mut circles: Vec<Circle> = Vec::new();
        let mut distances: Vec<f32> = Vec::with_capacity(edges.len());

        for candidate in candidates {
            let crowded = circles.iter().any(|c| {
                (c.x - candidate.x).powi(2) + (c.y - candidate.y).powi(2) < min_dist2
            });
            if crowded {
                continue;
            }

            distances.clear();
            distances.extend(edges.iter().filter_map(|p| {
                let d2 = (p.x as f32 - candidate.x).powi(2) + (p.y as f32 - candidate.y).powi(2);
                (min_r2..=max_r2).contains(&d2).then(|| d2.sqrt())
            }));
            distances.sort_by(f32::total_cmp);

            let Some((radius, support)) = best_radius(&distances, params.dp) else {
                continue;
            };
            if support as u32 > params.acc_threshold {
                circles.push(Circle::new(candidate.x, candidate.y, radius));
                if params.max_circles.is_some_and(|cap| circles.len() >= cap) {
                    break;
                }
            }
        }

        info!(count = circles.len(), "Detected circles");
        circles
    }
}

impl Default for CircleDetector {
    fn default() -> Self {
        Self {
            config: DetectionConfig::default(),
        }
    }
}

/// Detect circles in the file at `path` with the default configuration.
pub fn detect_circles(path: impl AsRef<Path>) -> Result<Vec<Circle>> {
    CircleDetector::default().detect_in_file(path)
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — load, grayscale, blur, and save. Operates on in-memory
// images using the `image` and `imageproc` crates.

use std::path::Path;

use image::{DynamicImage, GrayImage};
use imageproc::filter::gaussian_blur_f32;
use tracing::{debug, info, instrument, warn};
use visionbridge_core::config::sigma_for_kernel;
use visionbridge_core::error::{Result, VisionError};

/// Image pipeline operating on a single in-memory image.
///
/// Each transformation consumes `self` and returns a new `ImageProcessor`,
/// enabling method chaining:
///
/// ```ignore
/// ImageProcessor::open("photo.jpg")?
///     .grayscale()
///     .save("photo-gray.png")?;
/// ```
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    ///
    /// A path that does not exist yields [`VisionError::NotFound`]; any other
    /// failure to read or decode yields [`VisionError::Decode`].
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Input image does not exist");
            return Err(VisionError::NotFound(path.to_path_buf()));
        }
        let img = image::open(path).map_err(|err| VisionError::Decode {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        info!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self { image: img })
    }

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data).map_err(|err| VisionError::Decode {
            path: "<memory>".into(),
            reason: err.to_string(),
        })?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Number of color channels in the current image.
    pub fn channels(&self) -> u8 {
        self.image.color().channel_count()
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    /// 8-bit luma copy of the current image.
    pub fn to_luma8(&self) -> GrayImage {
        self.image.to_luma8()
    }

    // -- Transformations ------------------------------------------------------

    /// Convert to a single-channel 8-bit luma image. Alpha is dropped.
    #[instrument(skip(self))]
    pub fn grayscale(self) -> Self {
        debug!(channels = self.channels(), "Converting to grayscale");
        Self {
            image: DynamicImage::ImageLuma8(self.image.to_luma8()),
        }
    }

    /// Gaussian blur of the luma plane.
    ///
    /// `sigma` of `None` derives the standard deviation from `kernel_size`.
    #[instrument(skip(self))]
    pub fn gaussian_blur(self, kernel_size: u32, sigma: Option<f32>) -> Self {
        let sigma = sigma.unwrap_or_else(|| sigma_for_kernel(kernel_size));
        if !(sigma.is_finite() && sigma > 0.0) {
            warn!(sigma, "Non-positive blur sigma; skipping blur");
            return self.grayscale();
        }
        debug!(sigma, "Applying Gaussian blur");
        let blurred = gaussian_blur_f32(&self.image.to_luma8(), sigma);
        Self {
            image: DynamicImage::ImageLuma8(blurred),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Write the image to a file. The format is inferred from the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.image.save(path).map_err(|err| VisionError::Encode {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }
}

/// Load `input`, convert it to grayscale, and write the result to `output`.
#[instrument(skip_all, fields(input = %input.as_ref().display(), output = %output.as_ref().display()))]
pub fn convert_to_gray(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
    info!("Converting image to grayscale");
    let gray = ImageProcessor::open(input.as_ref())?.grayscale();
    gray.save(output.as_ref())?;
    info!(
        width = gray.width(),
        height = gray.height(),
        "Grayscale image written"
    );
    Ok(())
}

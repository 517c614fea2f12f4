//! Page image preprocessing
//!
//! Turns a raw scanned page into a binarized, deskewed, denoised grayscale
//! image for the recognizer:
//!
//! ```text
//! grayscale -> gaussian 5x5 -> adaptive threshold (11, 2) -> deskew -> median 3x3
//! ```
//!
//! Every step keeps the input's width and height.

mod deskew;
mod filters;

use std::io::Cursor;

use image::{DynamicImage, GrayImage};
use imageproc::filter::median_filter;

pub use deskew::{deskew, effective_angle, estimate_skew, rotate_replicate};
pub use filters::{adaptive_threshold_gaussian, gaussian_kernel, gaussian_smooth, Border};

/// Filter chain parameters
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Gaussian smoothing window (odd)
    pub blur_kernel: u32,
    /// Adaptive threshold neighbourhood (odd)
    pub threshold_block: u32,
    /// Constant subtracted from the local mean
    pub threshold_bias: f64,
    /// Skew angles at or below this (degrees) are left alone
    pub min_skew_degrees: f64,
    /// Median window is `2 * radius + 1`
    pub median_radius: u32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            blur_kernel: 5,
            threshold_block: 11,
            threshold_bias: 2.0,
            min_skew_degrees: 0.5,
            median_radius: 1,
        }
    }
}

/// A binarized page ready for recognition
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessedImage(GrayImage);

impl PreprocessedImage {
    pub fn as_gray(&self) -> &GrayImage {
        &self.0
    }

    pub fn into_inner(self) -> GrayImage {
        self.0
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    /// Encode as PNG for engines that take image files
    pub fn to_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut buffer = Vec::new();
        self.0
            .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)?;
        Ok(buffer)
    }
}

/// Run the full filter chain with default parameters
pub fn preprocess(image: &DynamicImage) -> PreprocessedImage {
    preprocess_with(image, &PreprocessConfig::default())
}

pub fn preprocess_with(image: &DynamicImage, config: &PreprocessConfig) -> PreprocessedImage {
    let gray: GrayImage = image.to_luma8();
    if gray.width() == 0 || gray.height() == 0 {
        return PreprocessedImage(gray);
    }

    let smoothed = gaussian_smooth(&gray, config.blur_kernel, Border::Reflect101);
    let binary =
        adaptive_threshold_gaussian(&smoothed, config.threshold_block, config.threshold_bias);
    let straightened = deskew(&binary, config.min_skew_degrees);
    let denoised = median_filter(&straightened, config.median_radius, config.median_radius);

    PreprocessedImage(denoised)
}

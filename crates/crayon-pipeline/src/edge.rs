//! Grayscale conversion, smoothing and Canny edge detection.
//!
//! Wraps [`imageproc::edges::canny`] to turn the preprocessed drawing into
//! a binary edge map: white pixels (255) are edges, black pixels (0) are
//! background. The map feeds contour tracing.

use image::GrayImage;

use crate::types::{AnalysisConfig, RgbImage};

/// Minimum allowed Canny threshold.
///
/// A low threshold of zero treats every pixel with any gradient as a
/// potential edge, which floods contour tracing with paper texture.
pub const MIN_THRESHOLD: f32 = 1.0;
const _: () = assert!(MIN_THRESHOLD > 0.0);

/// Convert to grayscale, smooth, and detect edges.
#[must_use = "returns the binary edge map"]
pub fn edge_map(image: &RgbImage, config: &AnalysisConfig) -> GrayImage {
    let gray = image::imageops::grayscale(image);
    let blurred = gaussian_blur(&gray, config.edge_blur_sigma);
    canny(&blurred, config.canny_low, config.canny_high)
}

/// Apply Gaussian blur to a grayscale image.
///
/// Non-positive sigma values return the image unchanged, since
/// `imageproc`'s underlying function panics on `sigma <= 0.0`.
#[must_use = "returns the blurred image"]
pub fn gaussian_blur(image: &GrayImage, sigma: f32) -> GrayImage {
    if sigma <= 0.0 || sigma.is_nan() {
        return image.clone();
    }

    imageproc::filter::gaussian_blur_f32(image, sigma)
}

/// Detect edges using the Canny algorithm.
///
/// Returns a binary image: 255 for edge pixels, 0 for non-edge.
///
/// Both thresholds are clamped to a minimum of [`MIN_THRESHOLD`] and
/// `low_threshold` is clamped to be at most `high_threshold`, so a bad
/// configuration cannot trip `imageproc`'s threshold assertion.
#[must_use = "returns the binary edge map"]
pub fn canny(image: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    let high = high_threshold.max(MIN_THRESHOLD);
    let low = low_threshold.max(MIN_THRESHOLD).min(high);
    imageproc::edges::canny(image, low, high)
}

//! Noise reduction and contrast normalization.
//!
//! Scanned or photographed drawings carry paper grain and sensor noise
//! that would otherwise leak into small color buckets and spurious
//! contours. [`preprocess`] smooths every channel with a Gaussian blur
//! and then applies a linear contrast gain.

use image::GrayImage;

use crate::types::{AnalysisConfig, RgbImage};

/// Run the full preprocessing step with the configured parameters.
#[must_use = "returns the preprocessed image"]
pub fn preprocess(image: &RgbImage, config: &AnalysisConfig) -> RgbImage {
    let blurred = gaussian_blur_rgb(image, config.preprocess_blur_sigma);
    scale_contrast(&blurred, config.contrast_gain)
}

/// Apply Gaussian blur to an RGB image by blurring each channel
/// independently.
///
/// `imageproc::filter::gaussian_blur_f32` only accepts `GrayImage`, so the
/// image is split into three single-channel images, each is blurred, and
/// the result is reassembled.
///
/// Non-positive sigma values return the image unchanged, since
/// `imageproc`'s underlying function panics on `sigma <= 0.0`.
#[must_use = "returns the blurred image"]
pub fn gaussian_blur_rgb(image: &RgbImage, sigma: f32) -> RgbImage {
    if sigma <= 0.0 || sigma.is_nan() {
        return image.clone();
    }

    let (w, h) = (image.width(), image.height());

    let channels: [GrayImage; 3] = std::array::from_fn(|c| {
        GrayImage::from_fn(w, h, |x, y| image::Luma([image.get_pixel(x, y).0[c]]))
    });

    let blurred: [GrayImage; 3] =
        std::array::from_fn(|c| imageproc::filter::gaussian_blur_f32(&channels[c], sigma));

    RgbImage::from_fn(w, h, |x, y| {
        image::Rgb([
            blurred[0].get_pixel(x, y).0[0],
            blurred[1].get_pixel(x, y).0[0],
            blurred[2].get_pixel(x, y).0[0],
        ])
    })
}

/// Multiply every channel value by `gain`, rounding and saturating to
/// the `u8` range.
#[must_use = "returns the contrast-scaled image"]
pub fn scale_contrast(image: &RgbImage, gain: f32) -> RgbImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        for channel in &mut pixel.0 {
            *channel = saturate(f32::from(*channel) * gain);
        }
    }
    out
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn saturate(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sigma_returns_identical_image() {
        let img = RgbImage::from_fn(4, 4, |_, _| image::Rgb([100, 150, 200]));
        assert_eq!(gaussian_blur_rgb(&img, 0.0), img);
    }

    #[test]
    fn output_dimensions_preserved() {
        let img = RgbImage::new(17, 31);
        let out = preprocess(&img, &AnalysisConfig::default());
        assert_eq!(out.width(), 17);
        assert_eq!(out.height(), 31);
    }

    #[test]
    fn blur_smooths_sharp_color_edge() {
        let img = RgbImage::from_fn(10, 10, |x, _y| {
            if x < 5 {
                image::Rgb([255, 0, 0])
            } else {
                image::Rgb([0, 0, 255])
            }
        });
        let blurred = gaussian_blur_rgb(&img, 2.0);
        let left = blurred.get_pixel(4, 5).0[0];
        let right = blurred.get_pixel(5, 5).0[0];
        assert!(left < 255, "expected red to decrease near boundary, got {left}");
        assert!(right > 0, "expected red to increase near boundary, got {right}");
    }

    #[test]
    fn contrast_gain_saturates() {
        let img = RgbImage::from_fn(1, 1, |_, _| image::Rgb([0, 100, 250]));
        let out = scale_contrast(&img, 1.2);
        assert_eq!(out.get_pixel(0, 0).0, [0, 120, 255]);
    }

    #[test]
    fn black_stays_black() {
        let img = RgbImage::new(12, 12);
        let out = preprocess(&img, &AnalysisConfig::default());
        assert!(out.pixels().all(|p| p.0 == [0, 0, 0]));
    }
}

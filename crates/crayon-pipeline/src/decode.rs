//! Image decoding.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP) and produces the
//! three-channel raster every analysis stage reads.
//!
//! This is the only fatal step of the pipeline: raw bytes in, `RgbImage`
//! out, or an [`ImageLoadError`].

use crate::types::{ImageLoadError, RgbImage};

/// Decode raw image bytes into an RGB raster.
///
/// Supports whatever the `image` crate can decode with the enabled
/// features. Alpha is discarded.
///
/// # Errors
///
/// Returns [`ImageLoadError::EmptyInput`] if `bytes` is empty.
/// Returns [`ImageLoadError::Decode`] if the image format is
/// unrecognized or the data is corrupt.
/// Returns [`ImageLoadError::ZeroSized`] if the image has no pixels.
pub fn decode(bytes: &[u8]) -> Result<RgbImage, ImageLoadError> {
    if bytes.is_empty() {
        return Err(ImageLoadError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?.to_rgb8();
    ensure_not_empty(&img)?;
    Ok(img)
}

/// Reject rasters with zero width or height.
///
/// # Errors
///
/// Returns [`ImageLoadError::ZeroSized`] when either dimension is zero.
pub fn ensure_not_empty(image: &RgbImage) -> Result<(), ImageLoadError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ImageLoadError::ZeroSized {
            width: image.width(),
            height: image.height(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Encode an RGB image as PNG bytes.
    fn encode_png(img: &RgbImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn empty_input_returns_error() {
        let result = decode(&[]);
        assert!(matches!(result, Err(ImageLoadError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_returns_decode_error() {
        let result = decode(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(ImageLoadError::Decode(_))));
    }

    #[test]
    fn valid_png_round_trips_pixels() {
        let img = RgbImage::from_fn(3, 2, |x, y| {
            image::Rgb([u8::try_from(x * 40).unwrap(), u8::try_from(y * 90).unwrap(), 7])
        });
        let decoded = decode(&encode_png(&img)).unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn rgba_input_drops_alpha() {
        let img = image::RgbaImage::from_fn(2, 2, |_, _| image::Rgba([10, 20, 30, 0]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();

        let decoded = decode(&buf).unwrap();
        assert_eq!(decoded.get_pixel(1, 1).0, [10, 20, 30]);
    }

    #[test]
    fn zero_sized_raster_rejected() {
        let img = RgbImage::new(0, 5);
        assert!(matches!(
            ensure_not_empty(&img),
            Err(ImageLoadError::ZeroSized {
                width: 0,
                height: 5
            })
        ));
    }
}

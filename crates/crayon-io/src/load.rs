//! Loading drawings from the filesystem.

use std::path::Path;

use crayon_pipeline::{ImageLoadError, RgbImage};

/// Largest source file accepted for analysis (10 MiB).
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Read a drawing's raw bytes, refusing files over [`MAX_IMAGE_BYTES`].
///
/// The size is checked from metadata before anything is read.
///
/// # Errors
///
/// Returns [`ImageLoadError::Read`] if the file cannot be inspected or
/// read, [`ImageLoadError::TooLarge`] if it exceeds the limit, and
/// [`ImageLoadError::EmptyInput`] if it is empty.
pub fn read_image_bytes(path: &Path) -> Result<Vec<u8>, ImageLoadError> {
    let read_error = |source| ImageLoadError::Read {
        path: path.display().to_string(),
        source,
    };

    let size = std::fs::metadata(path).map_err(read_error)?.len();
    check_size(size)?;
    let bytes = std::fs::read(path).map_err(read_error)?;
    if bytes.is_empty() {
        return Err(ImageLoadError::EmptyInput);
    }
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "image read");
    Ok(bytes)
}

/// Read and decode a drawing.
///
/// # Errors
///
/// Everything [`read_image_bytes`] returns, plus
/// [`ImageLoadError::Decode`] and [`ImageLoadError::ZeroSized`].
pub fn load_image(path: &Path) -> Result<RgbImage, ImageLoadError> {
    let bytes = read_image_bytes(path)?;
    crayon_pipeline::decode::decode(&bytes)
}

/// Reject payloads over [`MAX_IMAGE_BYTES`].
///
/// # Errors
///
/// Returns [`ImageLoadError::TooLarge`].
pub fn check_size(size: u64) -> Result<(), ImageLoadError> {
    if size > MAX_IMAGE_BYTES {
        return Err(ImageLoadError::TooLarge {
            size,
            limit: MAX_IMAGE_BYTES,
        });
    }
    Ok(())
}

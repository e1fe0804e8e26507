//! Still images handed to ingredient identification.
//!
//! Both acquisition paths (file selection and camera capture) converge on
//! [`ImageData`]: the raw bytes plus their MIME type.

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, ImageReader};
use thiserror::Error;

/// Allowed image formats for ingredient photos.
pub const ALLOWED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// Maximum file size for images (10MB).
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Failed to read image file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("Could not detect image format")]
    UnknownFormat,

    #[error("Unsupported image format: {0:?}. Allowed: JPEG, PNG, GIF, WebP")]
    Unsupported(ImageFormat),

    #[error("Failed to encode image: {0}")]
    Encode(String),
}

/// An encoded still image with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImageData {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }
}

/// Validate image data: check size and format, and detect the content type.
///
/// Returns the content type on success (e.g., "image/jpeg").
pub fn validate_image(data: &[u8]) -> Result<String, ImageError> {
    if data.len() > MAX_FILE_SIZE {
        return Err(ImageError::TooLarge {
            size: data.len(),
            max: MAX_FILE_SIZE,
        });
    }

    let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
    let format = reader.format().ok_or(ImageError::UnknownFormat)?;

    if !ALLOWED_FORMATS.contains(&format) {
        return Err(ImageError::Unsupported(format));
    }

    Ok(format.to_mime_type().to_string())
}

/// Load a user-selected image file.
pub fn load_image_file(path: &Path) -> Result<ImageData, ImageError> {
    let bytes = std::fs::read(path)?;
    let mime_type = validate_image(&bytes)?;

    tracing::debug!(
        path = %path.display(),
        size = bytes.len(),
        mime_type = %mime_type,
        "Loaded image file"
    );

    Ok(ImageData { bytes, mime_type })
}

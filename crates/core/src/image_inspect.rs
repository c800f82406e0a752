//! Header-only image probing for uploaded product photos.

use std::io::Cursor;

use image::{ImageFormat, ImageReader};

use crate::error::CoreError;

/// Formats accepted for product photos.
const ACCEPTED_FORMATS: &[ImageFormat] = &[ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::WebP];

/// What inspection learned about an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    /// MIME type to declare when forwarding the bytes.
    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}

/// Detect the format and dimensions of `bytes` without decoding pixels.
///
/// Rejects empty input, unrecognized or unsupported formats, and headers
/// that cannot be read.
pub fn inspect_image(bytes: &[u8]) -> Result<ImageInfo, CoreError> {
    if bytes.is_empty() {
        return Err(CoreError::Validation("Uploaded file is empty".into()));
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CoreError::Validation(format!("Unreadable image: {e}")))?;

    let format = reader
        .format()
        .ok_or_else(|| CoreError::Validation("Uploaded file is not a recognized image".into()))?;

    if !ACCEPTED_FORMATS.contains(&format) {
        return Err(CoreError::Validation(format!(
            "Unsupported image format {format:?}. Supported: PNG, JPEG, WebP"
        )));
    }

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| CoreError::Validation(format!("Corrupt image header: {e}")))?;

    Ok(ImageInfo {
        format,
        width,
        height,
    })
}

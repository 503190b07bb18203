//! Image encoding for the OCR engines.
//!
//! Both engines take PNG: tesseract reads it from stdin, the vision backend
//! receives it base64-encoded. PNG is lossless, which matters more for
//! glyph edges than file size does.

use crate::error::OcrError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode an image as PNG bytes.
pub fn png_bytes(img: &DynamicImage) -> Result<Vec<u8>, OcrError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| OcrError::ImageEncodeFailed(e.to_string()))?;
    Ok(buf)
}

/// Encode an image as a base64 PNG attachment for a vision model.
///
/// `detail: "high"` keeps small glyphs and diacritics legible to
/// GPT-4-class models.
pub fn encode_image_data(img: &DynamicImage) -> Result<ImageData, OcrError> {
    let png = png_bytes(img)?;
    let b64 = STANDARD.encode(&png);
    debug!("Encoded image → {} bytes base64", b64.len());
    Ok(ImageData::new(b64, "image/png").with_detail("high"))
}

//! Icon image normalization
//!
//! Oversized PNG and JPEG icons are downscaled to the canonical icon size
//! before caching. Everything about this is best-effort: formats we don't
//! decode pass through untouched, and any decode or encode failure degrades
//! to the original bytes. A favicon request should never fail because an
//! origin served a slightly broken image.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::ImageFormat;
use tracing::debug;

const JPEG_QUALITY: u8 = 90;

/// Normalize icon bytes to at most `target_size` on each edge.
///
/// Returns the input unchanged when the format is not PNG/JPEG, when the
/// image already fits, when re-encoding does not actually shrink it, or
/// when anything about decoding fails.
pub fn normalize_icon(data: &[u8], content_type: &str, target_size: u32) -> Vec<u8> {
    let format = match detect_format(content_type) {
        Some(format) => format,
        None => return data.to_vec(),
    };

    let img = match image::load_from_memory_with_format(data, format) {
        Ok(img) => img,
        Err(e) => {
            debug!("Icon decode failed, keeping original bytes: {e}");
            return data.to_vec();
        }
    };

    if img.width() <= target_size && img.height() <= target_size {
        return data.to_vec();
    }

    let resized = img.resize_exact(target_size, target_size, FilterType::Nearest);

    let mut encoded = Vec::new();
    let result = match format {
        ImageFormat::Jpeg => {
            let mut encoder = JpegEncoder::new_with_quality(&mut encoded, JPEG_QUALITY);
            encoder.encode_image(&resized.to_rgb8())
        }
        _ => resized.write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png),
    };

    if result.is_err() || encoded.len() >= data.len() {
        return data.to_vec();
    }

    encoded
}

/// Map a content type onto the formats we are willing to re-encode.
fn detect_format(content_type: &str) -> Option<ImageFormat> {
    let content_type = content_type.to_ascii_lowercase();
    if content_type.contains("png") {
        Some(ImageFormat::Png)
    } else if content_type.contains("jpeg") || content_type.contains("jpg") {
        Some(ImageFormat::Jpeg)
    } else {
        None
    }
}

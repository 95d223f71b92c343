use std::io::Cursor;

use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage, GenericImageView};

/// Telegram rejects photos whose dimensions exceed these bounds.
const MAX_DIMENSION: u32 = 10_000;
const MAX_DIMENSION_SUM: u32 = 10_000;
/// Resize target leaves margin below the hard limit.
const TARGET_SUM: u32 = 9_500;
const JPEG_QUALITY: u8 = 85;

/// Shrinks an image to fit Telegram's geometry limits.
///
/// Images already within the limits are returned byte-for-byte unchanged, so
/// no quality is lost on the common path. Oversized images are scaled down
/// preserving aspect ratio so that width + height lands near `TARGET_SUM`,
/// converted to RGB and re-encoded as quality-85 JPEG. Returns `None` when
/// the bytes do not decode as an image; callers treat that as "no image".
pub fn resize_if_needed(data: &[u8]) -> Option<Vec<u8>> {
    let img = match image::load_from_memory(data) {
        Ok(img) => img,
        Err(err) => {
            tracing::warn!(target: "notifier", error = %err, "failed to decode image");
            return None;
        }
    };

    let (width, height) = img.dimensions();
    if width + height <= MAX_DIMENSION_SUM && width <= MAX_DIMENSION && height <= MAX_DIMENSION {
        return Some(data.to_vec());
    }

    let (new_width, new_height) = target_dimensions(width, height);
    tracing::info!(
        target: "notifier",
        from = %format!("{width}x{height}"),
        to = %format!("{new_width}x{new_height}"),
        "resizing image to meet Telegram limits"
    );

    let resized = img.resize_exact(new_width, new_height, FilterType::Lanczos3);
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

    let mut out = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    match rgb.write_with_encoder(encoder) {
        Ok(()) => Some(out.into_inner()),
        Err(err) => {
            tracing::warn!(target: "notifier", error = %err, "failed to re-encode image");
            None
        }
    }
}

/// Solves new_height = floor(target / (ratio + 1)), new_width rounded from
/// the ratio. Extreme aspect ratios can round a dimension to zero or past
/// the hard limit, so both are clamped afterwards.
fn target_dimensions(width: u32, height: u32) -> (u32, u32) {
    let ratio = width as f64 / height as f64;
    let new_height = (TARGET_SUM as f64 / (ratio + 1.0)).floor().max(1.0) as u32;
    let new_width = ((new_height as f64 * ratio).round().max(1.0) as u32).min(MAX_DIMENSION - 1);
    (new_width, new_height.min(MAX_DIMENSION - 1))
}

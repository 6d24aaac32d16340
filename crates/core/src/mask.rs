//! Mask payload handling.
//!
//! Browser clients submit masks as base64 PNG data URLs drawn on a
//! transparent canvas. Locally the raw PNG is kept on disk and the record
//! carries a file reference. Remote tiers with a payload ceiling store a
//! down-sampled [`MaskStats`] summary instead — that conversion is lossy and
//! the raw pixels are NOT recoverable from such a tier.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::ImageFormat;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Data URL prefix sent by canvas `toDataURL("image/png")`.
const DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Reference to an annotation's mask payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MaskReference {
    /// Raw mask PNG stored as a file; `filename` is relative to the
    /// uploads directory.
    File { filename: String },
    /// Lossy pixel-count summary, used where raw pixels exceed a payload
    /// ceiling.
    Stats(MaskStats),
}

impl MaskReference {
    /// The stored filename, if this reference still points at raw pixels.
    pub fn filename(&self) -> Option<&str> {
        match self {
            MaskReference::File { filename } => Some(filename),
            MaskReference::Stats(_) => None,
        }
    }
}

/// Summary statistics for a decoded mask bitmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskStats {
    pub width: u32,
    pub height: u32,
    pub total_pixels: u64,
    pub annotated_pixels: u64,
    /// Percentage of pixels annotated, rounded to two decimals.
    pub coverage_percent: f64,
}

/// Strip the data URL prefix (if present) and decode the base64 payload.
pub fn decode_mask_data_url(mask_data: &str) -> Result<Vec<u8>, CoreError> {
    let encoded = mask_data
        .strip_prefix(DATA_URL_PREFIX)
        .unwrap_or(mask_data)
        .trim();
    BASE64
        .decode(encoded)
        .map_err(|e| CoreError::Mask(format!("Invalid base64 mask payload: {e}")))
}

/// Decode a PNG mask and count annotated pixels.
///
/// A pixel counts as annotated when it is not fully transparent, which
/// matches brush strokes drawn on a transparent canvas overlay.
pub fn mask_stats_from_png(png_bytes: &[u8]) -> Result<MaskStats, CoreError> {
    let decoded = image::load_from_memory_with_format(png_bytes, ImageFormat::Png)
        .map_err(|e| CoreError::Mask(format!("Invalid PNG mask: {e}")))?;

    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    let total_pixels = u64::from(width) * u64::from(height);
    let annotated_pixels = rgba.pixels().filter(|p| p.0[3] != 0).count() as u64;

    let coverage_percent = if total_pixels == 0 {
        0.0
    } else {
        let raw = annotated_pixels as f64 / total_pixels as f64 * 100.0;
        (raw * 100.0).round() / 100.0
    };

    Ok(MaskStats {
        width,
        height,
        total_pixels,
        annotated_pixels,
        coverage_percent,
    })
}

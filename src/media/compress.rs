use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, RgbImage};
use std::path::PathBuf;
use tokio::task;
use tracing::{debug, info};

use super::payload::{to_data_url, JPEG_MIME};
use crate::config::QUALITY_LADDER;
use crate::error::{CatalogError, Result};
use crate::state::ImageRef;

/// A size-bounded JPEG ready to store in a slot or upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    /// Encoded JPEG bytes
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// JPEG quality (1-100) of the accepted encoding
    pub quality: u8,
    /// Number of encodings tried
    pub attempts: usize,
    /// Size of the input file, for diagnostics
    pub original_len: usize,
}

impl CompressedImage {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Inline form stored in catalog records
    pub fn to_data_url(&self) -> String {
        to_data_url(JPEG_MIME, &self.bytes)
    }

    pub fn to_image_ref(&self) -> ImageRef {
        ImageRef::new(self.to_data_url())
    }
}

/// Result of walking the quality ladder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityPick {
    pub bytes: Vec<u8>,
    pub quality: u8,
    pub attempts: usize,
}

/// Dimensions after fitting the longer side into `max_dimension`
///
/// Images already within bounds keep their size.
pub fn target_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    if width <= max_dimension && height <= max_dimension {
        return (width, height);
    }

    let scale = |short: u32, long: u32| -> u32 {
        let scaled = (short as f64 * max_dimension as f64 / long as f64).round() as u32;
        scaled.max(1)
    };

    if width > height {
        (max_dimension, scale(height, width))
    } else {
        (scale(width, height), max_dimension)
    }
}

/// Encode at decreasing qualities until the output fits in `max_bytes`
///
/// Walks `QUALITY_LADDER` (90 down to 10). The encoding at the last rung
/// is accepted whatever its size.
pub fn search_quality<F>(max_bytes: usize, mut encode: F) -> Result<QualityPick>
where
    F: FnMut(u8) -> Result<Vec<u8>>,
{
    let mut step = 0;
    loop {
        let quality = QUALITY_LADDER[step];
        let bytes = encode(quality)?;
        step += 1;

        let fits = bytes.len() <= max_bytes;
        if fits || step == QUALITY_LADDER.len() {
            debug!(
                "Accepted quality {} after {} attempt(s): {} bytes (target {}, fits: {})",
                quality,
                step,
                bytes.len(),
                max_bytes,
                fits
            );
            return Ok(QualityPick {
                bytes,
                quality,
                attempts: step,
            });
        }
    }
}

/// Encode an RGB buffer as JPEG at `quality`
fn encode_jpeg(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
        encoder.encode_image(rgb)?;
    }
    Ok(buffer)
}

/// Compress an image file's bytes to at most `max_kb` kilobytes
///
/// The image is downscaled so neither side exceeds `max_dimension`, then
/// re-encoded as JPEG with decreasing quality until it fits or the quality
/// floor is reached. Alpha is dropped.
pub fn compress_bytes(data: &[u8], max_kb: u32, max_dimension: u32) -> Result<CompressedImage> {
    let img = image::load_from_memory(data)?;
    let (width, height) = target_dimensions(img.width(), img.height(), max_dimension);

    let img = if (width, height) != (img.width(), img.height()) {
        debug!("Downscaling {}x{} to {}x{}", img.width(), img.height(), width, height);
        img.resize_exact(width, height, FilterType::Lanczos3)
    } else {
        img
    };

    let rgb = img.to_rgb8();
    let max_bytes = max_kb as usize * 1024;
    let pick = search_quality(max_bytes, |quality| encode_jpeg(&rgb, quality))?;

    Ok(CompressedImage {
        bytes: pick.bytes,
        width,
        height,
        quality: pick.quality,
        attempts: pick.attempts,
        original_len: data.len(),
    })
}

/// Read and compress an image file on a blocking worker
pub async fn compress_file(path: PathBuf, max_kb: u32, max_dimension: u32) -> Result<CompressedImage> {
    let data = tokio::fs::read(&path).await?;

    let compressed = task::spawn_blocking(move || compress_bytes(&data, max_kb, max_dimension))
        .await
        .map_err(|e| CatalogError::Decode(format!("Task join error: {}", e)))??;

    info!(
        "Compressed {}: {}KB -> {}KB (quality {})",
        path.file_name().unwrap_or_default().to_string_lossy(),
        compressed.original_len / 1024,
        compressed.len() / 1024,
        compressed.quality
    );

    Ok(compressed)
}

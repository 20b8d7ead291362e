// SPDX-License-Identifier: GPL-3.0-only

//! QR code detection task
//!
//! Uses the rqrr crate. Frames are converted to luma on the fly and, when
//! larger than the configured maximum dimension, downscaled with nearest
//! neighbour sampling before grid detection.

use super::Detector;
use crate::backends::camera::types::CameraFrame;
use crate::constants::detector::MAX_DIMENSION;
use crate::errors::{CameraError, CameraResult};
use async_trait::async_trait;
use tracing::{debug, trace};

/// QR code detector
pub struct QrDetector {
    /// Maximum dimension for processing (frames are downscaled to this)
    max_dimension: u32,
}

impl Default for QrDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl QrDetector {
    pub fn new() -> Self {
        Self {
            max_dimension: MAX_DIMENSION,
        }
    }

    /// Create a QR detector with custom max dimension
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
        }
    }
}

#[async_trait]
impl Detector for QrDetector {
    async fn detect(&self, frame: &CameraFrame) -> CameraResult<Option<String>> {
        let frame = frame.clone();
        let max_dim = self.max_dimension;

        // CPU bound; keep it off the controller task
        tokio::task::spawn_blocking(move || detect_sync(&frame, max_dim))
            .await
            .map_err(|e| CameraError::DecodeTransientFailure(format!("detector task failed: {e}")))?
    }
}

/// Synchronous detection (runs in blocking task)
fn detect_sync(frame: &CameraFrame, max_dimension: u32) -> CameraResult<Option<String>> {
    let start = std::time::Instant::now();

    let expected = frame.stride as usize * frame.height.saturating_sub(1) as usize
        + frame.width as usize * frame.format.bytes_per_pixel() as usize;
    if frame.width == 0 || frame.height == 0 || frame.data.len() < expected {
        return Err(CameraError::DecodeTransientFailure(format!(
            "incomplete frame: {}x{} with {} bytes",
            frame.width,
            frame.height,
            frame.data.len()
        )));
    }

    let scale = (frame.width as f32 / max_dimension as f32)
        .max(frame.height as f32 / max_dimension as f32)
        .max(1.0);
    let proc_width = ((frame.width as f32 / scale) as usize).max(1);
    let proc_height = ((frame.height as f32 / scale) as usize).max(1);

    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(proc_width, proc_height, |x, y| {
        let sx = ((x as f32 * scale) as u32).min(frame.width - 1);
        let sy = ((y as f32 * scale) as u32).min(frame.height - 1);
        frame.luma(sx, sy)
    });

    let grids = prepared.detect_grids();
    trace!(
        proc_width,
        proc_height,
        scale,
        grids = grids.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "QR grid detection complete"
    );

    for grid in grids {
        match grid.decode() {
            Ok((_meta, content)) => {
                debug!(content = %content, "Detected QR code");
                return Ok(Some(content));
            }
            // Partial or blurred codes are common while the user aims
            Err(e) => trace!(error = %e, "Failed to decode QR grid"),
        }
    }
    Ok(None)
}

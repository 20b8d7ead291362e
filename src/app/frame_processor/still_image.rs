// SPDX-License-Identifier: GPL-3.0-only

//! One-shot decoding of a dropped or picked image file

use super::tasks::Detector;
use crate::backends::virtual_camera::load_image_as_frame;
use crate::constants::file_formats;
use crate::errors::{CameraError, CameraResult};
use std::path::Path;
use tracing::info;

/// Decode the first code found in the image at `path`
///
/// Only raster still images are accepted; video and vector files are
/// rejected up front.
pub async fn scan_image_file(path: &Path, detector: &dyn Detector) -> CameraResult<Option<String>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if extension == "svg" {
        return Err(CameraError::Image(format!(
            "Vector images are not supported, export {} as PNG",
            path.display()
        )));
    }
    if !file_formats::is_image_extension(&extension) {
        return Err(CameraError::Image(format!(
            "Unsupported file format: {}",
            path.display()
        )));
    }

    let owned = path.to_path_buf();
    let frame = tokio::task::spawn_blocking(move || load_image_as_frame(&owned))
        .await
        .map_err(|e| CameraError::Image(e.to_string()))?
        .map_err(|e| CameraError::Image(e.to_string()))?;

    let code = detector.detect(&frame).await?;
    info!(path = %path.display(), found = code.is_some(), "Image scanned");
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::frame_processor::QrDetector;

    #[tokio::test]
    async fn test_rejects_video_files() {
        let result = scan_image_file(Path::new("clip.mp4"), &QrDetector::new()).await;
        assert!(matches!(result, Err(CameraError::Image(_))));
    }

    #[tokio::test]
    async fn test_rejects_svg() {
        let result = scan_image_file(Path::new("code.SVG"), &QrDetector::new()).await;
        match result {
            Err(CameraError::Image(msg)) => assert!(msg.contains("Vector images")),
            other => panic!("expected an image error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = scan_image_file(Path::new("/nonexistent/code.png"), &QrDetector::new()).await;
        assert!(matches!(result, Err(CameraError::Image(_))));
    }

    #[tokio::test]
    async fn test_plain_image_has_no_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.png");
        image::RgbaImage::from_pixel(40, 40, image::Rgba([255, 255, 255, 255]))
            .save(&path)
            .unwrap();
        assert_eq!(scan_image_file(&path, &QrDetector::new()).await, Ok(None));
    }
}

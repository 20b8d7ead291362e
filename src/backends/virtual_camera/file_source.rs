// SPDX-License-Identifier: GPL-3.0-only

//! Still image sources for the virtual camera
//!
//! Each image in a directory becomes one virtual device serving that image as
//! its only frame. Handy for exercising the scanner without hardware.

use super::VirtualDevice;
use crate::backends::camera::types::{BackendError, BackendResult, CameraFrame, FacingMode};
use crate::backends::camera::FacingKeywords;
use crate::constants::file_formats;
use std::path::Path;
use tracing::{debug, info, warn};

/// Load an image file as an RGBA frame
pub fn load_image_as_frame(path: &Path) -> BackendResult<CameraFrame> {
    debug!(path = %path.display(), "Loading image file");

    let img = image::open(path).map_err(|e| {
        BackendError::Other(format!("Failed to load image '{}': {}", path.display(), e))
    })?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    debug!(width, height, "Image loaded");
    Ok(CameraFrame::from_rgba(width, height, rgba.into_raw()))
}

/// Build one virtual device per image in `dir`, sorted by file name
///
/// The device id is the file name and the label its stem, so the label
/// heuristic applies ("rear-qr.png" is classified as back-facing). Files that
/// fail to decode are skipped with a warning.
pub fn load_image_dir(dir: &Path) -> BackendResult<Vec<VirtualDevice>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        BackendError::Other(format!("Failed to read directory '{}': {}", dir.display(), e))
    })?;

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(file_formats::is_image_extension)
        })
        .collect();
    paths.sort();

    let keywords = FacingKeywords::default();
    let mut devices = Vec::with_capacity(paths.len());
    for path in paths {
        let (Some(name), Some(stem)) = (
            path.file_name().and_then(|n| n.to_str()),
            path.file_stem().and_then(|s| s.to_str()),
        ) else {
            continue;
        };
        match load_image_as_frame(&path) {
            Ok(frame) => {
                let mut device = VirtualDevice::new(name, stem).with_frame(frame);
                // Front cameras rarely carry a torch
                device.torch = keywords.classify(stem) != Some(FacingMode::Front);
                devices.push(device);
            }
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable image"),
        }
    }

    info!(dir = %dir.display(), count = devices.len(), "Image devices loaded");
    Ok(devices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &Path, name: &str) {
        let img = image::RgbaImage::from_pixel(8, 6, image::Rgba([10, 20, 30, 255]));
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_load_image_as_frame() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "a.png");
        let frame = load_image_as_frame(&dir.path().join("a.png")).unwrap();
        assert_eq!((frame.width, frame.height, frame.stride), (8, 6, 32));
    }

    #[test]
    fn test_load_image_dir_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "b-rear.png");
        write_png(dir.path(), "a-front.png");
        std::fs::write(dir.path().join("notes.txt"), "skip me").unwrap();
        std::fs::write(dir.path().join("broken.png"), "not a png").unwrap();

        let devices = load_image_dir(dir.path()).unwrap();
        let ids: Vec<_> = devices.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a-front.png", "b-rear.png"]);
        assert_eq!(devices[1].label, "b-rear");
        assert!(!devices[0].torch);
        assert!(devices[1].torch);
    }
}

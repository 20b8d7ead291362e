// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Which way a camera points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Towards the user ("user" in media APIs)
    Front,
    /// Away from the user ("environment" in media APIs)
    Back,
}

impl std::fmt::Display for FacingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacingMode::Front => write!(f, "front"),
            FacingMode::Back => write!(f, "back"),
        }
    }
}

/// Kind of media input reported by enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    VideoInput,
    AudioInput,
    AudioOutput,
}

/// Raw device entry as reported by the platform
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub device_id: String,
    pub kind: DeviceKind,
    pub label: String,
    /// Facing mode if the platform reports one
    pub facing_mode: Option<FacingMode>,
}

/// A video input the controller can target
///
/// Immutable once enumerated; the whole list is replaced on re-enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CameraDevice {
    pub id: String,
    pub label: String,
    /// Facing hint: reported facing mode, or the label heuristic's guess
    pub facing: Option<FacingMode>,
    /// True when `facing` came from the platform rather than the label
    pub facing_reported: bool,
}

/// Platform permission state for camera capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
    Prompt,
}

/// Constraints passed when opening a stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamConstraints {
    /// Exact device to open; `None` lets the platform pick any camera
    pub device_id: Option<String>,
}

impl StreamConstraints {
    /// Any video input (used by the permission probe)
    pub fn any_video() -> Self {
        Self::default()
    }

    /// A specific device
    pub fn for_device(device_id: impl Into<String>) -> Self {
        Self {
            device_id: Some(device_id.into()),
        }
    }
}

/// Readiness state of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Live,
    Ended,
}

/// Hardware features reported by a track
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackCapabilities {
    /// `None` when the platform does not report torch at all
    pub torch: Option<bool>,
}

/// Settings currently in effect on a track
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackSettings {
    pub facing_mode: Option<FacingMode>,
}

/// Capability snapshot taken right after binding
///
/// Only meaningful while the stream it was read from is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub torch: bool,
}

impl From<&TrackCapabilities> for Capabilities {
    fn from(caps: &TrackCapabilities) -> Self {
        Self {
            torch: caps.torch.unwrap_or(false),
        }
    }
}

/// Pixel layout of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// RGBA - 32-bit with alpha (4 bytes per pixel)
    RGBA,
    /// Gray8 - 8-bit grayscale (single channel)
    Gray8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            PixelFormat::RGBA => 4,
            PixelFormat::Gray8 => 1,
        }
    }
}

/// A single frame grabbed from the sink
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    pub data: Arc<[u8]>,
    pub format: PixelFormat,
    /// Row stride in bytes (may include padding)
    pub stride: u32,
}

impl CameraFrame {
    /// Build a tightly packed RGBA frame
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: Arc::from(data.into_boxed_slice()),
            format: PixelFormat::RGBA,
            stride: width * 4,
        }
    }

    /// Luma value at (x, y)
    pub fn luma(&self, x: u32, y: u32) -> u8 {
        let bpp = self.format.bytes_per_pixel() as usize;
        let offset = y as usize * self.stride as usize + x as usize * bpp;
        match self.format {
            PixelFormat::Gray8 => self.data.get(offset).copied().unwrap_or(0),
            PixelFormat::RGBA => {
                let Some(px) = self.data.get(offset..offset + 3) else {
                    return 0;
                };
                // ITU-R BT.601 integer approximation
                ((px[0] as u32 * 299 + px[1] as u32 * 587 + px[2] as u32 * 114) / 1000) as u8
            }
        }
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types reported by platform collaborators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Device not found: {0}")]
    DeviceNotFound(String),
    #[error("Constraints cannot be satisfied: {0}")]
    Overconstrained(String),
    #[error("Not supported: {0}")]
    NotSupported(String),
    /// Sink was torn down underneath the caller
    #[error("Sink detached")]
    SinkDetached,
    #[error("Playback error: {0}")]
    Playback(String),
    #[error("Error: {0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_default_torch_absent() {
        let caps = Capabilities::from(&TrackCapabilities { torch: None });
        assert!(!caps.torch);
        let caps = Capabilities::from(&TrackCapabilities { torch: Some(true) });
        assert!(caps.torch);
    }

    #[test]
    fn test_luma_rgba_and_gray() {
        let frame = CameraFrame::from_rgba(2, 1, vec![255, 255, 255, 255, 0, 0, 0, 255]);
        assert_eq!(frame.luma(0, 0), 255);
        assert_eq!(frame.luma(1, 0), 0);
        // Out of bounds reads as black
        assert_eq!(frame.luma(5, 5), 0);

        let gray = CameraFrame {
            format: PixelFormat::Gray8,
            stride: 2,
            data: Arc::from(vec![10u8, 20].into_boxed_slice()),
            ..frame
        };
        assert_eq!(gray.luma(1, 0), 20);
    }
}

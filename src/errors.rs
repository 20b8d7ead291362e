// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the camera controller
//!
//! Platform collaborators report [`BackendError`](crate::backends::camera::BackendError);
//! the leaf components translate those into [`CameraError`], which is what the
//! owner sees on the event stream or from an awaited command.

use std::time::Duration;
use thiserror::Error;

/// Result type alias using CameraError
pub type CameraResult<T> = Result<T, CameraError>;

/// Why the platform refused to open a stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireFailure {
    /// Requested device is not present
    NotFound,
    /// Constraints cannot be satisfied by the device
    Overconstrained,
    /// Anything else the platform reported
    Unknown(String),
}

impl std::fmt::Display for AcquireFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AcquireFailure::NotFound => write!(f, "device not found"),
            AcquireFailure::Overconstrained => write!(f, "constraints cannot be satisfied"),
            AcquireFailure::Unknown(msg) => write!(f, "{}", msg),
        }
    }
}

/// Camera controller errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// Capture permission was refused by the user or the platform
    #[error("Camera permission denied")]
    PermissionDenied,

    /// Enumeration returned no usable video input
    #[error("No camera devices found")]
    NoDeviceFound,

    /// Selected device is no longer part of the latest enumeration
    #[error("Camera device vanished: {device_id}")]
    DeviceVanished { device_id: String },

    /// Opening the stream failed
    #[error("Failed to acquire camera {device_id}: {reason}")]
    AcquisitionFailed {
        device_id: String,
        reason: AcquireFailure,
    },

    /// Listing devices failed for a reason other than permission
    #[error("Device enumeration failed: {0}")]
    Enumeration(String),

    /// Sink did not become ready within the configured bind timeout
    #[error("Stream did not become ready within {0:?}")]
    BindTimeout(Duration),

    /// Sink refused to play the stream
    #[error("Playback failed: {0}")]
    Playback(String),

    /// Sink went away while a stream was being bound to it
    #[error("Video sink is no longer available")]
    SinkUnavailable,

    /// Active track does not support the torch constraint
    #[error("Torch is not supported by this camera")]
    TorchUnsupported,

    /// Applying the torch constraint failed
    #[error("Failed to apply torch: {0}")]
    TorchApplyFailed(String),

    /// Decoder failed on a single frame; polling continues
    #[error("Decode failed: {0}")]
    DecodeTransientFailure(String),

    /// Still image could not be loaded
    #[error("Image error: {0}")]
    Image(String),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Controller has been unmounted
    #[error("Camera controller is closed")]
    Closed,
}

impl CameraError {
    /// Errors that end a start attempt, as opposed to per-frame or per-command failures
    pub fn is_start_failure(&self) -> bool {
        matches!(
            self,
            CameraError::PermissionDenied
                | CameraError::NoDeviceFound
                | CameraError::DeviceVanished { .. }
                | CameraError::AcquisitionFailed { .. }
                | CameraError::Enumeration(_)
                | CameraError::BindTimeout(_)
                | CameraError::Playback(_)
                | CameraError::SinkUnavailable
        )
    }
}

impl From<std::io::Error> for CameraError {
    fn from(err: std::io::Error) -> Self {
        CameraError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for CameraError {
    fn from(err: serde_json::Error) -> Self {
        CameraError::Config(err.to_string())
    }
}

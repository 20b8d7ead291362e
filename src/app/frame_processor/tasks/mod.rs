// SPDX-License-Identifier: GPL-3.0-only

//! Frame processing tasks
//!
//! The decode capability is opaque to the controller: anything that can turn
//! a frame into an optional code implements [`Detector`].

pub mod qr_detector;

pub use qr_detector::QrDetector;

use crate::backends::camera::types::CameraFrame;
use crate::errors::CameraResult;
use async_trait::async_trait;

/// Decode capability
#[async_trait]
pub trait Detector: Send + Sync {
    /// Decode `frame`, returning the first code found
    ///
    /// Errors are treated as transient by the decode loop.
    async fn detect(&self, frame: &CameraFrame) -> CameraResult<Option<String>>;
}

// SPDX-License-Identifier: GPL-3.0-only

//! Torch (flashlight) control on the active stream's track

use super::types::{BackendError, Capabilities};
use super::MediaStream;
use crate::errors::{CameraError, CameraResult};
use std::sync::Arc;
use tracing::{info, warn};

/// What a torch request did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TorchOutcome {
    /// Constraint applied; torch is now in the requested state
    Applied(bool),
    /// Nothing to do (same state, or torch not available)
    Unchanged,
}

/// Applies the torch constraint
#[derive(Debug, Default)]
pub struct TorchController;

impl TorchController {
    pub fn new() -> Self {
        Self
    }

    /// Switch the torch on `stream` to `target`
    ///
    /// No-op when `target` equals `current` or the capabilities do not
    /// advertise a torch. On failure the caller keeps its recorded state.
    pub async fn set_torch(
        &self,
        stream: &Arc<dyn MediaStream>,
        capabilities: &Capabilities,
        current: bool,
        target: bool,
    ) -> CameraResult<TorchOutcome> {
        if !capabilities.torch || target == current {
            return Ok(TorchOutcome::Unchanged);
        }

        let track = stream
            .video_tracks()
            .into_iter()
            .next()
            .ok_or(CameraError::TorchUnsupported)?;

        match track.apply_torch(target).await {
            Ok(()) => {
                info!(track = track.id(), on = target, "Torch applied");
                Ok(TorchOutcome::Applied(target))
            }
            Err(BackendError::NotSupported(msg)) => {
                warn!(track = track.id(), reason = %msg, "Torch not supported");
                Err(CameraError::TorchUnsupported)
            }
            Err(e) => {
                warn!(track = track.id(), error = %e, "Failed to apply torch");
                Err(CameraError::TorchApplyFailed(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::types::StreamConstraints;
    use crate::backends::camera::MediaDevices;
    use crate::backends::virtual_camera::{VirtualCamera, VirtualDevice};

    const TORCH: Capabilities = Capabilities { torch: true };
    const NO_TORCH: Capabilities = Capabilities { torch: false };

    #[tokio::test]
    async fn test_applies_when_supported() {
        let camera = VirtualCamera::new(vec![VirtualDevice::new("a", "Back Camera").with_torch()]);
        let stream = camera.open(&StreamConstraints::for_device("a")).await.unwrap();
        let track = camera.opened_tracks().pop().unwrap();

        let outcome = TorchController::new()
            .set_torch(&stream, &TORCH, false, true)
            .await
            .unwrap();
        assert_eq!(outcome, TorchOutcome::Applied(true));
        assert!(track.torch_enabled());
    }

    #[tokio::test]
    async fn test_noop_without_capability_or_same_state() {
        let camera = VirtualCamera::new(vec![VirtualDevice::new("a", "Back Camera").with_torch()]);
        let stream = camera.open(&StreamConstraints::for_device("a")).await.unwrap();
        let track = camera.opened_tracks().pop().unwrap();
        let torch = TorchController::new();

        assert_eq!(
            torch.set_torch(&stream, &NO_TORCH, false, true).await,
            Ok(TorchOutcome::Unchanged)
        );
        assert_eq!(
            torch.set_torch(&stream, &TORCH, true, true).await,
            Ok(TorchOutcome::Unchanged)
        );
        assert_eq!(track.torch_apply_count(), 0);
    }

    #[tokio::test]
    async fn test_apply_failure() {
        let camera = VirtualCamera::new(vec![VirtualDevice::new("a", "Back Camera").with_torch()]);
        let stream = camera.open(&StreamConstraints::for_device("a")).await.unwrap();
        let track = camera.opened_tracks().pop().unwrap();
        track.fail_torch(Some("overheated".to_string()));

        let result = TorchController::new()
            .set_torch(&stream, &TORCH, false, true)
            .await;
        assert!(matches!(result, Err(CameraError::TorchApplyFailed(_))));
        assert!(!track.torch_enabled());
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! Capture permission gate
//!
//! Makes sure capture permission is granted before devices are enumerated
//! (labels and ids are withheld by most platforms until it is). Where the
//! permission cannot be queried, a throwaway stream is opened to trigger the
//! prompt and its tracks are stopped immediately.

use super::types::{BackendError, PermissionState, StreamConstraints};
use super::MediaDevices;
use crate::errors::{AcquireFailure, CameraError, CameraResult};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Memoizing permission check
pub struct PermissionGate {
    devices: Arc<dyn MediaDevices>,
    satisfied: bool,
}

impl PermissionGate {
    pub fn new(devices: Arc<dyn MediaDevices>) -> Self {
        Self {
            devices,
            satisfied: false,
        }
    }

    /// Whether a previous `ensure` already succeeded
    pub fn is_satisfied(&self) -> bool {
        self.satisfied
    }

    /// Forget a previous grant (e.g. after the platform revoked it)
    pub fn reset(&mut self) {
        self.satisfied = false;
    }

    /// Ensure capture permission is granted
    pub async fn ensure(&mut self) -> CameraResult<()> {
        if self.satisfied {
            return Ok(());
        }

        match self.devices.query_permission().await {
            Some(PermissionState::Granted) => {
                debug!("Camera permission already granted");
            }
            Some(PermissionState::Denied) => {
                warn!("Camera permission denied");
                return Err(CameraError::PermissionDenied);
            }
            Some(PermissionState::Prompt) | None => {
                self.probe().await?;
            }
        }

        self.satisfied = true;
        Ok(())
    }

    /// Open and immediately close a stream to trigger the permission prompt
    async fn probe(&self) -> CameraResult<()> {
        info!("Probing camera permission with a throwaway stream");

        let stream = self
            .devices
            .open(&StreamConstraints::any_video())
            .await
            .map_err(|e| match e {
                BackendError::PermissionDenied(_) => CameraError::PermissionDenied,
                BackendError::DeviceNotFound(_) => CameraError::NoDeviceFound,
                other => CameraError::AcquisitionFailed {
                    device_id: String::new(),
                    reason: AcquireFailure::Unknown(other.to_string()),
                },
            })?;

        for track in stream.video_tracks() {
            stream.remove_track(track.id());
            track.stop();
        }
        debug!(stream = stream.id(), "Permission probe stream stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::{MediaTrack, TrackState};
    use crate::backends::virtual_camera::{VirtualCamera, VirtualDevice};

    #[tokio::test]
    async fn test_granted_skips_probe() {
        let camera = VirtualCamera::new(vec![VirtualDevice::new("a", "Camera A")]);
        camera.set_permission(Some(PermissionState::Granted));
        let mut gate = PermissionGate::new(camera.clone());

        gate.ensure().await.unwrap();
        assert!(gate.is_satisfied());
        assert_eq!(camera.open_count(), 0);
    }

    #[tokio::test]
    async fn test_probe_does_not_leak_tracks() {
        let camera = VirtualCamera::new(vec![VirtualDevice::new("a", "Camera A")]);
        camera.set_permission(None);
        let mut gate = PermissionGate::new(camera.clone());

        gate.ensure().await.unwrap();
        assert_eq!(camera.open_count(), 1);
        assert!(
            camera
                .opened_tracks()
                .iter()
                .all(|t| t.ready_state() == TrackState::Ended)
        );

        // Memoized: no second probe
        gate.ensure().await.unwrap();
        assert_eq!(camera.open_count(), 1);
    }

    #[tokio::test]
    async fn test_denied() {
        let camera = VirtualCamera::new(vec![VirtualDevice::new("a", "Camera A")]);
        camera.set_permission(Some(PermissionState::Denied));
        let mut gate = PermissionGate::new(camera.clone());

        assert_eq!(gate.ensure().await, Err(CameraError::PermissionDenied));
        assert!(!gate.is_satisfied());
    }

    #[tokio::test]
    async fn test_prompt_refused() {
        let camera = VirtualCamera::new(vec![VirtualDevice::new("a", "Camera A")]);
        camera.set_permission(Some(PermissionState::Prompt));
        camera.refuse_prompt(true);
        let mut gate = PermissionGate::new(camera.clone());

        assert_eq!(gate.ensure().await, Err(CameraError::PermissionDenied));
    }
}

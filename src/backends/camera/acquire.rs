// SPDX-License-Identifier: GPL-3.0-only

//! Stream acquisition for a chosen device

use super::types::{BackendError, CameraDevice, StreamConstraints};
use super::{MediaDevices, MediaStream};
use crate::errors::{AcquireFailure, CameraError, CameraResult};
use std::sync::Arc;
use tracing::{info, warn};

/// Opens streams for a specific device
///
/// The caller must have released any previous stream for the same sink first;
/// the acquirer does not track what is already open.
pub struct StreamAcquirer {
    devices: Arc<dyn MediaDevices>,
}

impl StreamAcquirer {
    pub fn new(devices: Arc<dyn MediaDevices>) -> Self {
        Self { devices }
    }

    /// Open a stream for `device`, video only
    pub async fn acquire(&self, device: &CameraDevice) -> CameraResult<Arc<dyn MediaStream>> {
        info!(device = %device.id, label = %device.label, "Acquiring camera stream");

        let constraints = StreamConstraints::for_device(&device.id);
        match self.devices.open(&constraints).await {
            Ok(stream) => {
                info!(device = %device.id, stream = stream.id(), "Camera stream acquired");
                Ok(stream)
            }
            Err(e) => {
                warn!(device = %device.id, error = %e, "Camera stream acquisition failed");
                Err(map_acquire_error(&device.id, e))
            }
        }
    }
}

fn map_acquire_error(device_id: &str, err: BackendError) -> CameraError {
    let reason = match err {
        BackendError::PermissionDenied(_) => return CameraError::PermissionDenied,
        BackendError::DeviceNotFound(_) => AcquireFailure::NotFound,
        BackendError::Overconstrained(_) => AcquireFailure::Overconstrained,
        other => AcquireFailure::Unknown(other.to_string()),
    };
    CameraError::AcquisitionFailed {
        device_id: device_id.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            map_acquire_error("a", BackendError::PermissionDenied("no".into())),
            CameraError::PermissionDenied
        );
        assert_eq!(
            map_acquire_error("a", BackendError::DeviceNotFound("a".into())),
            CameraError::AcquisitionFailed {
                device_id: "a".to_string(),
                reason: AcquireFailure::NotFound,
            }
        );
        assert!(matches!(
            map_acquire_error("a", BackendError::Other("busy".into())),
            CameraError::AcquisitionFailed {
                reason: AcquireFailure::Unknown(_),
                ..
            }
        ));
    }
}

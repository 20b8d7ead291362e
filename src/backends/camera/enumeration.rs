// SPDX-License-Identifier: GPL-3.0-only

//! Video input enumeration
//!
//! Lists video inputs in platform order, optionally restricted to one facing
//! direction. A reported facing mode always wins; otherwise the label is
//! matched against keyword lists.
//!
//! Known limitation: the label heuristic is best-effort. Devices with empty
//! labels, or labels in a language the keyword lists do not cover, get no
//! facing hint and are dropped by a facing filter.

use super::permission::PermissionGate;
use super::types::{BackendError, CameraDevice, DeviceKind, FacingMode};
use super::MediaDevices;
use crate::constants::facing;
use crate::errors::{CameraError, CameraResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Label keywords used to guess a camera's facing direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacingKeywords {
    pub front: Vec<String>,
    pub back: Vec<String>,
}

impl Default for FacingKeywords {
    fn default() -> Self {
        Self {
            front: facing::FRONT_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            back: facing::BACK_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl FacingKeywords {
    /// Guess the facing direction from a device label
    ///
    /// Back keywords are checked first: labels such as "Back Ultra Wide Camera"
    /// also contain words that could read as front hints in other locales.
    pub fn classify(&self, label: &str) -> Option<FacingMode> {
        let label = label.to_lowercase();
        let matches = |words: &[String]| {
            words
                .iter()
                .any(|w| !w.is_empty() && label.contains(&w.to_lowercase()))
        };

        if matches(&self.back) {
            Some(FacingMode::Back)
        } else if matches(&self.front) {
            Some(FacingMode::Front)
        } else {
            None
        }
    }
}

/// Lists video inputs, running the permission gate first
pub struct DeviceEnumerator {
    devices: Arc<dyn MediaDevices>,
    gate: PermissionGate,
    keywords: FacingKeywords,
}

impl DeviceEnumerator {
    pub fn new(devices: Arc<dyn MediaDevices>, keywords: FacingKeywords) -> Self {
        let gate = PermissionGate::new(Arc::clone(&devices));
        Self {
            devices,
            gate,
            keywords,
        }
    }

    pub fn permission(&mut self) -> &mut PermissionGate {
        &mut self.gate
    }

    /// List video inputs, optionally keeping only one facing direction
    pub async fn list(&mut self, filter: Option<FacingMode>) -> CameraResult<Vec<CameraDevice>> {
        self.gate.ensure().await?;

        let raw = self.devices.enumerate_devices().await.map_err(|e| match e {
            BackendError::PermissionDenied(_) => CameraError::PermissionDenied,
            other => CameraError::Enumeration(other.to_string()),
        })?;

        let cameras: Vec<CameraDevice> = raw
            .into_iter()
            .filter(|d| d.kind == DeviceKind::VideoInput)
            .map(|d| {
                let (facing, facing_reported) = match d.facing_mode {
                    Some(mode) => (Some(mode), true),
                    None => (self.keywords.classify(&d.label), false),
                };
                CameraDevice {
                    id: d.device_id,
                    label: d.label,
                    facing,
                    facing_reported,
                }
            })
            .filter(|d| filter.is_none() || d.facing == filter)
            .collect();

        for camera in &cameras {
            debug!(
                id = %camera.id,
                label = %camera.label,
                facing = ?camera.facing,
                reported = camera.facing_reported,
                "Found camera"
            );
        }
        info!(count = cameras.len(), filter = ?filter, "Enumerated cameras");

        Ok(cameras)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::types::{DeviceInfo, PermissionState};
    use crate::backends::virtual_camera::{VirtualCamera, VirtualDevice};

    #[test]
    fn test_classify_labels() {
        let kw = FacingKeywords::default();
        assert_eq!(kw.classify("Front Camera"), Some(FacingMode::Front));
        assert_eq!(kw.classify("camera2 1, facing back"), Some(FacingMode::Back));
        assert_eq!(kw.classify("Caméra arrière"), Some(FacingMode::Back));
        assert_eq!(kw.classify("FaceTime HD Camera"), Some(FacingMode::Front));
        assert_eq!(kw.classify("USB2.0 HD UVC WebCam"), None);
        assert_eq!(kw.classify(""), None);
    }

    #[test]
    fn test_custom_keywords_replace_defaults() {
        let kw = FacingKeywords {
            front: vec!["selfie".to_string()],
            back: vec![],
        };
        assert_eq!(kw.classify("Selfie cam"), Some(FacingMode::Front));
        assert_eq!(kw.classify("Front Camera"), None);
    }

    fn camera() -> Arc<VirtualCamera> {
        let camera = VirtualCamera::new(vec![
            VirtualDevice::new("a", "Front Camera"),
            VirtualDevice::new("b", "Back Camera"),
            VirtualDevice::new("c", "Integrated Webcam").with_facing(FacingMode::Front),
        ]);
        camera.set_permission(Some(PermissionState::Granted));
        camera.push_raw_device(DeviceInfo {
            device_id: "mic".to_string(),
            kind: DeviceKind::AudioInput,
            label: "Front Microphone".to_string(),
            facing_mode: None,
        });
        camera
    }

    #[tokio::test]
    async fn test_lists_video_inputs_in_order() {
        let mut enumerator = DeviceEnumerator::new(camera(), FacingKeywords::default());
        let ids: Vec<String> = enumerator
            .list(None)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_facing_filter_prefers_reported_mode() {
        let mut enumerator = DeviceEnumerator::new(camera(), FacingKeywords::default());
        let front = enumerator.list(Some(FacingMode::Front)).await.unwrap();
        let ids: Vec<&str> = front.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(!front[0].facing_reported);
        assert!(front[1].facing_reported);

        let back = enumerator.list(Some(FacingMode::Back)).await.unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].id, "b");
    }

    #[tokio::test]
    async fn test_enumeration_failure() {
        let camera = camera();
        camera.fail_enumeration(Some(BackendError::Other("bus error".into())));
        let mut enumerator = DeviceEnumerator::new(camera, FacingKeywords::default());
        assert!(matches!(
            enumerator.list(None).await,
            Err(CameraError::Enumeration(_))
        ));
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! In-process camera platform
//!
//! Implements the platform traits with scripted devices so the controller can
//! run without real hardware: the CLI feeds it still images from a directory,
//! and the tests use its fault injection hooks (refused permission, failing
//! opens, slow opens, unplugged devices, stuck sink teardown).
//!
//! # Architecture
//!
//! ```text
//! VirtualDevice (label, facing, torch, frames)
//!        │
//!        ▼
//! ┌──────────────────┐  open()   ┌────────────────────────────┐
//! │  VirtualCamera   │ ────────▶ │ VirtualStream ─ VirtualTrack│
//! │  (MediaDevices)  │           └─────────────┬──────────────┘
//! └──────────────────┘                         │ attach()
//!                                              ▼
//!                                 ┌──────────────────┐
//!                                 │   VirtualSink    │ → current_frame()
//!                                 └──────────────────┘
//! ```

mod file_source;
mod sink;
mod stream;

pub use file_source::{load_image_as_frame, load_image_dir};
pub use sink::VirtualSink;
pub use stream::{VirtualStream, VirtualTrack};

use crate::backends::camera::types::{
    BackendError, BackendResult, CameraFrame, DeviceInfo, DeviceKind, FacingMode, PermissionState,
    StreamConstraints,
};
use crate::backends::camera::{MediaDevices, MediaStream};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Description of a scripted camera
#[derive(Debug, Clone)]
pub struct VirtualDevice {
    pub id: String,
    pub label: String,
    /// Facing mode reported by the platform (not derived from the label)
    pub facing: Option<FacingMode>,
    pub torch: bool,
    /// Frames served in a loop while a track of this device is live
    pub frames: Vec<CameraFrame>,
}

impl VirtualDevice {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            facing: None,
            torch: false,
            frames: Vec::new(),
        }
    }

    pub fn with_facing(mut self, facing: FacingMode) -> Self {
        self.facing = Some(facing);
        self
    }

    pub fn with_torch(mut self) -> Self {
        self.torch = true;
        self
    }

    pub fn with_frame(mut self, frame: CameraFrame) -> Self {
        self.frames.push(frame);
        self
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo {
            device_id: self.id.clone(),
            kind: DeviceKind::VideoInput,
            label: self.label.clone(),
            facing_mode: self.facing,
        }
    }
}

#[derive(Default)]
struct Inner {
    devices: Vec<VirtualDevice>,
    /// Non-camera or malformed entries reported alongside the devices
    raw_extra: Vec<DeviceInfo>,
    permission: Option<PermissionState>,
    refuse_prompt: bool,
    enumerate_error: Option<BackendError>,
    open_errors: HashMap<String, BackendError>,
    open_delays: HashMap<String, Duration>,
    open_log: Vec<Option<String>>,
    streams: Vec<Arc<VirtualStream>>,
}

/// Scripted [`MediaDevices`] implementation
pub struct VirtualCamera {
    inner: Mutex<Inner>,
}

impl VirtualCamera {
    /// Create a platform with `devices`, permission already granted
    pub fn new(devices: Vec<VirtualDevice>) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner {
                devices,
                permission: Some(PermissionState::Granted),
                ..Default::default()
            }),
        })
    }

    /// Permission state reported by `query_permission` (`None`: not queryable)
    pub fn set_permission(&self, permission: Option<PermissionState>) {
        self.inner.lock().permission = permission;
    }

    /// Whether the user declines the prompt shown when opening a stream
    pub fn refuse_prompt(&self, refuse: bool) {
        self.inner.lock().refuse_prompt = refuse;
    }

    /// Report an extra raw entry from enumeration
    pub fn push_raw_device(&self, info: DeviceInfo) {
        self.inner.lock().raw_extra.push(info);
    }

    pub fn fail_enumeration(&self, error: Option<BackendError>) {
        self.inner.lock().enumerate_error = error;
    }

    /// Make opening `device_id` fail with `error` (or succeed again with `None`)
    pub fn fail_open(&self, device_id: &str, error: Option<BackendError>) {
        let mut inner = self.inner.lock();
        match error {
            Some(e) => inner.open_errors.insert(device_id.to_string(), e),
            None => inner.open_errors.remove(device_id),
        };
    }

    /// Make opening `device_id` take `delay` before resolving
    pub fn set_open_delay(&self, device_id: &str, delay: Duration) {
        self.inner
            .lock()
            .open_delays
            .insert(device_id.to_string(), delay);
    }

    /// Plug in a new device
    pub fn add_device(&self, device: VirtualDevice) {
        info!(device = %device.id, "Virtual device added");
        self.inner.lock().devices.push(device);
    }

    /// Unplug a device; its live tracks end
    pub fn remove_device(&self, device_id: &str) {
        let mut inner = self.inner.lock();
        inner.devices.retain(|d| d.id != device_id);
        for stream in &inner.streams {
            for track in stream.tracks() {
                if track.device_id() == device_id {
                    track.end();
                }
            }
        }
        info!(device = device_id, "Virtual device removed");
    }

    /// Number of successful and failed `open` calls
    pub fn open_count(&self) -> usize {
        self.inner.lock().open_log.len()
    }

    /// Device ids requested by each `open` call, in order
    pub fn open_log(&self) -> Vec<Option<String>> {
        self.inner.lock().open_log.clone()
    }

    /// Every track ever handed out, in creation order
    pub fn opened_tracks(&self) -> Vec<Arc<VirtualTrack>> {
        self.inner
            .lock()
            .streams
            .iter()
            .flat_map(|s| s.created_tracks())
            .collect()
    }

    /// Tracks that still hold hardware
    pub fn live_tracks(&self) -> Vec<Arc<VirtualTrack>> {
        self.opened_tracks()
            .into_iter()
            .filter(|t| t.is_live())
            .collect()
    }

    /// Next frame of the first live track of stream `stream_id`
    pub(crate) fn frame_for_stream(&self, stream_id: &str) -> Option<CameraFrame> {
        let stream = self
            .inner
            .lock()
            .streams
            .iter()
            .find(|s| s.id() == stream_id)
            .cloned()?;
        stream
            .tracks()
            .into_iter()
            .find(|t| t.is_live())
            .and_then(|t| t.next_frame())
    }
}

#[async_trait]
impl MediaDevices for VirtualCamera {
    async fn query_permission(&self) -> Option<PermissionState> {
        self.inner.lock().permission
    }

    async fn enumerate_devices(&self) -> BackendResult<Vec<DeviceInfo>> {
        let inner = self.inner.lock();
        if let Some(err) = &inner.enumerate_error {
            return Err(err.clone());
        }
        // Platforms withhold identities until permission is granted
        let granted = inner.permission == Some(PermissionState::Granted);
        let mut list: Vec<DeviceInfo> = inner
            .devices
            .iter()
            .map(|d| {
                let mut info = d.info();
                if !granted {
                    info.label.clear();
                }
                info
            })
            .collect();
        list.extend(inner.raw_extra.iter().cloned());
        Ok(list)
    }

    async fn open(&self, constraints: &StreamConstraints) -> BackendResult<Arc<dyn MediaStream>> {
        let delay = {
            let mut inner = self.inner.lock();
            inner.open_log.push(constraints.device_id.clone());
            constraints
                .device_id
                .as_ref()
                .and_then(|id| inner.open_delays.get(id).copied())
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut inner = self.inner.lock();
        let permission = inner.permission;
        match permission {
            Some(PermissionState::Denied) => {
                return Err(BackendError::PermissionDenied("capture not allowed".into()));
            }
            Some(PermissionState::Prompt) | None if inner.refuse_prompt => {
                inner.permission = Some(PermissionState::Denied);
                return Err(BackendError::PermissionDenied("prompt dismissed".into()));
            }
            Some(PermissionState::Prompt) | None => {
                inner.permission = Some(PermissionState::Granted);
            }
            Some(PermissionState::Granted) => {}
        }

        let device = match &constraints.device_id {
            Some(id) => {
                if let Some(err) = inner.open_errors.get(id) {
                    return Err(err.clone());
                }
                inner.devices.iter().find(|d| &d.id == id)
            }
            None => inner.devices.first(),
        }
        .cloned()
        .ok_or_else(|| {
            BackendError::DeviceNotFound(constraints.device_id.clone().unwrap_or_default())
        })?;

        let stream = Arc::new(VirtualStream::new(vec![Arc::new(VirtualTrack::new(&device))]));
        debug!(device = %device.id, stream = stream.id(), "Virtual stream opened");
        inner.streams.push(Arc::clone(&stream));
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::{MediaTrack, TrackState};

    #[tokio::test]
    async fn test_open_unknown_device() {
        let camera = VirtualCamera::new(vec![VirtualDevice::new("a", "Camera A")]);
        let result = camera.open(&StreamConstraints::for_device("zz")).await;
        assert!(matches!(result, Err(BackendError::DeviceNotFound(_))));
        assert_eq!(camera.open_log(), vec![Some("zz".to_string())]);
    }

    #[tokio::test]
    async fn test_labels_hidden_until_granted() {
        let camera = VirtualCamera::new(vec![VirtualDevice::new("a", "Camera A")]);
        camera.set_permission(Some(PermissionState::Prompt));
        let list = camera.enumerate_devices().await.unwrap();
        assert!(list[0].label.is_empty());

        camera.open(&StreamConstraints::any_video()).await.unwrap();
        let list = camera.enumerate_devices().await.unwrap();
        assert_eq!(list[0].label, "Camera A");
    }

    #[tokio::test]
    async fn test_remove_device_ends_tracks() {
        let camera = VirtualCamera::new(vec![VirtualDevice::new("a", "Camera A")]);
        camera.open(&StreamConstraints::for_device("a")).await.unwrap();
        camera.remove_device("a");

        let track = camera.opened_tracks().pop().unwrap();
        assert_eq!(track.ready_state(), TrackState::Ended);
        assert!(camera.live_tracks().is_empty());
        assert!(camera.enumerate_devices().await.unwrap().is_empty());
    }
}

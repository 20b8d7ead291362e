// SPDX-License-Identifier: GPL-3.0-only

//! Virtual streams and tracks

use super::VirtualDevice;
use crate::backends::camera::types::{
    BackendError, BackendResult, CameraFrame, FacingMode, TrackCapabilities, TrackSettings,
    TrackState,
};
use crate::backends::camera::{MediaStream, MediaTrack};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use tracing::debug;

/// Blank frame served by devices without scripted frames
fn blank_frame() -> CameraFrame {
    CameraFrame::from_rgba(4, 4, vec![0x80; 4 * 4 * 4])
}

/// A video track bound to one virtual device
pub struct VirtualTrack {
    id: String,
    device_id: String,
    facing: Option<FacingMode>,
    torch_supported: bool,
    live: AtomicBool,
    torch: AtomicBool,
    torch_applies: AtomicU32,
    torch_error: Mutex<Option<String>>,
    frames: Vec<CameraFrame>,
    cursor: AtomicUsize,
}

impl VirtualTrack {
    pub(super) fn new(device: &VirtualDevice) -> Self {
        let frames = if device.frames.is_empty() {
            vec![blank_frame()]
        } else {
            device.frames.clone()
        };
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            device_id: device.id.clone(),
            facing: device.facing,
            torch_supported: device.torch,
            live: AtomicBool::new(true),
            torch: AtomicBool::new(false),
            torch_applies: AtomicU32::new(0),
            torch_error: Mutex::new(None),
            frames,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    pub fn torch_enabled(&self) -> bool {
        self.torch.load(Ordering::SeqCst)
    }

    /// Successful torch constraint applications
    pub fn torch_apply_count(&self) -> u32 {
        self.torch_applies.load(Ordering::SeqCst)
    }

    /// Make torch application fail with `reason` (or succeed again with `None`)
    pub fn fail_torch(&self, reason: Option<String>) {
        *self.torch_error.lock() = reason;
    }

    /// Hardware went away (unplugged)
    pub(super) fn end(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    pub(super) fn next_frame(&self) -> Option<CameraFrame> {
        if !self.is_live() || self.frames.is_empty() {
            return None;
        }
        let i = self.cursor.fetch_add(1, Ordering::Relaxed) % self.frames.len();
        Some(self.frames[i].clone())
    }
}

#[async_trait]
impl MediaTrack for VirtualTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn ready_state(&self) -> TrackState {
        if self.is_live() {
            TrackState::Live
        } else {
            TrackState::Ended
        }
    }

    fn stop(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            debug!(track = %self.id, device = %self.device_id, "Virtual track stopped");
        }
    }

    fn capabilities(&self) -> TrackCapabilities {
        TrackCapabilities {
            torch: self.torch_supported.then_some(true),
        }
    }

    fn settings(&self) -> TrackSettings {
        TrackSettings {
            facing_mode: self.facing,
        }
    }

    async fn apply_torch(&self, on: bool) -> BackendResult<()> {
        if !self.is_live() {
            return Err(BackendError::Other("track ended".into()));
        }
        if !self.torch_supported {
            return Err(BackendError::NotSupported("no torch on this device".into()));
        }
        if let Some(reason) = self.torch_error.lock().clone() {
            return Err(BackendError::Other(reason));
        }
        self.torch.store(on, Ordering::SeqCst);
        self.torch_applies.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A stream of virtual tracks
pub struct VirtualStream {
    id: String,
    /// Tracks currently attached
    tracks: Mutex<Vec<Arc<VirtualTrack>>>,
    /// Every track the stream was created with, for inspection
    created: Vec<Arc<VirtualTrack>>,
}

impl VirtualStream {
    pub(super) fn new(tracks: Vec<Arc<VirtualTrack>>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tracks: Mutex::new(tracks.clone()),
            created: tracks,
        }
    }

    pub(super) fn tracks(&self) -> Vec<Arc<VirtualTrack>> {
        self.tracks.lock().clone()
    }

    pub(super) fn created_tracks(&self) -> Vec<Arc<VirtualTrack>> {
        self.created.clone()
    }
}

impl MediaStream for VirtualStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn video_tracks(&self) -> Vec<Arc<dyn MediaTrack>> {
        self.tracks
            .lock()
            .iter()
            .map(|t| Arc::clone(t) as Arc<dyn MediaTrack>)
            .collect()
    }

    fn remove_track(&self, track_id: &str) {
        self.tracks.lock().retain(|t| t.id() != track_id);
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! Controller state types

use crate::app::frame_processor::{DecodeLoop, Detector};
use crate::backends::camera::{
    CameraDevice, Capabilities, DeviceEnumerator, MediaStream, StreamAcquirer, StreamBinder,
    StreamReleaser, TorchController, VideoSink,
};
use crate::config::Config;
use crate::errors::{CameraError, CameraResult};
use crate::storage::DeviceStore;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

/// Lifecycle state of the controller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum CameraState {
    /// No hardware held
    #[default]
    Idle,
    /// Enumeration, acquisition or binding in flight
    Starting,
    /// Stream bound, frames flowing, capabilities known
    Displaying,
    /// Teardown in flight
    Stopping,
}

impl std::fmt::Display for CameraState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraState::Idle => write!(f, "idle"),
            CameraState::Starting => write!(f, "starting"),
            CameraState::Displaying => write!(f, "displaying"),
            CameraState::Stopping => write!(f, "stopping"),
        }
    }
}

/// Observable controller state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub state: CameraState,
    /// Latest enumeration, in platform order
    pub devices: Vec<CameraDevice>,
    /// Device the controller is targeting (may not be bound yet)
    pub selected_device_id: Option<String>,
    /// `None` while no stream is active
    pub capabilities: Option<Capabilities>,
    pub torch: bool,
}

impl Snapshot {
    pub fn selected_device(&self) -> Option<&CameraDevice> {
        let id = self.selected_device_id.as_ref()?;
        self.devices.iter().find(|d| &d.id == id)
    }
}

/// Notifications delivered to the owner, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    Scanned(String),
    Error(CameraError),
    StateChanged(CameraState),
}

/// Acknowledged once the controller has settled the request
pub(crate) type Ack = oneshot::Sender<Snapshot>;

/// Requests processed by the controller task
pub(crate) enum Message {
    Start { device: Option<String>, ack: Ack },
    Stop { ack: Ack },
    SelectDevice { id: String, ack: Ack },
    SetTorch { on: bool, reply: oneshot::Sender<CameraResult<bool>> },
    SetVisible { visible: bool, ack: Ack },
    RefreshDevices { ack: Ack },
    Shutdown { ack: Ack },
}

/// The stream currently bound to the sink
pub(crate) struct ActiveStream {
    pub device: CameraDevice,
    pub stream: Arc<dyn MediaStream>,
    pub capabilities: Capabilities,
}

/// Leaf components the controller drives
pub(crate) struct Pipeline {
    pub enumerator: DeviceEnumerator,
    pub acquirer: StreamAcquirer,
    pub binder: StreamBinder,
    pub releaser: StreamReleaser,
    pub torch: TorchController,
}

/// State owned by the controller task
///
/// Desired fields (`enabled`, `visible`, `mounted`, `selected`) are written by
/// message handlers; reconciliation drives the actual fields (`state`,
/// `active`, `torch`) towards them.
pub(crate) struct ControllerModel {
    pub config: Config,
    pub inbox: mpsc::UnboundedReceiver<Message>,
    pub events: mpsc::UnboundedSender<ControllerEvent>,
    pub observers: watch::Sender<Snapshot>,
    pub sink: Arc<dyn VideoSink>,
    pub store: Arc<dyn DeviceStore>,
    pub detector: Arc<dyn Detector>,
    pub pipeline: Pipeline,
    pub decode: DecodeLoop,

    // ===== Desired =====
    pub mounted: bool,
    pub enabled: bool,
    pub visible: bool,
    pub selected: Option<String>,
    /// Stored preference, read once at mount
    pub preferred: Option<String>,
    pub refresh_requested: bool,

    // ===== Actual =====
    pub state: CameraState,
    pub devices: Vec<CameraDevice>,
    pub devices_stale: bool,
    pub active: Option<ActiveStream>,
    pub torch: bool,

    /// Acks resolved after the next reconcile
    pub pending_acks: Vec<Ack>,
    /// Messages that cannot be absorbed mid-transition
    pub deferred: VecDeque<Message>,
}

impl ControllerModel {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            devices: self.devices.clone(),
            selected_device_id: self.selected.clone(),
            capabilities: self.active.as_ref().map(|a| a.capabilities),
            torch: self.torch,
        }
    }

    /// Push the current snapshot to observers
    pub fn publish(&self) {
        self.observers.send_replace(self.snapshot());
    }

    pub fn emit(&self, event: ControllerEvent) {
        // Owner dropped the receiver; nothing left to notify
        let _ = self.events.send(event);
    }

    pub fn set_state(&mut self, state: CameraState) {
        if self.state == state {
            return;
        }
        tracing::info!(from = %self.state, to = %state, "Camera state changed");
        self.state = state;
        self.publish();
        self.emit(ControllerEvent::StateChanged(state));
    }

    /// Whether the owner currently wants frames
    pub fn wants_capture(&self) -> bool {
        self.mounted && self.enabled && (self.visible || !self.config.auto_pause_when_hidden)
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! Camera controller
//!
//! The controller owns the capture lifecycle for one sink: device selection,
//! stream acquisition and release, capability negotiation, torch and the
//! decode loop. It runs as a single tokio task; [`CameraController`] is a
//! cheap handle that sends it requests.
//!
//! # Architecture
//!
//! - `state`: Controller state types (ControllerModel, Message, Snapshot, etc.)
//! - `update`: Main loop, message dispatch and reconciliation
//! - `handlers`: Lifecycle, torch and system handlers
//! - `frame_processor`: Decode loop, detectors, still image scanning
//!
//! # Main Types
//!
//! - `CameraController`: Handle used by the owner
//! - `ControllerEvent`: Scans, errors and state changes, delivered in order
//! - `Snapshot`: Observable state (state, devices, selection, capabilities, torch)

pub mod frame_processor;
mod handlers;
mod state;
mod update;

pub use state::{CameraState, ControllerEvent, Snapshot};

use crate::backends::camera::{
    DeviceEnumerator, MediaDevices, StreamAcquirer, StreamBinder, StreamReleaser, TorchController,
    VideoSink,
};
use crate::config::Config;
use crate::errors::{CameraError, CameraResult};
use crate::storage::DeviceStore;
use frame_processor::{DecodeLoop, Detector};
use state::{Ack, ControllerModel, Message, Pipeline};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::warn;

/// Receiver for controller events
pub type EventReceiver = mpsc::UnboundedReceiver<ControllerEvent>;

/// Collaborators a controller is mounted with
pub struct ControllerParts {
    pub devices: Arc<dyn MediaDevices>,
    pub sink: Arc<dyn VideoSink>,
    pub store: Arc<dyn DeviceStore>,
    pub detector: Arc<dyn Detector>,
}

/// Handle to a running controller
///
/// Clones share the same controller. Dropping every handle unmounts it.
#[derive(Clone)]
pub struct CameraController {
    tx: mpsc::UnboundedSender<Message>,
    observers: watch::Receiver<Snapshot>,
}

impl CameraController {
    /// Mount a controller on the current tokio runtime
    ///
    /// With `config.start_on_mount` the controller starts capturing right
    /// away on the stored or first device.
    pub fn spawn(parts: ControllerParts, config: Config) -> (Self, EventReceiver) {
        let (tx, inbox) = mpsc::unbounded_channel();
        let (events_tx, events) = mpsc::unbounded_channel();
        let (observers_tx, observers) = watch::channel(Snapshot::default());

        let preferred = if config.remember_last_device {
            parts.store.last_device_id().unwrap_or_else(|e| {
                warn!(error = %e, "Failed to read last device, ignoring");
                None
            })
        } else {
            None
        };

        let pipeline = Pipeline {
            enumerator: DeviceEnumerator::new(
                Arc::clone(&parts.devices),
                config.facing_keywords.clone(),
            ),
            acquirer: StreamAcquirer::new(Arc::clone(&parts.devices)),
            binder: StreamBinder::new(config.bind_timing(), config.mirror),
            releaser: StreamReleaser::new(config.detach_ack_timeout()),
            torch: TorchController::new(),
        };

        let model = ControllerModel {
            decode: DecodeLoop::new(config.decode_delay()),
            enabled: config.start_on_mount,
            config,
            inbox,
            events: events_tx,
            observers: observers_tx,
            sink: parts.sink,
            store: parts.store,
            detector: parts.detector,
            pipeline,
            mounted: true,
            visible: true,
            selected: None,
            preferred,
            refresh_requested: false,
            state: CameraState::Idle,
            devices: Vec::new(),
            devices_stale: false,
            active: None,
            torch: false,
            pending_acks: Vec::new(),
            deferred: VecDeque::new(),
        };

        tokio::spawn(model.run());
        (Self { tx, observers }, events)
    }

    async fn request(&self, message: impl FnOnce(Ack) -> Message) -> CameraResult<Snapshot> {
        let (ack, settled) = oneshot::channel();
        self.tx
            .send(message(ack))
            .map_err(|_| CameraError::Closed)?;
        settled.await.map_err(|_| CameraError::Closed)
    }

    /// Start capturing on `device`, or on the current/stored/first device
    ///
    /// Resolves once the controller settled; start failures are reported on
    /// the event stream and leave the controller idle.
    pub async fn start(&self, device: Option<String>) -> CameraResult<Snapshot> {
        self.request(|ack| Message::Start { device, ack }).await
    }

    /// Release the camera; a no-op when already idle
    pub async fn stop(&self) -> CameraResult<Snapshot> {
        self.request(|ack| Message::Stop { ack }).await
    }

    /// Target another device, restarting capture on it
    pub async fn select_device(&self, id: impl Into<String>) -> CameraResult<Snapshot> {
        let id = id.into();
        self.request(|ack| Message::SelectDevice { id, ack }).await
    }

    /// Switch the torch; resolves to the torch state afterwards
    pub async fn set_torch(&self, on: bool) -> CameraResult<bool> {
        let (reply, result) = oneshot::channel();
        self.tx
            .send(Message::SetTorch { on, reply })
            .map_err(|_| CameraError::Closed)?;
        result.await.map_err(|_| CameraError::Closed)?
    }

    /// Report whether the owning view is visible
    pub async fn set_visible(&self, visible: bool) -> CameraResult<Snapshot> {
        self.request(|ack| Message::SetVisible { visible, ack }).await
    }

    /// Re-enumerate devices (call on device change notifications)
    pub async fn refresh_devices(&self) -> CameraResult<Snapshot> {
        self.request(|ack| Message::RefreshDevices { ack }).await
    }

    /// Unmount: release everything and stop the controller task
    pub async fn shutdown(&self) -> CameraResult<()> {
        self.request(|ack| Message::Shutdown { ack }).await.map(|_| ())
    }

    /// Current observable state
    pub fn snapshot(&self) -> Snapshot {
        self.observers.borrow().clone()
    }

    /// Watch observable state changes
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.observers.clone()
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! Camera lifecycle handlers
//!
//! Starting walks permission, enumeration, device resolution, acquisition and
//! binding. Each step can suspend; after each one the transition re-checks
//! that its target is still wanted and, if not, releases whatever it holds
//! and returns so that `reconcile` can pick up the newer intent. The previous
//! stream is always fully released before a new one is acquired.

use crate::app::state::{ActiveStream, CameraState, ControllerEvent, ControllerModel};
use crate::backends::camera::{CameraDevice, MediaStream};
use crate::errors::{CameraError, CameraResult};
use std::sync::Arc;
use tracing::{debug, info, warn};

impl ControllerModel {
    // ===== Intent handlers =====

    pub(crate) fn handle_start(&mut self, device: Option<String>) {
        if let Some(id) = device {
            self.selected = Some(id);
        }
        self.enabled = true;
    }

    pub(crate) fn handle_stop(&mut self) {
        self.enabled = false;
    }

    pub(crate) fn handle_select_device(&mut self, id: String) {
        if self.selected.as_deref() != Some(id.as_str()) {
            info!(device = %id, "Device selected");
        }
        self.selected = Some(id);
        self.enabled = true;
    }

    // ===== Transitions =====

    /// Idle -> Starting -> Displaying
    pub(crate) async fn start_capture(&mut self) {
        self.set_state(CameraState::Starting);
        let requested = self.selected.clone();

        if let Err(e) = self.pipeline.enumerator.permission().ensure().await {
            return self.fail_start(e, None).await;
        }
        if !self.still_wanted(&requested) {
            return self.abandon_start(None).await;
        }

        if self.needs_enumeration() {
            match self.pipeline.enumerator.list(self.config.facing).await {
                Ok(devices) => {
                    self.devices = devices;
                    self.devices_stale = false;
                    self.publish();
                }
                Err(e) => return self.fail_start(e, None).await,
            }
            if !self.still_wanted(&requested) {
                return self.abandon_start(None).await;
            }
        }

        let device = match self.resolve_target() {
            Ok(device) => device,
            Err(e) => return self.fail_start(e, None).await,
        };
        self.selected = Some(device.id.clone());
        self.remember_device(&device.id);
        self.publish();
        let target = self.selected.clone();

        let stream = match self.pipeline.acquirer.acquire(&device).await {
            Ok(stream) => stream,
            Err(e) => return self.fail_start(e, None).await,
        };
        if !self.still_wanted(&target) {
            return self.abandon_start(Some(stream)).await;
        }

        let capabilities = match self.bind(&stream, &device).await {
            Ok(capabilities) => capabilities,
            Err(e) => return self.fail_start(e, Some(stream)).await,
        };
        if !self.still_wanted(&target) {
            return self.abandon_start(Some(stream)).await;
        }

        info!(device = %device.id, label = %device.label, torch = capabilities.torch, "Camera displaying");
        self.active = Some(ActiveStream {
            device,
            stream,
            capabilities,
        });
        self.torch = false;
        self.set_state(CameraState::Displaying);
        self.decode.arm();
        self.publish();
    }

    /// Displaying -> Stopping -> Idle
    ///
    /// Never fails: release errors are logged by the releaser and dropped.
    pub(crate) async fn release_active(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        self.decode.disarm();
        self.set_state(CameraState::Stopping);

        self.pipeline
            .releaser
            .release(self.sink.as_ref(), Some(&active.stream), self.torch)
            .await;

        self.torch = false;
        // Devices may change while nothing is held; list again on the next start
        self.devices_stale = true;
        info!(device = %active.device.id, "Camera released");
        self.set_state(CameraState::Idle);
    }

    /// Re-enumerate; release the active stream if its device disappeared
    pub(crate) async fn handle_refresh_devices(&mut self) {
        let devices = match self.pipeline.enumerator.list(self.config.facing).await {
            Ok(devices) => devices,
            Err(e) => {
                warn!(error = %e, "Device refresh failed");
                self.emit(ControllerEvent::Error(e));
                return;
            }
        };
        self.devices = devices;
        self.devices_stale = false;
        self.publish();

        let vanished = self
            .active
            .as_ref()
            .filter(|active| !self.devices.iter().any(|d| d.id == active.device.id))
            .map(|active| active.device.id.clone());

        if let Some(device_id) = vanished {
            warn!(device = %device_id, "Active camera disappeared");
            self.release_active().await;
            self.enabled = false;
            self.emit(ControllerEvent::Error(CameraError::DeviceVanished { device_id }));
        }
    }

    // ===== Helpers =====

    fn needs_enumeration(&self) -> bool {
        self.devices.is_empty()
            || self.devices_stale
            || self
                .selected
                .as_ref()
                .is_some_and(|id| !self.devices.iter().any(|d| &d.id == id))
    }

    /// Explicit selection, else stored preference, else first device
    fn resolve_target(&self) -> CameraResult<CameraDevice> {
        if self.devices.is_empty() {
            return Err(CameraError::NoDeviceFound);
        }

        if let Some(id) = &self.selected {
            return self
                .devices
                .iter()
                .find(|d| &d.id == id)
                .cloned()
                .ok_or_else(|| CameraError::DeviceVanished {
                    device_id: id.clone(),
                });
        }

        let preferred = self
            .preferred
            .as_ref()
            .and_then(|id| self.devices.iter().find(|d| &d.id == id));
        if preferred.is_none() && self.preferred.is_some() {
            debug!(preferred = ?self.preferred, "Stored device not present, using first device");
        }
        preferred
            .or_else(|| self.devices.first())
            .cloned()
            .ok_or(CameraError::NoDeviceFound)
    }

    async fn bind(
        &self,
        stream: &Arc<dyn MediaStream>,
        device: &CameraDevice,
    ) -> CameraResult<crate::backends::camera::Capabilities> {
        let binding = self.pipeline.binder.bind(self.sink.as_ref(), stream, device);
        match self.config.bind_timeout() {
            Some(limit) => match tokio::time::timeout(limit, binding).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(device = %device.id, timeout_ms = limit.as_millis() as u64, "Bind timed out");
                    Err(CameraError::BindTimeout(limit))
                }
            },
            None => binding.await,
        }
    }

    /// Best-effort write of the last used device
    fn remember_device(&self, id: &str) {
        if !self.config.remember_last_device {
            return;
        }
        if let Err(e) = self.store.set_last_device_id(id) {
            warn!(device = id, error = %e, "Failed to store last device");
        }
    }

    /// Starting -> Idle after a failure; reported once, not retried
    async fn fail_start(&mut self, error: CameraError, stream: Option<Arc<dyn MediaStream>>) {
        warn!(error = %error, "Camera start failed");
        if error == CameraError::PermissionDenied {
            // A grant seen earlier may have been revoked since
            self.pipeline.enumerator.permission().reset();
        }
        self.pipeline
            .releaser
            .release(self.sink.as_ref(), stream.as_ref(), false)
            .await;
        self.enabled = false;
        self.set_state(CameraState::Idle);
        self.emit(ControllerEvent::Error(error));
    }

    /// Drop a superseded start; `reconcile` decides what happens next
    async fn abandon_start(&mut self, stream: Option<Arc<dyn MediaStream>>) {
        if stream.is_some() {
            debug!("Releasing stream acquired for a superseded selection");
        }
        self.pipeline
            .releaser
            .release(self.sink.as_ref(), stream.as_ref(), false)
            .await;
    }
}

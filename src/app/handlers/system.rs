// SPDX-License-Identifier: GPL-3.0-only

//! System handlers
//!
//! Visibility, unmounting and decode polling. A decode poll never holds up
//! the controller: any request that arrives while the detector runs cancels
//! the poll.

use crate::app::frame_processor::PollOutcome;
use crate::app::state::{CameraState, ControllerEvent, ControllerModel};
use tracing::{debug, info};

impl ControllerModel {
    pub(crate) fn handle_set_visible(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        if self.config.auto_pause_when_hidden {
            info!(visible, "Visibility changed, camera will follow");
        } else {
            debug!(visible, "Visibility changed");
        }
    }

    /// Unmount: release everything and end the controller task
    pub(crate) fn handle_shutdown(&mut self) {
        info!("Camera controller shutting down");
        self.mounted = false;
    }

    /// Every handle was dropped; nobody can observe the controller anymore
    pub(crate) fn handle_handles_dropped(&mut self) {
        if self.mounted {
            debug!("All controller handles dropped");
        }
        self.mounted = false;
    }

    pub(crate) async fn handle_decode_due(&mut self) {
        if self.state != CameraState::Displaying || self.active.is_none() {
            self.decode.disarm();
            return;
        }

        // A request arriving mid-decode wins: the detect call is dropped and
        // the deadline stays due, so the poll reruns if still displaying.
        let outcome = tokio::select! {
            biased;
            message = self.inbox.recv() => {
                match message {
                    Some(message) => self.deferred.push_back(message),
                    None => self.handle_handles_dropped(),
                }
                debug!("Decode interrupted by a pending request");
                return;
            }
            outcome = self.decode.poll(self.sink.as_ref(), self.detector.as_ref()) => outcome,
        };

        match outcome {
            PollOutcome::Scanned(code) => {
                info!(code = %code, "Code scanned");
                self.emit(ControllerEvent::Scanned(code));
            }
            PollOutcome::Failed(e) => {
                debug!(error = %e, "Decode attempt failed");
                self.emit(ControllerEvent::Error(e));
            }
            PollOutcome::Nothing => {}
        }
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! Torch handler

use crate::app::state::{CameraState, ControllerEvent, ControllerModel};
use crate::backends::camera::TorchOutcome;
use crate::errors::CameraResult;
use tracing::debug;

impl ControllerModel {
    /// Apply a torch request to the active stream
    ///
    /// Resolves to the torch state after the request. Without an active
    /// stream, or without torch capability, nothing is applied and the torch
    /// stays off. Failures are reported on the event stream as well as
    /// returned, and leave the recorded state unchanged.
    pub(crate) async fn handle_set_torch(&mut self, on: bool) -> CameraResult<bool> {
        let Some(active) = self.active.as_ref().filter(|_| self.state == CameraState::Displaying)
        else {
            debug!(on, "Torch request ignored, no active stream");
            return Ok(self.torch);
        };

        match self
            .pipeline
            .torch
            .set_torch(&active.stream, &active.capabilities, self.torch, on)
            .await
        {
            Ok(TorchOutcome::Applied(state)) => {
                self.torch = state;
                self.publish();
                Ok(state)
            }
            Ok(TorchOutcome::Unchanged) => Ok(self.torch),
            Err(e) => {
                self.emit(ControllerEvent::Error(e.clone()));
                Err(e)
            }
        }
    }
}

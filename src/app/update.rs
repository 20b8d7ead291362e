// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! The controller is a single task. Its main loop waits on either the inbox or
//! the decode deadline; messages update the desired state and `reconcile`
//! then walks the lifecycle towards it. Every suspension inside a transition
//! is followed by a guard check that absorbs newly arrived messages and
//! abandons the transition when its target is no longer wanted.
//!
//! # Handler Modules
//!
//! - `handlers::camera`: start, release, device resolution, re-enumeration
//! - `handlers::torch`: torch requests
//! - `handlers::system`: visibility, mount/unmount, decode polling

use crate::app::state::{CameraState, ControllerModel, Message};
use futures::future::OptionFuture;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, info};

/// What woke the main loop
enum Wake {
    Message(Option<Message>),
    DecodeDue,
}

impl ControllerModel {
    pub(crate) async fn run(mut self) {
        info!(
            start_on_mount = self.enabled,
            preferred = ?self.preferred,
            "Camera controller mounted"
        );
        self.publish();
        self.reconcile().await;

        while self.mounted {
            let wake = match self.deferred.pop_front() {
                Some(message) => Wake::Message(Some(message)),
                None => {
                    let decode_due: OptionFuture<_> =
                        self.decode.deadline().map(tokio::time::sleep_until).into();
                    tokio::select! {
                        biased;
                        message = self.inbox.recv() => Wake::Message(message),
                        Some(()) = decode_due => Wake::DecodeDue,
                    }
                }
            };

            match wake {
                Wake::Message(Some(message)) => self.update(message).await,
                Wake::Message(None) => self.handle_handles_dropped(),
                Wake::DecodeDue => self.handle_decode_due().await,
            }
            self.reconcile().await;
        }

        self.inbox.close();
        info!("Camera controller unmounted");
    }

    /// Main message handler
    pub(crate) async fn update(&mut self, message: Message) {
        match message {
            Message::SetTorch { on, reply } => {
                let result = self.handle_set_torch(on).await;
                let _ = reply.send(result);
            }
            other => {
                // Intent messages carry no async work of their own
                if let Some(deferred) = self.absorb(other) {
                    self.deferred.push_back(deferred);
                }
            }
        }
    }

    /// Apply an intent message to the desired state
    ///
    /// Returns the message back when it needs an active, settled stream and
    /// must wait until the current transition finishes.
    pub(crate) fn absorb(&mut self, message: Message) -> Option<Message> {
        match message {
            Message::Start { device, ack } => {
                self.handle_start(device);
                self.pending_acks.push(ack);
            }
            Message::Stop { ack } => {
                self.handle_stop();
                self.pending_acks.push(ack);
            }
            Message::SelectDevice { id, ack } => {
                self.handle_select_device(id);
                self.pending_acks.push(ack);
            }
            Message::SetVisible { visible, ack } => {
                self.handle_set_visible(visible);
                self.pending_acks.push(ack);
            }
            Message::RefreshDevices { ack } => {
                self.refresh_requested = true;
                self.pending_acks.push(ack);
            }
            Message::Shutdown { ack } => {
                self.handle_shutdown();
                self.pending_acks.push(ack);
            }
            message @ Message::SetTorch { .. } => return Some(message),
        }
        None
    }

    /// Absorb everything waiting in the inbox without blocking
    pub(crate) fn drain_inbox(&mut self) {
        loop {
            match self.inbox.try_recv() {
                Ok(message) => {
                    if let Some(deferred) = self.absorb(message) {
                        self.deferred.push_back(deferred);
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.handle_handles_dropped();
                    break;
                }
            }
        }
    }

    /// Whether a transition towards `target` is still wanted
    ///
    /// Called after every suspension point of a transition.
    pub(crate) fn still_wanted(&mut self, target: &Option<String>) -> bool {
        self.drain_inbox();
        let wanted = self.wants_capture() && self.selected == *target;
        if !wanted {
            debug!(target = ?target, selected = ?self.selected, "Transition superseded");
        }
        wanted
    }

    /// Drive the actual state towards the desired state, then settle acks
    pub(crate) async fn reconcile(&mut self) {
        loop {
            self.drain_inbox();

            if self.refresh_requested {
                self.refresh_requested = false;
                self.handle_refresh_devices().await;
                continue;
            }

            let wants = self.wants_capture();
            let on_target = match (&self.active, &self.selected) {
                (Some(active), Some(selected)) => &active.device.id == selected,
                (Some(_), None) => true,
                (None, _) => false,
            };

            match (self.active.is_some(), wants) {
                (true, true) if on_target => break,
                (true, _) => self.release_active().await,
                (false, true) => self.start_capture().await,
                (false, false) => {
                    self.set_state(CameraState::Idle);
                    break;
                }
            }
        }

        self.publish();
        let snapshot = self.snapshot();
        for ack in self.pending_acks.drain(..) {
            let _ = ack.send(snapshot.clone());
        }
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend abstraction
//!
//! The platform (browser media APIs, a native capture stack, or the virtual
//! camera used in tests) is reached only through the traits in this module.
//! The leaf components built on top of them each own one step of the capture
//! lifecycle.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  CameraController   │  ← app: lifecycle state machine
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │ PermissionGate  DeviceEnumerator  StreamAcquirer          │
//! │ StreamBinder    StreamReleaser    TorchController         │
//! └──────────┬───────────────────────────────────────────────┘
//!            │
//!            ▼
//! ┌─────────────────────────────────────────┐
//! │ MediaDevices / MediaStream / MediaTrack │  ← platform traits
//! │ VideoSink                               │
//! └─────────────────────────────────────────┘
//! ```

pub mod acquire;
pub mod binder;
pub mod enumeration;
pub mod permission;
pub mod release;
pub mod torch;
pub mod types;

pub use acquire::StreamAcquirer;
pub use binder::{BindTiming, StreamBinder};
pub use enumeration::{DeviceEnumerator, FacingKeywords};
pub use permission::PermissionGate;
pub use release::StreamReleaser;
pub use torch::{TorchController, TorchOutcome};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Entry point to the platform's media devices
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Query the capture permission without prompting
    ///
    /// Returns `None` on platforms that have no queryable permission API.
    async fn query_permission(&self) -> Option<PermissionState>;

    /// List every media device, in platform order
    async fn enumerate_devices(&self) -> BackendResult<Vec<DeviceInfo>>;

    /// Open a video stream; may prompt the user for permission
    async fn open(&self, constraints: &StreamConstraints) -> BackendResult<Arc<dyn MediaStream>>;
}

/// A live stream holding one or more hardware tracks
pub trait MediaStream: Send + Sync {
    fn id(&self) -> &str;

    /// Video tracks currently attached to the stream
    fn video_tracks(&self) -> Vec<Arc<dyn MediaTrack>>;

    /// Detach a track from the stream (does not stop it)
    fn remove_track(&self, track_id: &str);
}

/// A single video channel; stopping it releases the hardware
#[async_trait]
pub trait MediaTrack: Send + Sync {
    fn id(&self) -> &str;

    fn ready_state(&self) -> TrackState;

    /// Stop the track synchronously
    fn stop(&self);

    fn capabilities(&self) -> TrackCapabilities;

    fn settings(&self) -> TrackSettings;

    /// Apply the torch constraint
    async fn apply_torch(&self, on: bool) -> BackendResult<()>;
}

/// Rendering target a stream is attached to
///
/// Every method may fail with [`BackendError::SinkDetached`] once the sink
/// itself has been torn down (the owning view went away).
#[async_trait]
pub trait VideoSink: Send + Sync {
    /// Set the stream as the sink's source
    fn attach(&self, stream: Arc<dyn MediaStream>) -> BackendResult<()>;

    /// Wait for the "can play" signal after attaching
    async fn wait_can_play(&self) -> BackendResult<()>;

    /// Start playback
    async fn play(&self) -> BackendResult<()>;

    /// Whether enough data is buffered to render continuously
    fn has_enough_data(&self) -> bool;

    /// Horizontal mirroring of the rendered output
    fn set_mirrored(&self, mirrored: bool);

    /// Whether a source is currently attached
    fn is_attached(&self) -> bool;

    /// Clear and reset the sink's source
    fn detach(&self) -> BackendResult<()>;

    /// Wait for the sink to acknowledge teardown
    ///
    /// Platforms that tear down synchronously keep the default.
    async fn wait_detached(&self) -> BackendResult<()> {
        Ok(())
    }

    /// Grab the frame currently displayed, if any
    fn current_frame(&self) -> Option<CameraFrame>;
}

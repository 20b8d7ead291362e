// SPDX-License-Identifier: GPL-3.0-only

//! Binding a stream to the video sink
//!
//! Each step is a suspension point: attach, wait for "can play", set the
//! mirror transform, start playback, poll until enough data is buffered, then
//! settle before reading the track's capabilities. Some platforms report
//! incomplete capabilities right after playback starts.
//!
//! If the sink goes away at any point the bind aborts with
//! [`CameraError::SinkUnavailable`]; the caller still owns the stream and is
//! expected to release it.

use super::types::{BackendError, CameraDevice, Capabilities, FacingMode};
use super::{MediaStream, VideoSink};
use crate::config::MirrorMode;
use crate::errors::{CameraError, CameraResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Delays used while binding
#[derive(Debug, Clone, Copy)]
pub struct BindTiming {
    /// Interval between buffered-data checks
    pub ready_poll_interval: Duration,
    /// Wait before reading capabilities
    pub settle_delay: Duration,
}

/// Attaches streams to a sink and reads capabilities
pub struct StreamBinder {
    timing: BindTiming,
    mirror: MirrorMode,
}

impl StreamBinder {
    pub fn new(timing: BindTiming, mirror: MirrorMode) -> Self {
        Self { timing, mirror }
    }

    /// Bind `stream` to `sink` and return the capabilities of its first video track
    pub async fn bind(
        &self,
        sink: &dyn VideoSink,
        stream: &Arc<dyn MediaStream>,
        device: &CameraDevice,
    ) -> CameraResult<Capabilities> {
        debug!(device = %device.id, stream = stream.id(), "Attaching stream to sink");
        sink.attach(Arc::clone(stream)).map_err(map_sink_error)?;
        sink.wait_can_play().await.map_err(map_sink_error)?;

        let track = stream.video_tracks().into_iter().next();
        let reported = track.as_ref().and_then(|t| t.settings().facing_mode);
        let mirrored = self.mirror.resolve(reported.or(device.facing));
        sink.set_mirrored(mirrored);
        debug!(device = %device.id, mirrored, "Sink mirroring set");

        sink.play().await.map_err(map_sink_error)?;
        self.wait_buffered(sink).await?;

        tokio::time::sleep(self.timing.settle_delay).await;
        if !sink.is_attached() {
            return Err(CameraError::SinkUnavailable);
        }

        let capabilities = track
            .map(|t| Capabilities::from(&t.capabilities()))
            .unwrap_or_default();
        info!(device = %device.id, torch = capabilities.torch, "Stream bound");
        Ok(capabilities)
    }

    async fn wait_buffered(&self, sink: &dyn VideoSink) -> CameraResult<()> {
        loop {
            tokio::time::sleep(self.timing.ready_poll_interval).await;
            if !sink.is_attached() {
                return Err(CameraError::SinkUnavailable);
            }
            if sink.has_enough_data() {
                return Ok(());
            }
            debug!("Sink not ready yet, polling again");
        }
    }
}

impl MirrorMode {
    /// Whether the sink should be mirrored for a camera facing `facing`
    pub fn resolve(self, facing: Option<FacingMode>) -> bool {
        match self {
            MirrorMode::Always => true,
            MirrorMode::Never => false,
            MirrorMode::Auto => facing == Some(FacingMode::Front),
        }
    }
}

fn map_sink_error(err: BackendError) -> CameraError {
    match err {
        BackendError::SinkDetached => CameraError::SinkUnavailable,
        other => CameraError::Playback(other.to_string()),
    }
}

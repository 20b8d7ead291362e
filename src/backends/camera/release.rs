// SPDX-License-Identifier: GPL-3.0-only

//! Stream teardown
//!
//! Release never fails outward: every step is attempted even when an earlier
//! one failed, and failures are only logged. Calling it on an already released
//! stream or an empty sink is a no-op.

use super::{MediaStream, VideoSink};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Tears down a stream and detaches it from the sink
pub struct StreamReleaser {
    detach_ack_timeout: Duration,
}

impl StreamReleaser {
    pub fn new(detach_ack_timeout: Duration) -> Self {
        Self { detach_ack_timeout }
    }

    /// Release `stream` (if any) and reset `sink`
    ///
    /// `torch_on` forces the torch off first so the LED does not stay lit on
    /// platforms that keep it on after the track stops.
    pub async fn release(
        &self,
        sink: &dyn VideoSink,
        stream: Option<&Arc<dyn MediaStream>>,
        torch_on: bool,
    ) {
        if let Some(stream) = stream {
            let tracks = stream.video_tracks();

            if torch_on && let Some(track) = tracks.first() {
                if let Err(e) = track.apply_torch(false).await {
                    warn!(stream = stream.id(), error = %e, "Failed to turn torch off during release");
                }
            }

            for track in &tracks {
                stream.remove_track(track.id());
                track.stop();
                debug!(stream = stream.id(), track = track.id(), "Track stopped");
            }

            if !tracks.is_empty() {
                info!(stream = stream.id(), tracks = tracks.len(), "Stream released");
            }
        }

        if sink.is_attached() {
            if let Err(e) = sink.detach() {
                warn!(error = %e, "Failed to detach sink source");
                return;
            }
            match tokio::time::timeout(self.detach_ack_timeout, sink.wait_detached()).await {
                Ok(Ok(())) => debug!("Sink teardown acknowledged"),
                Ok(Err(e)) => warn!(error = %e, "Sink teardown reported an error"),
                Err(_) => warn!(
                    timeout_ms = self.detach_ack_timeout.as_millis() as u64,
                    "Sink teardown acknowledgement timed out"
                ),
            }
        }
    }
}

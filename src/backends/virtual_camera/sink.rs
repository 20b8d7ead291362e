// SPDX-License-Identifier: GPL-3.0-only

//! Virtual video sink

use super::VirtualCamera;
use crate::backends::camera::types::{BackendError, BackendResult, CameraFrame};
use crate::backends::camera::{MediaStream, VideoSink};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

#[derive(Default)]
struct SinkState {
    source: Option<Arc<dyn MediaStream>>,
    destroyed: bool,
    mirrored: bool,
    playing: bool,
    /// Unready answers to give after each attach
    buffering_polls: u32,
    remaining_polls: u32,
    play_error: Option<String>,
    withhold_ack: bool,
    detach_count: u32,
}

/// Headless [`VideoSink`]
///
/// Frames are pulled from the attached stream when the sink was created with
/// [`VirtualSink::for_camera`]; a detached sink renders nothing.
pub struct VirtualSink {
    camera: Option<Arc<VirtualCamera>>,
    state: Mutex<SinkState>,
}

impl VirtualSink {
    /// A sink that renders nothing
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            camera: None,
            state: Mutex::new(SinkState::default()),
        })
    }

    /// A sink that renders the frames of `camera`'s streams
    pub fn for_camera(camera: &Arc<VirtualCamera>) -> Arc<Self> {
        Arc::new(Self {
            camera: Some(Arc::clone(camera)),
            state: Mutex::new(SinkState::default()),
        })
    }

    /// Tear the sink down, as when the owning view goes away
    pub fn destroy(&self) {
        let mut state = self.state.lock();
        state.destroyed = true;
        state.source = None;
        state.playing = false;
    }

    pub fn is_mirrored(&self) -> bool {
        self.state.lock().mirrored
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    /// Report "not enough data" for the first `polls` checks after attaching
    pub fn set_buffering_polls(&self, polls: u32) {
        let mut state = self.state.lock();
        state.buffering_polls = polls;
        state.remaining_polls = polls;
    }

    pub fn fail_play(&self, reason: Option<String>) {
        self.state.lock().play_error = reason;
    }

    /// Never acknowledge teardown
    pub fn withhold_detach_ack(&self, withhold: bool) {
        self.state.lock().withhold_ack = withhold;
    }

    pub fn detach_count(&self) -> u32 {
        self.state.lock().detach_count
    }

    /// Id of the attached stream
    pub fn source_id(&self) -> Option<String> {
        self.state.lock().source.as_ref().map(|s| s.id().to_string())
    }
}

#[async_trait]
impl VideoSink for VirtualSink {
    fn attach(&self, stream: Arc<dyn MediaStream>) -> BackendResult<()> {
        let mut state = self.state.lock();
        if state.destroyed {
            return Err(BackendError::SinkDetached);
        }
        debug!(stream = stream.id(), "Virtual sink source attached");
        state.source = Some(stream);
        state.playing = false;
        state.remaining_polls = state.buffering_polls;
        Ok(())
    }

    async fn wait_can_play(&self) -> BackendResult<()> {
        let state = self.state.lock();
        if state.destroyed {
            return Err(BackendError::SinkDetached);
        }
        if state.source.is_none() {
            return Err(BackendError::Playback("no source attached".into()));
        }
        Ok(())
    }

    async fn play(&self) -> BackendResult<()> {
        let mut state = self.state.lock();
        if state.destroyed {
            return Err(BackendError::SinkDetached);
        }
        if let Some(reason) = state.play_error.clone() {
            return Err(BackendError::Playback(reason));
        }
        state.playing = true;
        Ok(())
    }

    fn has_enough_data(&self) -> bool {
        let mut state = self.state.lock();
        if state.remaining_polls > 0 {
            state.remaining_polls -= 1;
            return false;
        }
        state.playing && state.source.is_some()
    }

    fn set_mirrored(&self, mirrored: bool) {
        self.state.lock().mirrored = mirrored;
    }

    fn is_attached(&self) -> bool {
        let state = self.state.lock();
        !state.destroyed && state.source.is_some()
    }

    fn detach(&self) -> BackendResult<()> {
        let mut state = self.state.lock();
        if state.destroyed {
            return Err(BackendError::SinkDetached);
        }
        state.source = None;
        state.playing = false;
        state.detach_count += 1;
        debug!("Virtual sink source detached");
        Ok(())
    }

    async fn wait_detached(&self) -> BackendResult<()> {
        let withhold = self.state.lock().withhold_ack;
        if withhold {
            futures::future::pending::<()>().await;
        }
        Ok(())
    }

    fn current_frame(&self) -> Option<CameraFrame> {
        let stream_id = {
            let state = self.state.lock();
            if !state.playing {
                return None;
            }
            state.source.as_ref()?.id().to_string()
        };
        self.camera.as_ref()?.frame_for_stream(&stream_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::MediaDevices;
    use crate::backends::camera::types::StreamConstraints;
    use crate::backends::virtual_camera::VirtualDevice;

    #[tokio::test]
    async fn test_frames_follow_attached_stream() {
        let frame = CameraFrame::from_rgba(1, 1, vec![255, 0, 0, 255]);
        let camera = VirtualCamera::new(vec![VirtualDevice::new("a", "Camera A").with_frame(frame)]);
        let sink = VirtualSink::for_camera(&camera);
        assert!(sink.current_frame().is_none());

        let stream = camera.open(&StreamConstraints::for_device("a")).await.unwrap();
        sink.attach(stream).unwrap();
        assert!(sink.current_frame().is_none(), "not playing yet");

        sink.play().await.unwrap();
        let grabbed = sink.current_frame().unwrap();
        assert_eq!((grabbed.width, grabbed.height), (1, 1));

        sink.detach().unwrap();
        assert!(sink.current_frame().is_none());
    }

    #[tokio::test]
    async fn test_destroyed_sink_rejects_attach() {
        let camera = VirtualCamera::new(vec![VirtualDevice::new("a", "Camera A")]);
        let sink = VirtualSink::new();
        sink.destroy();
        let stream = camera.open(&StreamConstraints::for_device("a")).await.unwrap();
        assert_eq!(sink.attach(stream), Err(BackendError::SinkDetached));
    }
}

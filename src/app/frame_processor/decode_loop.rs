// SPDX-License-Identifier: GPL-3.0-only

//! Fixed cadence decode polling
//!
//! The loop owns no task of its own. The controller waits on [`DecodeLoop::deadline`]
//! in its main select and calls [`DecodeLoop::poll`] when it fires, so a
//! disarmed loop simply has no deadline and can never fire after teardown.

use super::tasks::Detector;
use crate::backends::camera::VideoSink;
use crate::errors::CameraError;
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

/// Result of one poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Scanned(String),
    Failed(CameraError),
    /// No frame yet, or nothing decoded
    Nothing,
}

#[derive(Debug)]
pub struct DecodeLoop {
    delay: Duration,
    deadline: Option<Instant>,
}

impl DecodeLoop {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Start polling; the first poll is due immediately
    pub fn arm(&mut self) {
        self.deadline = Some(Instant::now());
    }

    /// Stop polling; clears any pending deadline
    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// When the next poll is due, if armed
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Decode the sink's current frame and schedule the next poll
    ///
    /// Failures never stop the loop. Does nothing when disarmed. Dropping the
    /// returned future before it completes leaves the deadline unchanged.
    pub async fn poll(&mut self, sink: &dyn VideoSink, detector: &dyn Detector) -> PollOutcome {
        if !self.is_armed() {
            return PollOutcome::Nothing;
        }

        let outcome = match sink.current_frame() {
            None => {
                trace!("No frame available for decoding");
                PollOutcome::Nothing
            }
            Some(frame) => match detector.detect(&frame).await {
                Ok(Some(code)) if !code.is_empty() => PollOutcome::Scanned(code),
                Ok(_) => PollOutcome::Nothing,
                Err(e @ CameraError::DecodeTransientFailure(_)) => PollOutcome::Failed(e),
                Err(other) => {
                    PollOutcome::Failed(CameraError::DecodeTransientFailure(other.to_string()))
                }
            },
        };

        self.deadline = Some(Instant::now() + self.delay);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::types::{CameraFrame, StreamConstraints};
    use crate::backends::camera::MediaDevices;
    use crate::backends::virtual_camera::{VirtualCamera, VirtualDevice, VirtualSink};
    use crate::errors::CameraResult;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Scripted(Mutex<Vec<CameraResult<Option<String>>>>);

    #[async_trait]
    impl Detector for Scripted {
        async fn detect(&self, _frame: &CameraFrame) -> CameraResult<Option<String>> {
            self.0.lock().unwrap().pop().unwrap_or(Ok(None))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_keeps_going_after_failure() {
        let camera = VirtualCamera::new(vec![VirtualDevice::new("a", "Back Camera")]);
        let sink = VirtualSink::for_camera(&camera);
        let stream = camera.open(&StreamConstraints::for_device("a")).await.unwrap();
        sink.attach(stream).unwrap();
        sink.play().await.unwrap();

        // Popped from the back
        let detector = Scripted(Mutex::new(vec![
            Ok(Some("ABC123".to_string())),
            Err(CameraError::DecodeTransientFailure("blur".into())),
        ]));

        let mut decode = DecodeLoop::new(Duration::from_millis(800));
        decode.arm();
        assert_eq!(decode.deadline(), Some(Instant::now()));

        let first = decode.poll(sink.as_ref(), &detector).await;
        assert!(matches!(first, PollOutcome::Failed(_)));
        assert_eq!(decode.deadline(), Some(Instant::now() + Duration::from_millis(800)));

        let second = decode.poll(sink.as_ref(), &detector).await;
        assert_eq!(second, PollOutcome::Scanned("ABC123".to_string()));
        assert!(decode.is_armed());
    }

    struct Stalled;

    #[async_trait]
    impl Detector for Stalled {
        async fn detect(&self, _frame: &CameraFrame) -> CameraResult<Option<String>> {
            futures::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_poll_stays_due() {
        let camera = VirtualCamera::new(vec![VirtualDevice::new("a", "Back Camera")]);
        let sink = VirtualSink::for_camera(&camera);
        let stream = camera.open(&StreamConstraints::for_device("a")).await.unwrap();
        sink.attach(stream).unwrap();
        sink.play().await.unwrap();

        let mut decode = DecodeLoop::new(Duration::from_millis(800));
        decode.arm();
        let due = decode.deadline();

        let abandoned =
            tokio::time::timeout(Duration::from_secs(5), decode.poll(sink.as_ref(), &Stalled)).await;
        assert!(abandoned.is_err());
        assert_eq!(decode.deadline(), due);
    }

    #[tokio::test]
    async fn test_disarmed_loop_does_not_poll() {
        let sink = VirtualSink::new();
        let detector = Scripted(Mutex::new(vec![Ok(Some("X".to_string()))]));
        let mut decode = DecodeLoop::new(Duration::from_millis(800));

        decode.arm();
        decode.disarm();
        assert_eq!(decode.poll(sink.as_ref(), &detector).await, PollOutcome::Nothing);
        assert_eq!(decode.deadline(), None);
        assert_eq!(detector.0.lock().unwrap().len(), 1);
    }
}

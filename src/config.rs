// SPDX-License-Identifier: GPL-3.0-only

use crate::backends::camera::{BindTiming, FacingKeywords, FacingMode};
use crate::constants::{storage, timing};
use crate::errors::{CameraError, CameraResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Horizontal mirroring of the sink
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MirrorMode {
    /// Mirror front-facing cameras only (selfie view)
    #[default]
    Auto,
    /// Always mirror
    Always,
    /// Never mirror
    Never,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Delay between decode polls while displaying
    pub decode_delay_ms: u64,
    /// Interval between buffered-data checks while binding
    pub ready_poll_interval_ms: u64,
    /// Wait after playback starts before reading capabilities
    pub settle_delay_ms: u64,
    /// Upper bound on waiting for the sink's teardown acknowledgement
    pub detach_ack_timeout_ms: u64,
    /// Optional upper bound on binding a stream (none by default)
    pub bind_timeout_ms: Option<u64>,
    /// Start capturing as soon as the controller is mounted
    pub start_on_mount: bool,
    /// Release the camera while the view is hidden
    pub auto_pause_when_hidden: bool,
    /// Read and write the last used device id
    pub remember_last_device: bool,
    /// Only offer cameras facing this way
    pub facing: Option<FacingMode>,
    /// Sink mirroring policy
    pub mirror: MirrorMode,
    /// Label keywords for the facing heuristic
    pub facing_keywords: FacingKeywords,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            decode_delay_ms: timing::DECODE_DELAY.as_millis() as u64,
            ready_poll_interval_ms: timing::READY_POLL_INTERVAL.as_millis() as u64,
            settle_delay_ms: timing::SETTLE_DELAY.as_millis() as u64,
            detach_ack_timeout_ms: timing::DETACH_ACK_TIMEOUT.as_millis() as u64,
            bind_timeout_ms: None,
            start_on_mount: true,
            auto_pause_when_hidden: true,
            remember_last_device: true,
            facing: None,
            mirror: MirrorMode::Auto,
            facing_keywords: FacingKeywords::default(),
        }
    }
}

impl Config {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(storage::APP_DIR).join(storage::CONFIG_FILE))
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> CameraResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        debug!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    /// Load from the default location, falling back to defaults
    ///
    /// A missing file is not an error; an unreadable or invalid one is logged
    /// and ignored.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Ignoring invalid config");
            Self::default()
        })
    }

    /// Reject values the controller cannot run with
    pub fn validate(&self) -> CameraResult<()> {
        if self.decode_delay_ms == 0 {
            return Err(CameraError::Config("decode_delay_ms must be positive".into()));
        }
        if self.ready_poll_interval_ms == 0 {
            return Err(CameraError::Config(
                "ready_poll_interval_ms must be positive".into(),
            ));
        }
        if self.bind_timeout_ms == Some(0) {
            return Err(CameraError::Config("bind_timeout_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn decode_delay(&self) -> Duration {
        Duration::from_millis(self.decode_delay_ms)
    }

    pub fn detach_ack_timeout(&self) -> Duration {
        Duration::from_millis(self.detach_ack_timeout_ms)
    }

    pub fn bind_timeout(&self) -> Option<Duration> {
        self.bind_timeout_ms.map(Duration::from_millis)
    }

    pub fn bind_timing(&self) -> BindTiming {
        BindTiming {
            ready_poll_interval: Duration::from_millis(self.ready_poll_interval_ms),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
        }
    }
}

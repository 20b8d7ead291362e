// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Timing defaults for the capture lifecycle
pub mod timing {
    use super::Duration;

    /// Delay between decode polls while displaying
    pub const DECODE_DELAY: Duration = Duration::from_millis(800);

    /// Interval at which the sink is checked for enough buffered data
    pub const READY_POLL_INTERVAL: Duration = Duration::from_millis(750);

    /// Wait after playback starts before trusting reported capabilities
    pub const SETTLE_DELAY: Duration = Duration::from_millis(500);

    /// Upper bound on waiting for the sink's teardown acknowledgement
    pub const DETACH_ACK_TIMEOUT: Duration = Duration::from_millis(1000);
}

/// Persistence keys
pub mod storage {
    /// Key under which the last used device id is stored
    pub const LAST_DEVICE_KEY: &str = "last-device-id";

    /// Application directory name under the user config/data dirs
    pub const APP_DIR: &str = "scan-camera";

    /// Config file name
    pub const CONFIG_FILE: &str = "config.json";

    /// State file name (device preference)
    pub const STATE_FILE: &str = "state.json";
}

/// Default label keywords for the facing heuristic
///
/// Matched case-insensitively as substrings. Locale coverage is best-effort;
/// `Config::facing_keywords` replaces these lists entirely.
pub mod facing {
    /// Keywords suggesting a user-facing camera
    pub const FRONT_KEYWORDS: &[&str] = &[
        "front", "user", "face", "frontal", "frontale", "avant", "vorder", "anteriore",
        "前", "前置", "フロント", "전면", "фронт",
    ];

    /// Keywords suggesting an environment-facing camera
    pub const BACK_KEYWORDS: &[&str] = &[
        "back", "rear", "environment", "trasera", "traseira", "arrière", "rück", "posteriore",
        "后", "後", "后置", "背面", "リア", "후면", "задн", "тыл",
    ];
}

/// Supported still image formats
pub mod file_formats {
    /// Supported image file extensions
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

    /// Check if a file extension is a supported image format
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }
}

/// QR detector tuning
pub mod detector {
    /// Frames larger than this (either dimension) are downscaled before detection
    pub const MAX_DIMENSION: u32 = 640;
}


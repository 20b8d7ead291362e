// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use scan_camera::backends::camera::FacingMode;
use scan_camera::{CameraError, Config, MirrorMode};
use std::time::Duration;

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.decode_delay(), Duration::from_millis(800));
    assert_eq!(config.bind_timing().ready_poll_interval, Duration::from_millis(750));
    assert_eq!(config.bind_timing().settle_delay, Duration::from_millis(500));
    assert_eq!(config.bind_timeout(), None, "No bind timeout by default");
    assert!(config.start_on_mount);
    assert!(config.auto_pause_when_hidden);
    assert!(config.remember_last_device);
    assert_eq!(config.mirror, MirrorMode::Auto);
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_file_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{ "decode_delay_ms": 250, "facing": "back", "mirror": "never" }"#,
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.decode_delay(), Duration::from_millis(250));
    assert_eq!(config.facing, Some(FacingMode::Back));
    assert_eq!(config.mirror, MirrorMode::Never);
    assert_eq!(config.settle_delay_ms, 500, "Unset fields should keep defaults");
}

#[test]
fn test_custom_facing_keywords() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{ "facing_keywords": { "front": ["selfie"], "back": ["world"] } }"#,
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(
        config.facing_keywords.classify("World Cam"),
        Some(FacingMode::Back)
    );
    assert_eq!(config.facing_keywords.classify("Rear Camera"), None);
}

#[test]
fn test_invalid_values_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    std::fs::write(&path, r#"{ "decode_delay_ms": 0 }"#).unwrap();
    assert!(matches!(Config::load(&path), Err(CameraError::Config(_))));

    std::fs::write(&path, r#"{ "bind_timeout_ms": 0 }"#).unwrap();
    assert!(matches!(Config::load(&path), Err(CameraError::Config(_))));

    std::fs::write(&path, "not json").unwrap();
    assert!(matches!(Config::load(&path), Err(CameraError::Config(_))));
}

#[test]
fn test_missing_file() {
    let result = Config::load(std::path::Path::new("/nonexistent/scan-camera.json"));
    assert!(matches!(result, Err(CameraError::Config(_))));
}

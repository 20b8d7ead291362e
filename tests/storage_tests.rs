// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for last device persistence

use scan_camera::storage::{DeviceStore, JsonFileStore, MemoryStore};

#[test]
fn test_json_store_roundtrip_and_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("state.json");
    let store = JsonFileStore::new(&path);

    assert_eq!(store.last_device_id().unwrap(), None, "Missing file means no preference");

    store.set_last_device_id("cam-b").unwrap();
    assert_eq!(store.last_device_id().unwrap().as_deref(), Some("cam-b"));

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["last-device-id"], "cam-b");
}

#[test]
fn test_json_store_keeps_other_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, r#"{ "theme": "dark" }"#).unwrap();

    let store = JsonFileStore::new(&path);
    store.set_last_device_id("cam-a").unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["theme"], "dark");
    assert_eq!(raw["last-device-id"], "cam-a");
}

#[test]
fn test_json_store_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "{{{").unwrap();

    let store = JsonFileStore::new(&path);
    assert!(store.last_device_id().is_err());
    // Writing recovers the file
    store.set_last_device_id("cam-a").unwrap();
    assert_eq!(store.last_device_id().unwrap().as_deref(), Some("cam-a"));
}

#[test]
fn test_memory_store() {
    let store = MemoryStore::new();
    assert_eq!(store.last_device_id().unwrap(), None);
    store.set_last_device_id("x").unwrap();
    assert_eq!(store.last_device_id().unwrap().as_deref(), Some("x"));
}

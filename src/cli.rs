// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! - Listing the cameras of an image source directory
//! - Decoding a single image
//! - Running the controller against a virtual camera for a fixed duration

use chrono::Local;
use scan_camera::backends::camera::{DeviceEnumerator, MediaDevices, VideoSink};
use scan_camera::backends::virtual_camera::{VirtualCamera, VirtualSink, load_image_dir};
use scan_camera::storage::{DeviceStore, JsonFileStore, MemoryStore};
use scan_camera::{
    CameraController, Config, ControllerEvent, ControllerParts, QrDetector, scan_image_file,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn open_source(source: &Path) -> Result<Arc<VirtualCamera>, Box<dyn std::error::Error>> {
    let devices = load_image_dir(source)?;
    Ok(VirtualCamera::new(devices))
}

/// List the cameras of an image source directory
pub fn list_cameras(source: &Path, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let camera = open_source(source)?;
    let rt = tokio::runtime::Runtime::new()?;

    let devices: Arc<dyn MediaDevices> = camera;
    let mut enumerator = DeviceEnumerator::new(devices, config.facing_keywords.clone());
    let cameras = rt.block_on(enumerator.list(config.facing))?;

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        let facing = camera
            .facing
            .map(|f| f.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        println!("  [{}] {}", index, camera.label);
        println!("      Id: {}", camera.id);
        println!("      Facing: {}", facing);
        println!();
    }

    Ok(())
}

/// Decode a single image file
pub fn scan_image(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    match rt.block_on(scan_image_file(file, &QrDetector::new()))? {
        Some(code) => println!("{}", code),
        None => println!("No code found in {}", file.display()),
    }
    Ok(())
}

/// Scan with the controller for `duration` seconds
pub fn scan(
    source: &Path,
    device: Option<String>,
    duration: u64,
    torch: bool,
    mut config: Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let camera = open_source(source)?;
    let sink: Arc<dyn VideoSink> = VirtualSink::for_camera(&camera);
    let store: Arc<dyn DeviceStore> = match JsonFileStore::in_data_dir() {
        Some(store) => Arc::new(store),
        None => Arc::new(MemoryStore::new()),
    };
    // The CLI starts explicitly so the requested device wins over the stored one
    config.start_on_mount = false;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let parts = ControllerParts {
            devices: camera,
            sink,
            store,
            detector: Arc::new(QrDetector::new()),
        };
        let (controller, mut events) = CameraController::spawn(parts, config);

        let snapshot = controller.start(device).await?;
        match snapshot.selected_device() {
            Some(selected) => println!("Using camera: {} ({})", selected.label, selected.id),
            None => println!("No camera started"),
        }

        if torch && controller.snapshot().capabilities.is_some_and(|c| c.torch) {
            let on = controller.set_torch(true).await?;
            println!("Torch: {}", if on { "on" } else { "off" });
        }

        println!("Scanning for {}s...", duration);
        let deadline = tokio::time::sleep(Duration::from_secs(duration));
        tokio::pin!(deadline);
        let mut last: Option<String> = None;
        loop {
            tokio::select! {
                _ = &mut deadline => break,
                event = events.recv() => match event {
                    Some(ControllerEvent::Scanned(code)) => {
                        // Continuous scanning reports the same code every poll
                        if last.as_deref() != Some(code.as_str()) {
                            println!("[{}] {}", Local::now().format("%H:%M:%S"), code);
                            last = Some(code);
                        }
                    }
                    Some(ControllerEvent::Error(e)) => {
                        eprintln!("Error: {}", e);
                        // Start failures are not retried; nothing more will arrive
                        if e.is_start_failure() {
                            break;
                        }
                    }
                    Some(ControllerEvent::StateChanged(_)) => {}
                    None => break,
                },
            }
        }

        controller.shutdown().await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

// SPDX-License-Identifier: GPL-3.0-only

//! Scan Camera - camera lifecycle control for real-time barcode and QR scanning
//!
//! This library drives a capture device for continuous code scanning: it
//! enumerates cameras, acquires and releases streams, negotiates the torch,
//! and feeds frames to a detector at a fixed cadence, while staying
//! consistent when devices come and go or the owning view goes away.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Camera controller state machine and decode loop
//! - [`backends`]: Platform traits, lifecycle leaf components, virtual camera
//! - [`config`]: User configuration handling
//! - [`storage`]: Last used device persistence
//! - [`platform`]: Process-wide initialization
//!
//! # Example
//!
//! ```ignore
//! scan_camera::platform::ensure_initialized();
//! let (controller, mut events) = CameraController::spawn(parts, Config::default());
//! while let Some(event) = events.recv().await {
//!     if let ControllerEvent::Scanned(code) = event {
//!         println!("{code}");
//!     }
//! }
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod platform;
pub mod storage;

// Re-export commonly used types
pub use app::frame_processor::{Detector, QrDetector, scan_image_file};
pub use app::{CameraController, CameraState, ControllerEvent, ControllerParts, EventReceiver, Snapshot};
pub use config::{Config, MirrorMode};
pub use errors::{CameraError, CameraResult};

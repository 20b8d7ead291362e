// SPDX-License-Identifier: GPL-3.0-only

//! Backend abstraction layer for camera capture
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            Camera Controller (app)           │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │              Backend Layer                   │
//! │  ┌──────────────────┐  ┌─────────────────┐  │
//! │  │      Camera      │  │ Virtual Camera  │  │
//! │  │ traits + leaves  │◀─│ (in-process)    │  │
//! │  └──────────────────┘  └─────────────────┘  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`camera`]: Platform traits and the lifecycle leaf components
//! - [`virtual_camera`]: Scripted platform serving still images

pub mod camera;
pub mod virtual_camera;

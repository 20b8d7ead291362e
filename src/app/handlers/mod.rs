// SPDX-License-Identifier: GPL-3.0-only

//! Message handler modules
//!
//! Handlers are grouped by functional domain; all of them are methods on
//! `ControllerModel` and run on the controller task.

pub mod camera;
pub mod system;
pub mod torch;

// SPDX-License-Identifier: GPL-3.0-only

//! Frame analysis
//!
//! The decode loop samples the sink at a fixed cadence while the controller
//! is displaying and hands each frame to a [`Detector`]. Still images go
//! through the same detector via [`scan_image_file`].

pub mod decode_loop;
pub mod still_image;
pub mod tasks;

pub use decode_loop::{DecodeLoop, PollOutcome};
pub use still_image::scan_image_file;
pub use tasks::{Detector, QrDetector};

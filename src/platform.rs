// SPDX-License-Identifier: GPL-3.0-only

//! Process-wide initialization
//!
//! Call [`ensure_initialized`] once from the composition root (the binary's
//! `main`, or a test harness) before mounting controllers. Controllers never
//! call it themselves. Repeated calls are no-ops.

use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static INITIALIZED: OnceLock<()> = OnceLock::new();

/// Install the tracing subscriber
///
/// Log level comes from `RUST_LOG`, defaulting to `warn`. If another
/// subscriber is already installed it is left in place.
pub fn ensure_initialized() {
    INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    });
}

/// Whether [`ensure_initialized`] already ran
pub fn is_initialized() -> bool {
    INITIALIZED.get().is_some()
}

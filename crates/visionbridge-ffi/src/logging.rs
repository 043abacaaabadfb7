// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Logging backend selection.
//
// Android hosts route `tracing` events through the `log` facade into logcat.
// Everywhere else a `tracing-subscriber` formatter writes to stderr, filtered
// by `RUST_LOG` (default `info`).

use std::sync::Once;

static INIT: Once = Once::new();

/// Tag shown in logcat.
#[cfg(target_os = "android")]
pub(crate) const LOG_TAG: &str = "VisionBridge";

/// Install the logging backend. Later calls are no-ops.
pub(crate) fn init() {
    INIT.call_once(install);
}

#[cfg(target_os = "android")]
fn install() {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Debug)
            .with_tag(LOG_TAG),
    );
    tracing::info!("VisionBridge logging initialised (logcat)");
}

#[cfg(not(target_os = "android"))]
fn install() {
    let result = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
    match result {
        Ok(()) => tracing::info!("VisionBridge logging initialised"),
        // The host process already installed a global subscriber; use it.
        Err(_) => tracing::debug!("Global subscriber already set"),
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Logging setup shared by both binaries. Logs go to stderr so that stdout
// carries nothing but the JSON result.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` overrides `default_directive`.
pub fn init(default_directive: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .init();
}

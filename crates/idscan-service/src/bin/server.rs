// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// idscan-server — HTTP front end.
//
//     idscan-server [config.json]

use std::process::ExitCode;

use idscan_service::{AppState, Scanner, ServerConfig, logging, router};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    logging::init("info");

    let config = match std::env::args_os().nth(1) {
        Some(path) => match ServerConfig::from_json_file(&path) {
            Ok(config) => config,
            Err(err) => {
                error!(error = %err, path = ?path, "Failed to load server configuration");
                return ExitCode::FAILURE;
            }
        },
        None => ServerConfig::default(),
    };

    let state = AppState::from_startup(Scanner::with_tesseract(config.scan.clone()))
        .with_max_upload_bytes(config.max_upload_bytes);
    let app = router(state);

    let listener = match TcpListener::bind(config.bind).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(error = %err, bind = %config.bind, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };

    info!(bind = %config.bind, "idscan server listening");
    if let Err(err) = axum::serve(listener, app).await {
        error!(error = %err, "Server terminated");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// idscan — scan one student ID image and print the result as a JSON line.
//
//     idscan <image-path>
//
// Exit status is 0 whenever a payload was produced for the image, even if
// the payload carries an error. A missing OCR engine exits with 2.

use std::path::PathBuf;
use std::process::ExitCode;

use idscan_core::ScanConfig;
use idscan_service::{Scanner, cli, logging};

fn main() -> ExitCode {
    logging::init("warn");

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let outcome = cli::run(path.as_deref(), || {
        Scanner::with_tesseract(ScanConfig::default())
    });
    println!("{}", outcome.line);
    outcome.exit_code()
}

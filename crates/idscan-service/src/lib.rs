// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// idscan-service — Result assembly and the external entry points.
//
// `Scanner` runs one image through normalization, OCR, and both extractors,
// and is the single place where failures are turned into a well-formed
// result. The CLI and HTTP binaries are thin wrappers around it.

pub mod cli;
pub mod http;
pub mod logging;
pub mod payload;
pub mod scanner;

pub use http::{AppState, ServerConfig, router};
pub use payload::ScanPayload;
pub use scanner::Scanner;

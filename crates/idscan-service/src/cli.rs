// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One-shot CLI behaviour, kept apart from `main` so the exit policy is testable.

use std::path::Path;
use std::process::ExitCode;

use idscan_core::error::Result;
use tracing::error;

use crate::payload::ScanPayload;
use crate::scanner::Scanner;

/// Exit status when the scanner cannot be built (no engine, bad settings).
pub const EXIT_ENGINE_UNAVAILABLE: u8 = 2;

/// The JSON line to print and the process exit status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOutcome {
    pub line: String,
    pub status: u8,
}

impl CliOutcome {
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.status)
    }
}

/// Scan `path` with the scanner produced by `build`.
///
/// `build` is only called when there is a path to scan. Every scan outcome,
/// failed or not, exits 0; only a scanner that cannot be built exits with
/// [`EXIT_ENGINE_UNAVAILABLE`].
pub fn run(path: Option<&Path>, build: impl FnOnce() -> Result<Scanner>) -> CliOutcome {
    let Some(path) = path else {
        return CliOutcome {
            line: ScanPayload::empty().to_json_line(),
            status: 0,
        };
    };

    match build() {
        Ok(scanner) => CliOutcome {
            line: ScanPayload::from(scanner.scan_path(path)).to_json_line(),
            status: 0,
        },
        Err(err) => {
            error!(error = %err, class = ?err.class(), "Cannot start scanner");
            CliOutcome {
                line: ScanPayload::from_error(&err).to_json_line(),
                status: EXIT_ENGINE_UNAVAILABLE,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use idscan_core::ScanError;
    use serde_json::Value;

    use super::*;
    use crate::scanner::testing::{ScriptedEngine, card_png};

    fn parse(line: &str) -> Value {
        serde_json::from_str(line).unwrap()
    }

    #[test]
    fn no_argument_prints_empty_payload() {
        let outcome = run(None, || panic!("scanner must not be built without a path"));
        assert_eq!(outcome.status, 0);
        assert_eq!(outcome.line, r#"{"student_number":"","surname":"","analyzed":""}"#);
    }

    #[test]
    fn unavailable_engine_exits_with_status_two() {
        let outcome = run(Some(Path::new("card.png")), || {
            Err(ScanError::EngineUnavailable("tesseract not found".into()))
        });

        assert_eq!(outcome.status, EXIT_ENGINE_UNAVAILABLE);
        let body = parse(&outcome.line);
        assert_eq!(body["student_number"], "");
        assert_eq!(body["surname"], "");
        assert_eq!(body["analyzed"], "");
        assert!(body["error"].as_str().unwrap().contains("tesseract not found"));
    }

    #[test]
    fn successful_scan_exits_zero() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(&card_png()).unwrap();

        let engine = ScriptedEngine::new("2021-00345-MN-0\n", vec![]);
        let outcome = run(Some(file.path()), || Ok(Scanner::new(Arc::new(engine))));

        assert_eq!(outcome.status, 0);
        let body = parse(&outcome.line);
        assert_eq!(body["student_number"], "2021-00345-MN-0");
        assert!(body.get("error").is_none());
    }

    #[test]
    fn unreadable_image_reports_error_but_exits_zero() {
        let engine = ScriptedEngine::new("", vec![]);
        let outcome = run(Some(Path::new("/nonexistent/card.png")), || {
            Ok(Scanner::new(Arc::new(engine)))
        });

        assert_eq!(outcome.status, 0);
        assert!(parse(&outcome.line)["error"].is_string());
    }
}

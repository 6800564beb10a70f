// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JSON wire format shared by the CLI and the HTTP endpoint.

use idscan_core::{ExtractionResult, ScanError};
use serde::{Deserialize, Serialize};

/// The JSON object emitted for every scan.
///
/// The three data fields are always present; `error` is omitted unless the
/// scan failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanPayload {
    pub student_number: String,
    pub surname: String,
    /// The raw recognised text.
    pub analyzed: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanPayload {
    /// All fields empty, no error. Emitted when there was nothing to scan.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_error(err: &ScanError) -> Self {
        Self {
            error: Some(err.to_string()),
            ..Self::default()
        }
    }

    /// Serialize to a single line of JSON.
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| {
            // Only reachable if serde_json itself misbehaves; keep the
            // contract of always printing a JSON object.
            format!(
                r#"{{"student_number":"","surname":"","analyzed":"","error":{}}}"#,
                serde_json::Value::String(format!("failed to encode result: {err}"))
            )
        })
    }
}

impl From<ExtractionResult> for ScanPayload {
    fn from(result: ExtractionResult) -> Self {
        Self {
            student_number: result.student_number,
            surname: result.surname,
            analyzed: result.raw_text,
            error: result.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    #[test]
    fn success_payload_omits_error() {
        let payload = ScanPayload::from(ExtractionResult::found(
            "2021-00345-MN-0",
            "Delacruz",
            "raw text",
        ));
        let value: Value = serde_json::from_str(&payload.to_json_line()).unwrap();
        assert_eq!(value["student_number"], "2021-00345-MN-0");
        assert_eq!(value["surname"], "Delacruz");
        assert_eq!(value["analyzed"], "raw text");
        assert!(value.get("error").is_none());
    }

    #[test]
    fn error_payload_keeps_every_data_field() {
        let err = ScanError::EngineUnavailable("tesseract missing".into());
        let value: Value = serde_json::from_str(&ScanPayload::from_error(&err).to_json_line()).unwrap();
        assert_eq!(value["student_number"], "");
        assert_eq!(value["surname"], "");
        assert_eq!(value["analyzed"], "");
        assert!(value["error"].as_str().unwrap().contains("tesseract missing"));
    }

    #[test]
    fn json_line_has_no_newlines() {
        let payload = ScanPayload::from(ExtractionResult::found("", "", "line one\nline two\n"));
        assert!(!payload.to_json_line().contains('\n'));
    }

    #[test]
    fn empty_payload_matches_cli_default() {
        assert_eq!(
            ScanPayload::empty().to_json_line(),
            r#"{"student_number":"","surname":"","analyzed":""}"#
        );
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the scanner.
//
// A missed field is never an error: an empty student number or surname is the
// normal outcome for a poor photo. Errors are reserved for the cases below.

use thiserror::Error;

/// Top-level error type for all scanner operations.
#[derive(Debug, Error)]
pub enum ScanError {
    // -- Startup --
    #[error("OCR engine not available: {0}")]
    EngineUnavailable(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    // -- Per request --
    #[error("failed to decode image: {0}")]
    ImageDecode(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("OCR failed: {0}")]
    OcrError(String),

    #[error("internal error: {0}")]
    Internal(String),

    // -- Plumbing --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse grouping of errors, used by the binaries to choose an exit code or
/// HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Deployment problem: the process cannot scan anything until fixed.
    Startup,
    /// Bad input for this one request; other requests are unaffected.
    Request,
    /// A bug or an environment failure mid-scan.
    Internal,
}

impl ScanError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::EngineUnavailable(_) | Self::Config(_) => ErrorClass::Startup,
            Self::ImageDecode(_) | Self::ImageError(_) => ErrorClass::Request,
            Self::OcrError(_) | Self::Internal(_) | Self::Io(_) | Self::Serialization(_) => {
                ErrorClass::Internal
            }
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_engine_is_startup_class() {
        let err = ScanError::EngineUnavailable("tesseract not on PATH".into());
        assert_eq!(err.class(), ErrorClass::Startup);
        assert!(err.to_string().contains("tesseract not on PATH"));
    }

    #[test]
    fn decode_failure_is_request_class() {
        let err = ScanError::ImageDecode("unexpected end of file".into());
        assert_eq!(err.class(), ErrorClass::Request);
    }

    #[test]
    fn io_errors_convert_and_are_internal() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ScanError = io.into();
        assert_eq!(err.class(), ErrorClass::Internal);
    }
}

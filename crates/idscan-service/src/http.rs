// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP front end: `POST /scan` takes a multipart upload in the `file` field
// and answers with the same JSON payload the CLI prints.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use idscan_core::error::{Result, ScanError};
use idscan_core::{ExtractionResult, ScanConfig};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::payload::ScanPayload;
use crate::scanner::Scanner;

/// Multipart field that carries the image.
const FILE_FIELD: &str = "file";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Settings for the HTTP binary. Every key is optional in the JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Upper bound on a request body, in bytes.
    pub max_upload_bytes: usize,
    pub scan: ScanConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            max_upload_bytes: 16 * 1024 * 1024,
            scan: ScanConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        if config.max_upload_bytes == 0 {
            return Err(ScanError::Config("max_upload_bytes must be positive".into()));
        }
        config.scan.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

enum EngineState {
    Ready(Arc<Scanner>),
    /// Startup failed; holds the message served with every 503.
    Unavailable(String),
}

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<EngineState>,
    max_upload_bytes: usize,
}

impl AppState {
    pub fn ready(scanner: Scanner) -> Self {
        Self {
            engine: Arc::new(EngineState::Ready(Arc::new(scanner))),
            max_upload_bytes: ServerConfig::default().max_upload_bytes,
        }
    }

    pub fn unavailable(err: &ScanError) -> Self {
        Self {
            engine: Arc::new(EngineState::Unavailable(err.to_string())),
            max_upload_bytes: ServerConfig::default().max_upload_bytes,
        }
    }

    /// Keep serving even when the scanner could not be built; `/scan` then
    /// answers 503 and `/health` reports `degraded`.
    pub fn from_startup(scanner: Result<Scanner>) -> Self {
        match scanner {
            Ok(scanner) => Self::ready(scanner),
            Err(err) => {
                error!(error = %err, "OCR engine unavailable; serving in degraded mode");
                Self::unavailable(&err)
            }
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.engine, EngineState::Ready(_))
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let limit = state.max_upload_bytes;
    Router::new()
        .route("/scan", post(scan))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct HealthReport {
    status: &'static str,
    /// Engine name when ready, the startup error otherwise.
    engine: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(match &*state.engine {
        EngineState::Ready(scanner) => HealthReport {
            status: "ok",
            engine: scanner.engine_name().to_string(),
            version: scanner.engine_version().map(str::to_string),
        },
        EngineState::Unavailable(reason) => HealthReport {
            status: "degraded",
            engine: reason.clone(),
            version: None,
        },
    })
}

async fn scan(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    async move {
        let data = match read_upload(multipart).await {
            Ok(data) => data,
            Err(rejection) => {
                warn!(reason = %rejection.message, "Upload rejected");
                return rejection.into_response();
            }
        };

        let scanner = match &*state.engine {
            EngineState::Ready(scanner) => Arc::clone(scanner),
            EngineState::Unavailable(reason) => {
                let payload = ScanPayload {
                    error: Some(reason.clone()),
                    ..ScanPayload::empty()
                };
                return (StatusCode::SERVICE_UNAVAILABLE, Json(payload)).into_response();
            }
        };

        info!(bytes = data.len(), "Scanning upload");
        let result = tokio::task::spawn_blocking(move || scanner.scan_bytes(&data))
            .await
            .unwrap_or_else(|err| {
                error!(error = %err, "Scan task did not complete");
                ExtractionResult::failed(ScanError::Internal(err.to_string()).to_string())
            });

        // Per-image failures are reported in the payload, not the status.
        Json(ScanPayload::from(result)).into_response()
    }
    .instrument(info_span!("scan_request", %request_id))
    .await
}

// ---------------------------------------------------------------------------
// Upload parsing
// ---------------------------------------------------------------------------

/// A 4xx answer with a `{"error": ...}` body.
#[derive(Debug)]
struct Rejection {
    status: StatusCode,
    message: String,
}

impl Rejection {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Pull the bytes of the `file` field out of the request.
async fn read_upload(
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> std::result::Result<Vec<u8>, Rejection> {
    // A body that is not multipart cannot carry a file part.
    let Ok(mut multipart) = multipart else {
        return Err(Rejection::bad_request("No file part"));
    };

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(Rejection::bad_request("No file part")),
            Err(err) => {
                return Err(Rejection {
                    status: err.status(),
                    message: err.body_text(),
                });
            }
        };

        // Parts without a filename are plain form values, not files.
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(file_name) = field.file_name() else {
            continue;
        };
        if file_name.is_empty() {
            return Err(Rejection::bad_request("No selected file"));
        }

        return match field.bytes().await {
            Ok(bytes) => Ok(bytes.to_vec()),
            Err(err) => Err(Rejection {
                status: err.status(),
                message: err.body_text(),
            }),
        };
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use idscan_core::RecognizedWord;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::scanner::testing::{ScriptedEngine, card_png};

    const BOUNDARY: &str = "idscan-test-boundary";

    fn ready_state() -> AppState {
        let engine = ScriptedEngine::new(
            "UNIVERSITY\nREYES\n2021-00345-MN-0\n",
            vec![
                RecognizedWord::new("REYES", 100, 42, 92.0),
                RecognizedWord::new("2021-00345-MN-0", 150, 24, 90.0),
            ],
        );
        AppState::ready(Scanner::new(Arc::new(engine)))
    }

    fn part(name: &str, file_name: Option<&str>, data: &[u8]) -> Vec<u8> {
        let disposition = match file_name {
            Some(file_name) => format!(r#"form-data; name="{name}"; filename="{file_name}""#),
            None => format!(r#"form-data; name="{name}""#),
        };
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: {disposition}\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
        body
    }

    fn multipart_request(parts: &[Vec<u8>]) -> Request<Body> {
        let mut body = parts.concat();
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Request::builder()
            .method("POST")
            .uri("/scan")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn upload_is_scanned() {
        let request = multipart_request(&[part("file", Some("card.png"), &card_png())]);
        let (status, body) = send(ready_state(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["student_number"], "2021-00345-MN-0");
        assert_eq!(body["surname"], "Reyes");
        assert_eq!(body["analyzed"], "UNIVERSITY\nREYES\n2021-00345-MN-0\n");
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn other_fields_are_ignored() {
        let request = multipart_request(&[
            part("note", None, b"hello"),
            part("file", Some("card.png"), &card_png()),
        ]);
        let (status, body) = send(ready_state(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["student_number"], "2021-00345-MN-0");
    }

    #[tokio::test]
    async fn missing_file_field_is_bad_request() {
        let request = multipart_request(&[part("photo", Some("card.png"), &card_png())]);
        let (status, body) = send(ready_state(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "No file part" }));
    }

    #[tokio::test]
    async fn empty_filename_is_bad_request() {
        let request = multipart_request(&[part("file", Some(""), b"")]);
        let (status, body) = send(ready_state(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "No selected file" }));
    }

    #[tokio::test]
    async fn non_multipart_body_is_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/scan")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let (status, body) = send(ready_state(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No file part");
    }

    #[tokio::test]
    async fn undecodable_upload_reports_error_in_payload() {
        let request = multipart_request(&[part("file", Some("card.png"), b"not an image")]);
        let (status, body) = send(ready_state(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["student_number"], "");
        assert_eq!(body["surname"], "");
        assert!(body["error"].as_str().unwrap().contains("decode"));
    }

    #[tokio::test]
    async fn degraded_server_answers_503() {
        let state = AppState::unavailable(&ScanError::EngineUnavailable("tesseract not found".into()));
        let request = multipart_request(&[part("file", Some("card.png"), &card_png())]);
        let (status, body) = send(state, request).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["student_number"], "");
        assert!(body["error"].as_str().unwrap().contains("tesseract not found"));
    }

    #[tokio::test]
    async fn health_reports_engine_state() {
        let request = || Request::get("/health").body(Body::empty()).unwrap();

        let (status, body) = send(ready_state(), request()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok", "engine": "scripted" }));

        let degraded = AppState::from_startup(Err(ScanError::EngineUnavailable("missing".into())));
        assert!(!degraded.is_ready());
        let (_, body) = send(degraded, request()).await;
        assert_eq!(body["status"], "degraded");
    }

    #[tokio::test]
    async fn health_includes_engine_version() {
        let mut engine = ScriptedEngine::new("", vec![]);
        engine.version = Some("tesseract 5.3.0".into());
        let state = AppState::ready(Scanner::new(Arc::new(engine)));

        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (_, body) = send(state, request).await;
        assert_eq!(
            body,
            json!({ "status": "ok", "engine": "scripted", "version": "tesseract 5.3.0" })
        );
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let request = Request::get("/upload").body(Body::empty()).unwrap();
        let (status, _) = send(ready_state(), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected() {
        let state = ready_state().with_max_upload_bytes(1024);
        let request = multipart_request(&[part("file", Some("card.png"), &vec![0u8; 4096])]);
        let response = router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn server_config_defaults_and_overrides() {
        let config = ServerConfig::default();
        assert_eq!(config.bind.to_string(), "127.0.0.1:5000");

        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            br#"{"bind":"0.0.0.0:8080","scan":{"min_confidence":70.0}}"#,
        )
        .unwrap();
        let loaded = ServerConfig::from_json_file(file.path()).unwrap();
        assert_eq!(loaded.bind.port(), 8080);
        assert_eq!(loaded.scan.min_confidence, 70.0);
        assert_eq!(loaded.max_upload_bytes, config.max_upload_bytes);
    }

    #[test]
    fn server_config_rejects_zero_upload_limit() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, br#"{"max_upload_bytes":0}"#).unwrap();
        assert!(matches!(
            ServerConfig::from_json_file(file.path()),
            Err(ScanError::Config(_))
        ));
    }
}

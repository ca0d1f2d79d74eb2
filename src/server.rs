//! HTTP delivery of the analysis: `POST /analyze` with a multipart `file`.
//!
//! Every request parses and analyzes its own upload; the router carries no
//! application state between requests.

use std::any::Any;

use anyhow::{Context, Result};
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use bytes::Bytes;
use serde_json::json;
use thiserror::Error;
use tokio::task::JoinError;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::analyzers::analyzer::analyze;
use crate::analyzers::types::AnalysisResult;
use crate::config::ServerConfig;
use crate::error::AnalysisError;
use crate::output::AnalysisPayload;
use crate::parser::{DataFormat, parse_dataset};

/// Name of the multipart field holding the uploaded file.
pub const FILE_FIELD: &str = "file";

/// Request failures, each mapped to a status code and a `{"error": ...}` body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No file part in the request.")]
    MissingFile,

    #[error("No file selected.")]
    EmptyFilename,

    #[error("Invalid file type. Please upload a .csv or .xlsx file.")]
    UnsupportedFileType,

    #[error("{}", .0.body_text())]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// The loader or analyzer failed without a typed error, e.g. a panic
    /// inside the spreadsheet decoder on a corrupted workbook.
    #[error("{0}")]
    Unexpected(String),
}

impl From<JoinError> for ApiError {
    fn from(e: JoinError) -> Self {
        if e.is_panic() {
            ApiError::Unexpected(panic_message(e.into_panic()))
        } else {
            ApiError::Unexpected(e.to_string())
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(msg) => *msg,
        Err(payload) => payload
            .downcast_ref::<&str>()
            .map(|msg| msg.to_string())
            .unwrap_or_else(|| "file could not be processed".to_string()),
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFile
            | ApiError::EmptyFilename
            | ApiError::UnsupportedFileType
            | ApiError::Analysis(AnalysisError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Multipart(e) => e.status(),
            ApiError::Analysis(AnalysisError::Load(_)) | ApiError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Analysis(AnalysisError::Load(e)) => format!("An error occurred: {e}"),
            ApiError::Unexpected(msg) => format!("An error occurred: {msg}"),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Error processing file");
        } else {
            warn!(error = %self, status = status.as_u16(), "Rejected upload");
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

/// The analysis HTTP server. Construct it explicitly and call [`run`](Self::run).
pub struct AnalysisServer {
    config: ServerConfig,
}

impl AnalysisServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Builds the router: the analyze route, upload size limit and permissive CORS.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/analyze", post(analyze_upload))
            .layer(DefaultBodyLimit::max(self.config.max_upload_bytes))
            .layer(CorsLayer::permissive())
    }

    /// Binds the configured address and serves until Ctrl+C.
    pub async fn run(self) -> Result<()> {
        let addr = self.config.bind_addr();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;

        info!(
            addr = %addr,
            max_upload_bytes = self.config.max_upload_bytes,
            "Analysis server listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Analysis server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
    }
}

struct Upload {
    file_name: String,
    data: Bytes,
}

#[tracing::instrument(skip_all)]
async fn analyze_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisPayload>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        warn!(rejection = %rejection, "Request is not a multipart upload");
        ApiError::MissingFile
    })?;

    let upload = read_file_field(&mut multipart).await?;
    let format =
        DataFormat::from_file_name(&upload.file_name).ok_or(ApiError::UnsupportedFileType)?;

    let bytes = upload.data.len();
    let result = analyze_blocking(upload.data, format).await??;

    info!(
        file_name = %upload.file_name,
        bytes,
        records = result.records.len(),
        "Upload analyzed"
    );

    Ok(Json(AnalysisPayload::from(&result)))
}

/// Decodes and analyzes off the async runtime. A panic in the decoder
/// surfaces as a [`JoinError`] instead of tearing down the connection.
async fn analyze_blocking(
    data: Bytes,
    format: DataFormat,
) -> Result<Result<AnalysisResult, AnalysisError>, ApiError> {
    let result = tokio::task::spawn_blocking(move || {
        let dataset = parse_dataset(&data, format)?;
        analyze(&dataset)
    })
    .await?;
    Ok(result)
}

/// Finds the `file` part. Parts without a filename are form fields, not files.
async fn read_file_field(multipart: &mut Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = match field.file_name() {
            Some("") => return Err(ApiError::EmptyFilename),
            Some(name) => name.to_string(),
            None => continue,
        };
        let data = field.bytes().await?;
        return Ok(Upload { file_name, data });
    }
    Err(ApiError::MissingFile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LoadError, ValidationError};

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::MissingFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::EmptyFilename.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::UnsupportedFileType.status(), StatusCode::BAD_REQUEST);

        let validation = ApiError::Analysis(AnalysisError::Validation(ValidationError {
            missing: vec!["Math"],
        }));
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);

        let load = ApiError::Analysis(AnalysisError::Load(LoadError::Spreadsheet(
            "bad zip".into(),
        )));
        assert_eq!(load.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_messages() {
        assert_eq!(ApiError::MissingFile.message(), "No file part in the request.");
        assert_eq!(
            ApiError::UnsupportedFileType.message(),
            "Invalid file type. Please upload a .csv or .xlsx file."
        );

        let load = ApiError::Analysis(AnalysisError::Load(LoadError::Spreadsheet(
            "bad zip".into(),
        )));
        assert_eq!(
            load.message(),
            "An error occurred: could not read spreadsheet: bad zip"
        );

        let validation = ApiError::Analysis(AnalysisError::Validation(ValidationError {
            missing: vec!["Name"],
        }));
        assert!(validation.message().starts_with("File must contain"));
    }

    #[tokio::test]
    async fn test_panicking_task_is_server_error() {
        let err = tokio::task::spawn_blocking(|| -> Result<(), ()> {
            panic!("index out of bounds")
        })
        .await
        .unwrap_err();

        let api = ApiError::from(err);
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message(), "An error occurred: index out of bounds");
    }

    #[test]
    fn test_panic_message_formats() {
        assert_eq!(panic_message(Box::new("static")), "static");
        assert_eq!(panic_message(Box::new(String::from("owned"))), "owned");
        assert_eq!(panic_message(Box::new(7_u8)), "file could not be processed");
    }
}

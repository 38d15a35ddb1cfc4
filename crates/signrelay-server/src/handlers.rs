//! HTTP surface of the sign endpoint
//!
//! `POST /sign` takes a multipart upload, validates it, stages it in the
//! workspace, has the external tool sign it in place, and streams the
//! result back. `GET /healthz` is a fixed liveness payload.

use std::path::Path;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::header::{HeaderName, HeaderValue, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tracing::info;

use signrelay_core::digest::sha256_file;
use signrelay_core::fsops::ensure_dir;
use signrelay_core::{RelayError, ServerConfig};

use crate::error::SignError;
use crate::signer;

/// Slack above the configured cap so the size decision is ours, not the
/// body-limit middleware's
const BODY_LIMIT_SLACK: usize = 1024 * 1024;

/// Digest header on successful sign responses
const DIGEST_HEADER: HeaderName = HeaderName::from_static("x-file-sha256");

/// Read-only state shared by all requests
pub struct ServerState {
    pub config: ServerConfig,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }
}

/// Build the endpoint router
pub fn router(state: Arc<ServerState>) -> Router {
    let body_limit = state.config.max_upload_bytes() as usize + BODY_LIMIT_SLACK;
    Router::new()
        .route("/healthz", get(handle_healthz))
        .route("/sign", post(handle_sign))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// GET /healthz - liveness/readiness, no side effects
async fn handle_healthz() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

/// POST /sign - validate the upload, sign it, stream the result back
async fn handle_sign(
    State(state): State<Arc<ServerState>>,
    mut multipart: Multipart,
) -> Result<Response, SignError> {
    let config = &state.config;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let content = field.bytes().await?;
            upload = Some((filename, content));
            break;
        }
    }
    let (raw_filename, content) = upload.ok_or(SignError::MissingFileField)?;

    // Only the final path component of the client-supplied name is used
    let filename = Path::new(&raw_filename)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or(SignError::InvalidFilename)?
        .to_string();

    if !config.allows_filename(&filename) {
        let ext = filename.rfind('.').map(|i| &filename[i..]).unwrap_or("");
        return Err(SignError::DisallowedExtension(ext.to_string()));
    }

    if content.len() as u64 > config.max_upload_bytes() {
        return Err(SignError::TooLarge);
    }

    info!(filename, bytes = content.len(), "accepted upload for signing");

    ensure_dir(&config.work_dir).map_err(SignError::Internal)?;

    // Workspace names are pid-qualified; two concurrent uploads of the same
    // filename within one server process still collide (see DESIGN.md)
    let input_path = config
        .work_dir
        .join(format!("input_{}_{}", std::process::id(), filename));
    tokio::fs::write(&input_path, &content).await?;

    signer::sign_in_place(config, &input_path).await?;

    let digest = sha256_file(&input_path).await.map_err(SignError::Internal)?;
    let signed = tokio::fs::read(&input_path).await?;

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .map_err(|e| SignError::Internal(RelayError::other(format!("bad filename header: {e}"))))?;
    let digest_value = HeaderValue::from_str(&digest)
        .map_err(|e| SignError::Internal(RelayError::other(format!("bad digest header: {e}"))))?;

    let headers = [
        (CONTENT_TYPE, HeaderValue::from_static("application/octet-stream")),
        (CONTENT_DISPOSITION, disposition),
        (DIGEST_HEADER, digest_value),
    ];
    Ok((headers, signed).into_response())
}

//! Error types for the sign endpoint
//!
//! Every error maps to the HTTP response the caller sees: validation
//! failures are 4xx with a short JSON body, signing-tool failures are 500
//! with the tool's diagnostic output and the redacted configuration.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use signrelay_core::RelayError;

/// Errors surfaced by the `/sign` handler
#[derive(Debug, Error)]
pub enum SignError {
    /// Request carried no `file` multipart field
    #[error("file field required")]
    MissingFileField,

    /// Uploaded filename carries an extension outside the allow-set
    #[error("extension {0:?} not allowed")]
    DisallowedExtension(String),

    /// Uploaded filename had no usable final path component
    #[error("invalid filename")]
    InvalidFilename,

    /// Payload exceeds the configured size cap
    #[error("file too large")]
    TooLarge,

    /// The multipart body could not be read
    #[error("malformed multipart request: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    /// The signing tool exited with a failure code
    #[error("signtool failed with exit code {return_code}")]
    ToolFailed {
        return_code: i32,
        stdout: String,
        stderr: String,
        /// Active configuration with `cert_password` already removed
        config: serde_json::Value,
    },

    /// Anything else: workspace IO, spawning the tool, digesting the result
    #[error(transparent)]
    Internal(#[from] RelayError),
}

impl From<std::io::Error> for SignError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(RelayError::Io(err))
    }
}

impl IntoResponse for SignError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::MissingFileField => (
                StatusCode::BAD_REQUEST,
                json!({"error": "file field required"}),
            ),
            Self::DisallowedExtension(ref ext) => (
                StatusCode::BAD_REQUEST,
                json!({"error": format!("extension {ext} not allowed")}),
            ),
            Self::InvalidFilename => {
                (StatusCode::BAD_REQUEST, json!({"error": "invalid filename"}))
            }
            Self::TooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                json!({"error": "file too large"}),
            ),
            // The body-limit middleware surfaces oversize payloads as a
            // multipart read error; those stay on the 413 contract
            Self::Multipart(ref err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => (
                StatusCode::PAYLOAD_TOO_LARGE,
                json!({"error": "file too large"}),
            ),
            Self::Multipart(ref err) => (
                StatusCode::BAD_REQUEST,
                json!({"error": format!("malformed multipart request: {err}")}),
            ),
            Self::ToolFailed {
                return_code,
                ref stdout,
                ref stderr,
                ref config,
            } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "signtool failed",
                    "return_code": return_code,
                    "stdout": stdout,
                    "stderr": stderr,
                    "config": config,
                }),
            ),
            Self::Internal(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": err.to_string()}),
            ),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            SignError::MissingFileField.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            SignError::TooLarge.into_response().status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            SignError::ToolFailed {
                return_code: 3,
                stdout: String::new(),
                stderr: String::new(),
                config: serde_json::Value::Null,
            }
            .into_response()
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

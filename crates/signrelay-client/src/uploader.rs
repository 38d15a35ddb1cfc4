//! Upload loop and atomic publication
//!
//! One upload attempt sequence runs per settled file: POST the bytes as a
//! multipart `file` field, retry on any non-200 or transport error with a
//! fixed backoff, and after the configured number of attempts abandon the
//! file. There is no dead-letter queue. A delivered artifact is published
//! under its original name via write-temp-then-rename so the output
//! directory never holds a partial file.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use signrelay_core::digest::sha256_hex;
use signrelay_core::fsops::{atomic_write_bytes, ensure_dir};
use signrelay_core::ClientConfig;

use crate::error::{ClientError, Result};

/// Digest header carried on sign responses
const DIGEST_HEADER: &str = "x-file-sha256";

/// A signed file as returned by the sign endpoint
#[derive(Debug)]
pub struct SignedArtifact {
    /// Original filename, reused for publication
    pub name: String,
    /// Signed bytes
    pub content: Vec<u8>,
    /// Server-computed SHA-256 digest, if the header was present
    pub digest: Option<String>,
}

/// How an upload attempt sequence ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The signed artifact was published to the output directory
    Delivered,
    /// All attempts failed; the file was dropped
    Abandoned,
}

/// Uploads settled files and publishes the signed results
#[derive(Clone)]
pub struct Uploader {
    config: Arc<ClientConfig>,
    client: reqwest::Client,
}

impl Uploader {
    /// Build an uploader with the configured request timeout
    pub fn new(config: Arc<ClientConfig>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { config, client })
    }

    /// Run one complete attempt sequence for a settled file.
    ///
    /// Every per-attempt failure is retried, including a source file that
    /// cannot be read, and [`UploadOutcome::Abandoned`] is returned once
    /// the retry budget is spent. `Err` surfaces only for a path with no
    /// usable filename or a failure publishing a delivered artifact.
    pub async fn upload_with_retries(&self, path: &Path) -> Result<UploadOutcome> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ClientError::UnusablePath(path.to_path_buf()))?
            .to_string();

        for attempt in 1..=self.config.retry_count {
            match self.upload_once(path, &name).await {
                Ok(artifact) => {
                    self.publish(&artifact)?;
                    info!(file = %name, attempt, "signed file published");
                    return Ok(UploadOutcome::Delivered);
                }
                Err(err) => {
                    warn!(
                        file = %name,
                        attempt,
                        of = self.config.retry_count,
                        error = %err,
                        "upload attempt failed"
                    );
                }
            }
            tokio::time::sleep(self.config.retry_backoff()).await;
        }

        warn!(
            file = %name,
            attempts = self.config.retry_count,
            "abandoning file after exhausting retries"
        );
        Ok(UploadOutcome::Abandoned)
    }

    async fn upload_once(&self, path: &Path, name: &str) -> Result<SignedArtifact> {
        let bytes = tokio::fs::read(path).await?;
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(name.to_string())
            .mime_str("application/octet-stream")?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/sign", self.config.server_url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::ServerRejected {
                status: status.as_u16(),
                body,
            });
        }

        let digest = response
            .headers()
            .get(DIGEST_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let content = response.bytes().await?.to_vec();

        Ok(SignedArtifact {
            name: name.to_string(),
            content,
            digest,
        })
    }

    /// Publish a signed artifact atomically under its original name
    fn publish(&self, artifact: &SignedArtifact) -> Result<()> {
        if let Some(expected) = &artifact.digest {
            let actual = sha256_hex(&artifact.content);
            if &actual != expected {
                // Advisory header; delivery proceeds, but the mismatch is loud
                warn!(
                    file = %artifact.name,
                    expected,
                    actual,
                    "digest header disagrees with received bytes"
                );
            }
        }

        ensure_dir(&self.config.output_dir)?;
        let dest = self.config.output_dir.join(&artifact.name);
        atomic_write_bytes(&dest, &artifact.content)?;
        Ok(())
    }
}

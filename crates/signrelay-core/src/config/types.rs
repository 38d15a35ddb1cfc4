//! Configuration types
//!
//! Both configs are constructed once at startup and passed explicitly to
//! whatever needs them; nothing in the relay mutates configuration after
//! load.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the sign endpoint process
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to
    pub host: String,

    /// Port to bind the HTTP listener to
    pub port: u16,

    /// Path to the external signing tool executable
    pub signtool_path: PathBuf,

    /// Path to the code-signing certificate
    pub cert_path: PathBuf,

    /// Certificate password; redacted from every echoed configuration
    pub cert_password: Option<String>,

    /// Timestamp authority URL passed to the signing tool
    pub timestamp_url: String,

    /// Scratch directory holding in-flight uploads during signing
    pub work_dir: PathBuf,

    /// Maximum accepted upload size in mebibytes
    pub max_upload_mb: u64,

    /// Filename suffixes accepted for signing (matched case-insensitively)
    pub allowed_extensions: Vec<String>,

    /// Seconds the signing tool may run before it is killed
    pub sign_timeout_sec: u64,

    /// Run under a service manager instead of in the foreground
    pub run_as_service: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            signtool_path: PathBuf::from(
                r"C:\Program Files (x86)\Windows Kits\10\bin\x64\signtool.exe",
            ),
            cert_path: PathBuf::from(r"C:\certs\codesign.pfx"),
            cert_password: None,
            timestamp_url: "http://timestamp.digicert.com".to_string(),
            work_dir: PathBuf::from(r"C:\signrelay\work"),
            max_upload_mb: 200,
            allowed_extensions: default_extensions(),
            sign_timeout_sec: 600,
            run_as_service: false,
        }
    }
}

impl ServerConfig {
    /// Maximum accepted upload size in bytes
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb * 1024 * 1024
    }

    /// Check whether a filename carries an allowed extension.
    ///
    /// An empty allow-set accepts everything, matching the original
    /// service behavior.
    pub fn allows_filename(&self, filename: &str) -> bool {
        if self.allowed_extensions.is_empty() {
            return true;
        }
        let lower = filename.to_lowercase();
        self.allowed_extensions
            .iter()
            .any(|ext| lower.ends_with(&ext.to_lowercase()))
    }

    /// How long the signing tool may run
    pub fn sign_timeout(&self) -> Duration {
        Duration::from_secs(self.sign_timeout_sec)
    }

    /// The active configuration as JSON with `cert_password` omitted.
    ///
    /// This is what gets echoed back in diagnostic error payloads.
    pub fn redacted(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(map) = value.as_object_mut() {
            map.remove("cert_password");
        }
        value
    }
}

/// Configuration for the watcher/uploader process
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the sign endpoint
    pub server_url: String,

    /// Directory monitored for new unsigned files
    pub watch_dir: PathBuf,

    /// Directory where signed files are atomically published
    pub output_dir: PathBuf,

    /// Seconds between watch-directory scans
    pub poll_interval_sec: f64,

    /// Upload attempts before a file is abandoned
    pub retry_count: u32,

    /// Seconds to sleep between upload attempts
    pub retry_backoff_sec: f64,

    /// Upload request timeout in seconds; signing large binaries is slow
    pub request_timeout_sec: u64,

    /// Filename suffixes picked up from the watch directory
    pub signable_extensions: Vec<String>,

    /// Run under a service manager instead of in the foreground
    pub run_as_service: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8080".to_string(),
            watch_dir: PathBuf::from(r"C:\to_sign"),
            output_dir: PathBuf::from(r"C:\signed"),
            poll_interval_sec: 1.0,
            retry_count: 3,
            retry_backoff_sec: 2.0,
            request_timeout_sec: 600,
            signable_extensions: default_extensions(),
            run_as_service: false,
        }
    }
}

impl ClientConfig {
    /// Interval between watch-directory scans
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs_f64(self.poll_interval_sec)
    }

    /// Sleep between failed upload attempts
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs_f64(self.retry_backoff_sec)
    }

    /// Timeout for one upload round-trip
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_sec)
    }

    /// Check whether a path should be picked up for signing
    pub fn is_signable(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        let lower = name.to_lowercase();
        self.signable_extensions
            .iter()
            .any(|ext| lower.ends_with(&ext.to_lowercase()))
    }
}

fn default_extensions() -> Vec<String> {
    vec![
        ".exe".to_string(),
        ".dll".to_string(),
        ".sys".to_string(),
        ".msi".to_string(),
    ]
}

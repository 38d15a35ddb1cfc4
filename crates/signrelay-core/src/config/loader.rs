//! Configuration loading
//!
//! Configs are JSON files. The search order for an unqualified config is:
//! the working directory, the directory named by `SIGNRELAY_CONFIG_DIR`,
//! then the user configuration directory under a `signrelay/` folder.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::{ConfigError, Result};

use super::types::{ClientConfig, ServerConfig};

/// Environment variable naming an override directory for config files
pub const CONFIG_DIR_ENV: &str = "SIGNRELAY_CONFIG_DIR";

/// Default server configuration file name
pub const SERVER_CONFIG_FILE: &str = "server_config.json";

/// Default client configuration file name
pub const CLIENT_CONFIG_FILE: &str = "client_config.json";

/// Load the server configuration from an explicit path or the search path
pub fn load_server_config(path: Option<&Path>) -> Result<ServerConfig> {
    load(path, SERVER_CONFIG_FILE)
}

/// Load the client configuration from an explicit path or the search path
pub fn load_client_config(path: Option<&Path>) -> Result<ClientConfig> {
    load(path, CLIENT_CONFIG_FILE)
}

/// Find a configuration file by name in the standard search locations
pub fn find_config(file_name: &str) -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join(file_name));
    }
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        candidates.push(PathBuf::from(dir).join(file_name));
    }
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("signrelay").join(file_name));
    }

    for candidate in candidates {
        debug!(path = %candidate.display(), "checking for config file");
        if candidate.is_file() {
            info!(path = %candidate.display(), "found config file");
            return Some(candidate);
        }
    }

    debug!(file_name, "no config file found");
    None
}

fn load<T: DeserializeOwned>(path: Option<&Path>, file_name: &str) -> Result<T> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => find_config(file_name).ok_or_else(|| {
            ConfigError::NotFound(
                std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            )
        })?,
    };

    info!(path = %path.display(), "loading config");
    let content = std::fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config = serde_json::from_str(&content).map_err(|source| ConfigError::ParseError {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), "config loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Process environment is shared across the parallel test harness;
    // any test touching CONFIG_DIR_ENV must hold this
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_load_server_config_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("server_config.json");
        std::fs::write(
            &path,
            r#"{"host": "127.0.0.1", "port": 9443, "max_upload_mb": 16}"#,
        )
        .unwrap();

        let config = load_server_config(Some(&path)).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9443);
        assert_eq!(config.max_upload_mb, 16);
        // Unspecified fields keep their defaults
        assert_eq!(config.timestamp_url, "http://timestamp.digicert.com");
    }

    #[test]
    fn test_load_client_config_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("client_config.json");
        std::fs::write(
            &path,
            r#"{"server_url": "http://signer:8080", "retry_count": 5}"#,
        )
        .unwrap();

        let config = load_client_config(Some(&path)).unwrap();
        assert_eq!(config.server_url, "http://signer:8080");
        assert_eq!(config.retry_count, 5);
        assert_eq!(config.retry_backoff_sec, 2.0);
    }

    #[test]
    fn test_load_invalid_json_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("server_config.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = load_server_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("parse"));
    }

    #[test]
    fn test_find_config_env_override_dir() {
        let _env = ENV_LOCK.lock().unwrap();
        let temp = TempDir::new().unwrap();
        let name = "loader_test_override.json";
        std::fs::write(temp.path().join(name), "{}").unwrap();

        std::env::set_var(CONFIG_DIR_ENV, temp.path());
        let found = find_config(name);
        std::env::remove_var(CONFIG_DIR_ENV);

        assert_eq!(found, Some(temp.path().join(name)));
    }

    #[test]
    fn test_load_missing_explicit_path_is_io_error() {
        let temp = TempDir::new().unwrap();
        let err = load_server_config(Some(&temp.path().join("absent.json"))).unwrap_err();
        assert!(matches!(
            err,
            crate::error::RelayError::Config(ConfigError::Io(_))
        ));
    }
}

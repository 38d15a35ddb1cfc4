//! Signrelay Core - shared building blocks for the signing relay
//!
//! This crate provides the pieces both halves of the relay depend on:
//! configuration loading, error types, content digests, atomic file
//! publication, external command execution, and process lifecycle hosts.

pub mod command;
pub mod config;
pub mod digest;
pub mod error;
pub mod fsops;
pub mod lifecycle;
pub mod logging;

pub use command::{run_command, CommandOutput, TIMEOUT_EXIT_CODE};
pub use config::{ClientConfig, ServerConfig};
pub use error::{ConfigError, RelayError, Result};
pub use lifecycle::{host_for, ForegroundHost, ManagedHost, ProcessHost};

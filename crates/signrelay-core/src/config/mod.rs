//! Configuration loading and types

mod loader;
mod types;

pub use loader::{find_config, load_client_config, load_server_config, CONFIG_DIR_ENV};
pub use types::{ClientConfig, ServerConfig};

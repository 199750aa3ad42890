use crate::storage::naming::{DEFAULT_EXTENSION, DEFAULT_PREFIX};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 6000;

/// Request body cap for the ingest route. Zero disables the cap.
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
    #[serde(default = "default_ingest_route")]
    pub ingest_route: String,
    #[serde(default = "default_latest_route")]
    pub latest_route: String,
    /// Largest accepted request body in bytes; `0` means unlimited.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_listen() -> String {
    format!("0.0.0.0:{}", DEFAULT_PORT)
}

fn default_ingest_route() -> String {
    "/mozillahubs".to_string()
}

fn default_latest_route() -> String {
    "/latest".to_string()
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            ingest_route: default_ingest_route(),
            latest_route: default_latest_route(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the daily log files. Has no default.
    #[serde(default)]
    pub save_dir: PathBuf,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    #[serde(default = "default_file_extension")]
    pub file_extension: String,
    /// gzip level, 0 (store) to 9 (best).
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
}

fn default_file_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_file_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_compression_level() -> u32 {
    9
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::new(),
            file_prefix: default_file_prefix(),
            file_extension: default_file_extension(),
            compression_level: default_compression_level(),
        }
    }
}

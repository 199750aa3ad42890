use super::types::*;
use crate::config::{expand_env_vars, expand_tilde};
use crate::web::HEALTH_ROUTE;
use regex::Regex;
use std::fs::File;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation failed:\n{}", .0.join("\n"))]
    ValidationList(Vec<String>),

    #[error("validation failed: {0}")]
    Validation(String),
}

/// Load a config file. The result is not validated; callers apply command
/// line overrides first and then call [`validate_config`].
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    use std::io::Read;

    let mut file = File::open(path).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to open config file '{}': {}", path.display(), e),
        ))
    })?;

    let mut yaml_string = String::new();
    file.read_to_string(&mut yaml_string).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read config file '{}': {}", path.display(), e),
        ))
    })?;

    parse_config(&yaml_string)
}

/// Parse config YAML, expanding `$env{VAR}` references and `~` in paths.
pub fn parse_config(yaml: &str) -> Result<Config, ConfigError> {
    let yaml_string = expand_env_vars(yaml);
    check_unexpanded_vars(&yaml_string)?;

    let mut config: Config = serde_yaml::from_str(&yaml_string)?;
    config.storage.save_dir = expand_tilde(&config.storage.save_dir);

    Ok(config)
}

fn check_unexpanded_vars(yaml_string: &str) -> Result<(), ConfigError> {
    let re = Regex::new(r"\$env\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();
    let mut unexpanded_vars: Vec<String> = re
        .captures_iter(yaml_string)
        .map(|cap| cap[1].to_string())
        .collect();

    if unexpanded_vars.is_empty() {
        return Ok(());
    }

    unexpanded_vars.sort();
    unexpanded_vars.dedup();

    Err(ConfigError::Validation(format!(
        "environment variables are not set: {}",
        unexpanded_vars.join(", ")
    )))
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    validate_server(&config.server, &mut errors);
    validate_storage(&config.storage, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationList(errors))
    }
}

fn validate_server(server: &ServerConfig, errors: &mut Vec<String>) {
    if server.listen.parse::<SocketAddr>().is_err() {
        errors.push(format!(
            "server.listen: '{}' is not a socket address (expected host:port)",
            server.listen
        ));
    }

    for (field, route) in [
        ("server.ingest_route", &server.ingest_route),
        ("server.latest_route", &server.latest_route),
    ] {
        if !route.starts_with('/') {
            errors.push(format!("{}: route '{}' must start with '/'", field, route));
        } else if route == HEALTH_ROUTE {
            errors.push(format!("{}: route '{}' is reserved", field, route));
        }
    }

    if server.ingest_route == server.latest_route {
        errors.push(format!(
            "server.ingest_route and server.latest_route must differ (both are '{}')",
            server.ingest_route
        ));
    }
}

fn validate_storage(storage: &StorageConfig, errors: &mut Vec<String>) {
    if storage.save_dir.as_os_str().is_empty() {
        errors.push(
            "storage.save_dir is required (set it in the config file or pass SAVE_DIR)".to_string(),
        );
    }

    if storage.file_prefix.is_empty() {
        errors.push("storage.file_prefix cannot be empty".to_string());
    }

    for (field, value) in [
        ("storage.file_prefix", &storage.file_prefix),
        ("storage.file_extension", &storage.file_extension),
    ] {
        if value.contains('/') || value.contains('\\') {
            errors.push(format!("{}: '{}' cannot contain path separators", field, value));
        }
    }

    if storage.compression_level > 9 {
        errors.push(format!(
            "storage.compression_level: {} is out of range (0-9)",
            storage.compression_level
        ));
    }
}

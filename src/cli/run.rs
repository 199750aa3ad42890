use crate::config::{load_config, resolve_config_path, validate_config, Config, ConfigError};
use crate::ingest::Ingestor;
use crate::web::{build_router, start_server};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::signal;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("could not create save directory '{}': {source}", .path.display())]
    SaveDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Command line inputs that shape the effective configuration.
#[derive(Debug, Default, Clone)]
pub struct RunOptions {
    pub config_path: Option<PathBuf>,
    pub save_dir: Option<PathBuf>,
    pub port: Option<u16>,
}

/// Load the config file (if any), apply command line overrides and validate.
pub fn build_config(options: &RunOptions) -> Result<Config, RunError> {
    // Resolve config path, falling back to defaults
    let mut config = match resolve_config_path(options.config_path.as_deref()) {
        Some(path) => {
            info!(config_path = %path.display(), "Loading configuration");
            load_config(&path)?
        }
        None => Config::default(),
    };

    // Command line values override the file
    if let Some(save_dir) = &options.save_dir {
        config.storage.save_dir = save_dir.clone();
    }

    if let Some(port) = options.port {
        if let Ok(mut addr) = config.server.listen.parse::<SocketAddr>() {
            addr.set_port(port);
            config.server.listen = addr.to_string();
        }
    }

    validate_config(&config)?;
    Ok(config)
}

/// Create the save directory and its parents if it does not exist yet.
pub fn ensure_save_dir(dir: &Path) -> Result<(), RunError> {
    if dir.is_dir() {
        info!(dir = %dir.display(), "Storing data in existing directory");
        return Ok(());
    }

    info!(dir = %dir.display(), "Creating output directory");
    std::fs::create_dir_all(dir).map_err(|source| RunError::SaveDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Keep the process alive when the controlling terminal goes away.
#[cfg(unix)]
fn ignore_sighup() -> Result<(), std::io::Error> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangups = signal(SignalKind::hangup())?;
    tokio::spawn(async move {
        while hangups.recv().await.is_some() {
            warn!("Ignoring SIGHUP");
        }
    });
    Ok(())
}

#[cfg(not(unix))]
fn ignore_sighup() -> Result<(), std::io::Error> {
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!(error = %e, "Could not listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}

pub async fn run(options: RunOptions) -> Result<(), RunError> {
    // Load config and apply command line overrides
    let config = build_config(&options)?;

    // Create save directory
    ensure_save_dir(&config.storage.save_dir)?;
    ignore_sighup()?;

    // Build the router around a single ingestor
    let ingestor = Arc::new(Ingestor::from_config(&config.storage));
    let app = build_router(ingestor, &config.server);

    // Validation guarantees the address parses.
    let listen_addr: SocketAddr = config.server.listen.parse().map_err(|_| {
        ConfigError::Validation(format!("invalid listen address '{}'", config.server.listen))
    })?;

    info!(
        ingest_route = %config.server.ingest_route,
        latest_route = %config.server.latest_route,
        save_dir = %config.storage.save_dir.display(),
        max_body_bytes = config.server.max_body_bytes,
        "Starting data logger"
    );

    // Start HTTP server
    start_server(listen_addr, app, shutdown_signal()).await?;

    info!("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_cli_overrides_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "server:\n  listen: \"127.0.0.1:7000\"\nstorage:\n  save_dir: /from/file\n"
        )
        .unwrap();

        let config = build_config(&RunOptions {
            config_path: Some(file.path().to_path_buf()),
            save_dir: Some(PathBuf::from("/from/cli")),
            port: Some(7100),
        })
        .unwrap();

        assert_eq!(config.server.listen, "127.0.0.1:7100");
        assert_eq!(config.storage.save_dir, PathBuf::from("/from/cli"));
    }

    #[test]
    fn test_missing_save_dir_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "server:\n  listen: \"127.0.0.1:7000\"\n").unwrap();

        let err = build_config(&RunOptions {
            config_path: Some(file.path().to_path_buf()),
            ..Default::default()
        })
        .unwrap_err();

        assert!(matches!(err, RunError::Config(ConfigError::ValidationList(_))));
    }

    #[test]
    fn test_ensure_save_dir_creates_nested_directories() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");

        ensure_save_dir(&nested).unwrap();
        assert!(nested.is_dir());

        // Existing directory is left alone
        ensure_save_dir(&nested).unwrap();
    }

    #[test]
    fn test_ensure_save_dir_fails_on_file() {
        let file = NamedTempFile::new().unwrap();
        let err = ensure_save_dir(&file.path().join("sub")).unwrap_err();
        assert!(matches!(err, RunError::SaveDir { .. }));
    }
}

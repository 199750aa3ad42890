use super::naming::LogFileNaming;
use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("save directory '{}' is unavailable: {source}", .path.display())]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read metadata of '{}': {source}", .path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no samples captured yet")]
    NoSamplesYet,
}

/// Metadata of one log file in the save directory.
#[derive(Debug, Clone)]
pub struct LogFileInfo {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub modified: DateTime<Utc>,
}

/// List the log files directly inside `dir`, sorted by name.
///
/// Entries that are not regular files or do not follow the naming scheme are
/// skipped. Listing order of the filesystem is not relied upon.
pub fn list_log_files(
    dir: &Path,
    naming: &LogFileNaming,
) -> Result<Vec<LogFileInfo>, QueryError> {
    let unavailable = |source| QueryError::DirectoryUnavailable {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();

    for entry in fs::read_dir(dir).map_err(unavailable)? {
        let entry = entry.map_err(unavailable)?;

        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if !naming.matches(&name) {
            continue;
        }

        let path = entry.path();
        let metadata = entry.metadata().map_err(|source| QueryError::Metadata {
            path: path.clone(),
            source,
        })?;
        if !metadata.is_file() {
            continue;
        }

        let modified = metadata.modified().map_err(|source| QueryError::Metadata {
            path: path.clone(),
            source,
        })?;

        files.push(LogFileInfo {
            name,
            path,
            size: metadata.len(),
            modified: DateTime::<Utc>::from(modified),
        });
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

/// Modification time of the most recently named log file in `dir`.
pub fn latest_sample(dir: &Path, naming: &LogFileNaming) -> Result<DateTime<Utc>, QueryError> {
    list_log_files(dir, naming)?
        .pop()
        .map(|latest| latest.modified)
        .ok_or(QueryError::NoSamplesYet)
}

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to open '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write to '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to finalize compressed stream for '{}': {source}", .path.display())]
    Finish {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A gzip stream appended to the end of a log file.
///
/// Every session adds one gzip member to the file; concatenated members form a
/// valid multi-member gzip stream. The encoder owns the file, so finalizing
/// the encoder always happens before the descriptor is closed. If the session
/// is dropped without [`finish`](Self::finish), the encoder is finalized on a
/// best-effort basis and the failure is logged.
pub struct CompressedAppendWriter {
    path: PathBuf,
    encoder: Option<GzEncoder<File>>,
}

impl CompressedAppendWriter {
    /// `level` is a gzip level between 0 and 9.
    pub fn open(path: &Path, level: u32) -> Result<Self, WriteError> {
        let file = open_append(path).map_err(|source| WriteError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            encoder: Some(GzEncoder::new(file, Compression::new(level))),
        })
    }

    pub fn write_record(&mut self, record: &str) -> Result<(), WriteError> {
        let Some(encoder) = self.encoder.as_mut() else {
            return Err(WriteError::Write {
                path: self.path.clone(),
                source: io::Error::new(io::ErrorKind::Other, "writer already finished"),
            });
        };

        encoder
            .write_all(record.as_bytes())
            .map_err(|source| WriteError::Write {
                path: self.path.clone(),
                source,
            })
    }

    /// Write the gzip trailer, then close the file.
    pub fn finish(mut self) -> Result<(), WriteError> {
        match self.encoder.take() {
            Some(encoder) => {
                let file = encoder.finish().map_err(|source| WriteError::Finish {
                    path: self.path.clone(),
                    source,
                })?;
                drop(file);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Drop for CompressedAppendWriter {
    fn drop(&mut self) {
        if let Some(encoder) = self.encoder.take() {
            if let Err(e) = encoder.finish() {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to finalize compressed stream on drop"
                );
            }
        }
    }
}

#[cfg(unix)]
fn open_append(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    OpenOptions::new()
        .append(true)
        .create(true)
        .mode(0o644)
        .open(path)
}

#[cfg(not(unix))]
fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().append(true).create(true).open(path)
}

/// Append `records` to the log file at `path` as a single compressed member.
///
/// Records are written in order. On a write error the stream is still
/// finalized and the file closed before the error is returned; bytes already
/// handed to the encoder may reach the file.
pub fn append_records<S: AsRef<str>>(
    path: &Path,
    records: &[S],
    level: u32,
) -> Result<(), WriteError> {
    let mut writer = CompressedAppendWriter::open(path, level)?;

    for record in records {
        writer.write_record(record.as_ref())?;
    }

    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::MultiGzDecoder;
    use std::io::Read;
    use tempfile::TempDir;

    fn read_gz(path: &Path) -> String {
        let file = File::open(path).unwrap();
        let mut out = String::new();
        MultiGzDecoder::new(file).read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_creates_file_and_writes_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("datalog-2024-01-01.csv.gz");

        append_records(&path, &["a,1\n", "b,2\n"], 9).unwrap();

        assert_eq!(read_gz(&path), "a,1\nb,2\n");
    }

    #[test]
    fn test_appends_across_sessions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("datalog-2024-01-01.csv.gz");

        append_records(&path, &["first\n"], 9).unwrap();
        let size_after_first = std::fs::metadata(&path).unwrap().len();
        append_records(&path, &["second\n", "third\n"], 1).unwrap();

        assert!(std::fs::metadata(&path).unwrap().len() > size_after_first);
        assert_eq!(read_gz(&path), "first\nsecond\nthird\n");
    }

    #[test]
    fn test_dropped_writer_is_finalized() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("datalog-2024-01-01.csv.gz");

        {
            let mut writer = CompressedAppendWriter::open(&path, 9).unwrap();
            writer.write_record("kept\n").unwrap();
        }

        assert_eq!(read_gz(&path), "kept\n");
    }

    #[test]
    fn test_open_fails_for_missing_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("datalog-2024-01-01.csv.gz");

        let err = append_records(&path, &["x\n"], 9).unwrap_err();

        assert!(matches!(err, WriteError::Open { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_open_fails_when_path_is_directory() {
        let dir = TempDir::new().unwrap();

        let err = append_records(dir.path(), &["x\n"], 9).unwrap_err();

        assert!(matches!(err, WriteError::Open { .. }));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_write_fails_after_open() {
        // Opens fine, every write fails with ENOSPC
        let err = append_records(Path::new("/dev/full"), &["a\n"], 9).unwrap_err();

        match err {
            WriteError::Write { path, source } => {
                assert_eq!(path, PathBuf::from("/dev/full"));
                assert_eq!(source.raw_os_error(), Some(28));
            }
            other => panic!("expected write error, got {other:?}"),
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_dropped_writer_on_full_device_does_not_panic() {
        let mut writer = CompressedAppendWriter::open(Path::new("/dev/full"), 0).unwrap();
        let chunk = "x".repeat(64 * 1024);

        // Large enough to force the encoder to flush into the device
        let mut failed = false;
        for _ in 0..32 {
            if writer.write_record(&chunk).is_err() {
                failed = true;
                break;
            }
        }

        assert!(failed);
        drop(writer);
    }
}

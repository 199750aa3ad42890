use crate::config::StorageConfig;
use crate::record::{encode_batch, Batch, ReceiptTime};
use crate::storage::{append_records, LogFileNaming, WriteError};
use chrono::{DateTime, Local, Utc};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("write error: {0}")]
    Write(#[from] WriteError),

    #[error("write task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Result of a successfully stored batch.
#[derive(Debug, Clone)]
pub struct IngestReceipt {
    pub time: ReceiptTime,
    pub path: PathBuf,
    pub records: usize,
}

/// Writes validated batches into the daily log files of one save directory.
///
/// All writes of an `Ingestor` are serialized through its own lock, whichever
/// day's file they target. Independent instances do not share a lock.
#[derive(Debug)]
pub struct Ingestor {
    save_dir: PathBuf,
    naming: LogFileNaming,
    compression_level: u32,
    write_lock: Mutex<()>,
}

impl Ingestor {
    pub fn new(
        save_dir: impl Into<PathBuf>,
        naming: LogFileNaming,
        compression_level: u32,
    ) -> Self {
        Self {
            save_dir: save_dir.into(),
            naming,
            compression_level,
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(
            config.save_dir.clone(),
            LogFileNaming::new(&config.file_prefix, &config.file_extension),
            config.compression_level,
        )
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    pub fn naming(&self) -> &LogFileNaming {
        &self.naming
    }

    /// Log file for the local calendar day containing `at`.
    pub fn log_path_for(&self, at: DateTime<Utc>) -> PathBuf {
        let date = at.with_timezone(&Local).date_naive();
        self.naming.path_for(&self.save_dir, date)
    }

    /// Store `batch`, stamping it with the time the write lock was acquired.
    pub fn ingest(&self, batch: &Batch) -> Result<IngestReceipt, IngestError> {
        self.write_locked(batch, ReceiptTime::now)
    }

    /// Store `batch` with a caller-supplied receipt time.
    pub fn ingest_at(
        &self,
        batch: &Batch,
        receipt: ReceiptTime,
    ) -> Result<IngestReceipt, IngestError> {
        self.write_locked(batch, || receipt)
    }

    /// Run [`ingest`](Self::ingest) on the blocking pool.
    ///
    /// The lock is taken inside the blocking task, so a write that has started
    /// completes and keeps the lock even if the calling future is dropped.
    pub async fn ingest_blocking(
        self: &Arc<Self>,
        batch: Batch,
    ) -> Result<IngestReceipt, IngestError> {
        let ingestor = Arc::clone(self);
        tokio::task::spawn_blocking(move || ingestor.ingest(&batch)).await?
    }

    fn write_locked(
        &self,
        batch: &Batch,
        stamp: impl FnOnce() -> ReceiptTime,
    ) -> Result<IngestReceipt, IngestError> {
        // Serialize all writers. The lock guards no data, so poisoning is ignored
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // Stamp the batch and pick that day's file
        let receipt = stamp();
        let path = self.log_path_for(receipt.as_datetime());

        // Encode every row and append them as one compressed member
        let start = Instant::now();
        let records = encode_batch(batch, receipt);
        append_records(&path, &records, self.compression_level)?;

        debug!(
            path = %path.display(),
            records = records.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Appended batch to log file"
        );

        Ok(IngestReceipt {
            time: receipt,
            path,
            records: records.len(),
        })
    }
}

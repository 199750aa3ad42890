use super::batch::Batch;
use super::value::Scalar;
use chrono::{DateTime, TimeZone, Utc};
use std::fmt::{self, Write};

pub const DELIMITER: char = ',';

const MICROS_PER_SEC: i64 = 1_000_000;

/// Server-side receipt time of a batch, held at microsecond resolution so the
/// value written to disk and the value returned to the client are identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReceiptTime {
    micros: i64,
}

impl ReceiptTime {
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self {
            micros: at.timestamp_micros(),
        }
    }

    /// Fractional Unix seconds.
    pub fn as_secs_f64(&self) -> f64 {
        self.micros as f64 / MICROS_PER_SEC as f64
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        Utc.timestamp_micros(self.micros)
            .single()
            .unwrap_or_default()
    }
}

impl fmt::Display for ReceiptTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.micros < 0 { "-" } else { "" };
        let abs = self.micros.unsigned_abs();
        let per_sec = MICROS_PER_SEC as u64;
        write!(f, "{}{}.{:06}", sign, abs / per_sec, abs % per_sec)
    }
}

fn push_fields(line: &mut String, values: &[Scalar]) {
    for value in values {
        line.push(DELIMITER);
        // Writing into a String cannot fail.
        let _ = write!(line, "{}", value);
    }
}

/// Encode one data row, given the already-encoded `timestamp,info...` prefix.
pub fn encode_row(prefix: &str, row: &[Scalar]) -> String {
    let mut line = String::with_capacity(prefix.len() + row.len() * 8 + 1);
    line.push_str(prefix);
    push_fields(&mut line, row);
    line.push('\n');
    line
}

/// Flatten a batch into one newline-terminated record per data row:
/// `receipt,info[0],...,info[n],row[0],...,row[m]`.
///
/// Values are written verbatim; a value containing the delimiter or a newline
/// is not escaped.
pub fn encode_batch(batch: &Batch, receipt: ReceiptTime) -> Vec<String> {
    let mut prefix = receipt.to_string();
    push_fields(&mut prefix, batch.info());

    batch
        .data()
        .iter()
        .map(|row| encode_row(&prefix, row))
        .collect()
}

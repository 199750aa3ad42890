use super::value::Scalar;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("malformed input: {0}")]
    MalformedInput(#[from] serde_json::Error),

    #[error("required fields 'info' and 'data' are missing or empty")]
    MissingRequiredFields,
}

/// Wire shape of an ingest request. Both fields are optional here so that an
/// absent key is reported as a missing field rather than a decode failure.
#[derive(Debug, Deserialize)]
struct RawBatch {
    #[serde(default)]
    info: Option<Vec<Scalar>>,
    #[serde(default)]
    data: Option<Vec<Vec<Scalar>>>,
}

/// One validated telemetry payload: metadata shared by every row plus the rows
/// themselves. Both parts are guaranteed nonempty.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    info: Vec<Scalar>,
    data: Vec<Vec<Scalar>>,
}

impl Batch {
    pub fn new(info: Vec<Scalar>, data: Vec<Vec<Scalar>>) -> Result<Self, ValidationError> {
        if info.is_empty() || data.is_empty() {
            return Err(ValidationError::MissingRequiredFields);
        }
        Ok(Self { info, data })
    }

    pub fn info(&self) -> &[Scalar] {
        &self.info
    }

    pub fn data(&self) -> &[Vec<Scalar>] {
        &self.data
    }

    pub fn row_count(&self) -> usize {
        self.data.len()
    }
}

/// Decode a request body into a [`Batch`].
pub fn parse_batch(body: &[u8]) -> Result<Batch, ValidationError> {
    let raw: RawBatch = serde_json::from_slice(body)?;

    match (raw.info, raw.data) {
        (Some(info), Some(data)) => Batch::new(info, data),
        _ => Err(ValidationError::MissingRequiredFields),
    }
}

pub mod batch;
pub mod encoder;
pub mod value;

pub use batch::{parse_batch, Batch, ValidationError};
pub use encoder::{encode_batch, encode_row, ReceiptTime, DELIMITER};
pub use value::Scalar;

pub mod latest;
pub mod naming;
pub mod writer;

pub use latest::{latest_sample, list_log_files, LogFileInfo, QueryError};
pub use naming::LogFileNaming;
pub use writer::{append_records, CompressedAppendWriter, WriteError};

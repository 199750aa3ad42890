use chrono::NaiveDate;
use regex::Regex;
use std::path::{Path, PathBuf};

pub const DEFAULT_PREFIX: &str = "datalog-";
pub const DEFAULT_EXTENSION: &str = ".csv.gz";

/// Daily file naming scheme: `<prefix>YYYY-MM-DD<extension>`.
///
/// Zero-padded dates make name order equal to chronological order.
#[derive(Debug, Clone)]
pub struct LogFileNaming {
    prefix: String,
    extension: String,
    pattern: Regex,
}

impl LogFileNaming {
    pub fn new(prefix: &str, extension: &str) -> Self {
        let pattern = Regex::new(&format!(
            r"^{}\d{{4}}-\d{{2}}-\d{{2}}{}$",
            regex::escape(prefix),
            regex::escape(extension)
        ))
        .expect("escaped naming pattern is a valid regex");

        Self {
            prefix: prefix.to_string(),
            extension: extension.to_string(),
            pattern,
        }
    }

    pub fn file_name(&self, date: NaiveDate) -> String {
        format!("{}{}{}", self.prefix, date.format("%Y-%m-%d"), self.extension)
    }

    pub fn path_for(&self, dir: &Path, date: NaiveDate) -> PathBuf {
        dir.join(self.file_name(date))
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.pattern.is_match(file_name)
    }
}

impl Default for LogFileNaming {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX, DEFAULT_EXTENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_is_zero_padded() {
        let naming = LogFileNaming::default();
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(naming.file_name(date), "datalog-2024-01-02.csv.gz");
    }

    #[test]
    fn test_path_for_joins_directory() {
        let naming = LogFileNaming::default();
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(
            naming.path_for(Path::new("/data"), date),
            PathBuf::from("/data/datalog-2024-12-31.csv.gz")
        );
    }

    #[test]
    fn test_matches_only_daily_names() {
        let naming = LogFileNaming::default();
        assert!(naming.matches("datalog-2024-01-01.csv.gz"));
        assert!(!naming.matches("datalog-2024-1-1.csv.gz"));
        assert!(!naming.matches("datalog-2024-01-01.csv"));
        assert!(!naming.matches("other-2024-01-01.csv.gz"));
        assert!(!naming.matches("xdatalog-2024-01-01.csv.gz"));
    }

    #[test]
    fn test_custom_prefix_is_escaped() {
        let naming = LogFileNaming::new("hubs.", ".log.gz");
        assert!(naming.matches("hubs.2025-06-30.log.gz"));
        assert!(!naming.matches("hubsX2025-06-30.log.gz"));
    }

    #[test]
    fn test_name_order_is_chronological() {
        let naming = LogFileNaming::default();
        let mut names = vec![
            naming.file_name(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
            naming.file_name(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()),
            naming.file_name(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap()),
        ];
        names.sort();
        assert_eq!(names[2], "datalog-2025-01-01.csv.gz");
        assert_eq!(names[0], "datalog-2024-02-10.csv.gz");
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single value inside a batch's `info` or `data` rows.
///
/// JSON objects and arrays are not scalars and fail to decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

/// Renders the value as a record field. Null renders as an empty field.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value.into())
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Scalar {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_decode_each_variant() {
        assert_eq!(decode("null"), Scalar::Null);
        assert_eq!(decode("true"), Scalar::Bool(true));
        assert_eq!(decode("42"), Scalar::from(42));
        assert_eq!(decode("\"dev1\""), Scalar::from("dev1"));
        assert!(matches!(decode("2.5"), Scalar::Number(_)));
    }

    #[test]
    fn test_nested_values_are_rejected() {
        assert!(serde_json::from_str::<Scalar>("[1, 2]").is_err());
        assert!(serde_json::from_str::<Scalar>("{\"a\": 1}").is_err());
    }

    #[test]
    fn test_display_formatting() {
        assert_eq!(decode("null").to_string(), "");
        assert_eq!(decode("false").to_string(), "false");
        assert_eq!(decode("-17").to_string(), "-17");
        assert_eq!(decode("0.25").to_string(), "0.25");
        assert_eq!(decode("\"hello world\"").to_string(), "hello world");
    }
}

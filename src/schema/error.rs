//! Binding errors

use std::fmt;

use thiserror::Error;

use super::path::FieldPath;

/// What went wrong while binding a single value
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BindErrorKind {
    #[error("Missing value")]
    MissingValue,

    #[error("Wrong value type, expected '{expected}', got '{found}'")]
    WrongType { expected: String, found: &'static str },

    #[error("Unexpected data: {}", quote_all(.keys))]
    UnexpectedData { keys: Vec<String> },

    #[error("Value does not match any type of '{expected}'")]
    UnionMatch { expected: String },

    #[error("Value matches {matches} types of '{expected}', expected exactly one")]
    StrictUnionMatch { expected: String, matches: usize },

    #[error("Unresolved forward reference to schema '{name}'")]
    ForwardReference { name: String },

    #[error("Failed to convert bound value: {0}")]
    Conversion(String),
}

fn quote_all(keys: &[String]) -> String {
    keys.iter()
        .map(|k| format!("'{}'", k))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A binding failure at a specific location in the document
#[derive(Debug, Clone, PartialEq)]
pub struct BindError {
    path: FieldPath,
    kind: BindErrorKind,
}

impl BindError {
    pub fn new(path: FieldPath, kind: BindErrorKind) -> Self {
        Self { path, kind }
    }

    /// Path of the failing field, relative to the bound document
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn kind(&self) -> &BindErrorKind {
        &self.kind
    }
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.path, self.kind)
        }
    }
}

impl std::error::Error for BindError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_with_path() {
        let err = BindError::new(
            FieldPath::root().key("rules").index(0).key("plugin"),
            BindErrorKind::MissingValue,
        );
        assert_eq!(err.to_string(), "rules[0].plugin: Missing value");
    }

    #[test]
    fn renders_root_without_prefix() {
        let err = BindError::new(
            FieldPath::root(),
            BindErrorKind::UnexpectedData {
                keys: vec!["foo".to_string(), "bar".to_string()],
            },
        );
        assert_eq!(err.to_string(), "Unexpected data: 'foo', 'bar'");
    }

    #[test]
    fn wrong_type_message() {
        let kind = BindErrorKind::WrongType {
            expected: "string".to_string(),
            found: "integer",
        };
        assert_eq!(
            kind.to_string(),
            "Wrong value type, expected 'string', got 'integer'"
        );
    }
}

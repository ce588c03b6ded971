// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Unified SQL data types
//!
//! The primitive type set the analyzer infers for expressions and result
//! columns. `Null` doubles as "untyped": the type of a bare NULL literal or of
//! a bind parameter with no surrounding expectation.

use serde::{Deserialize, Serialize};

/// SQL data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Null,
    Integer,
    Real,
    Text,
    Blob,
    Boolean,
}

impl DataType {
    /// Parse a declared type name as it appears in SQL text
    ///
    /// Returns `None` for names outside the unified set; callers decide
    /// whether that is an error.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "int" | "integer" | "bigint" | "smallint" | "tinyint" => Some(DataType::Integer),
            "real" | "float" | "double" => Some(DataType::Real),
            "text" | "varchar" | "char" | "string" => Some(DataType::Text),
            "blob" | "binary" => Some(DataType::Blob),
            "boolean" | "bool" => Some(DataType::Boolean),
            "null" => Some(DataType::Null),
            _ => None,
        }
    }

    /// Whether a value of this type is acceptable where a boolean is expected
    ///
    /// Integer truthiness is accepted, matching SQLite semantics; only text
    /// and blob expressions are rejected.
    pub fn usable_as_boolean(&self) -> bool {
        !matches!(self, DataType::Text | DataType::Blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_type_name() {
        assert_eq!(DataType::from_type_name("INTEGER"), Some(DataType::Integer));
        assert_eq!(DataType::from_type_name("varchar"), Some(DataType::Text));
        assert_eq!(DataType::from_type_name("point"), None);
    }

    #[test]
    fn test_usable_as_boolean() {
        assert!(DataType::Boolean.usable_as_boolean());
        assert!(DataType::Integer.usable_as_boolean());
        assert!(!DataType::Text.usable_as_boolean());
        assert!(!DataType::Blob.usable_as_boolean());
    }
}

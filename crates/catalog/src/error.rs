// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for catalog operations
//!
//! Registration failures are plain values; the resolver converts them into
//! `WithTableError` diagnostics at the point of use rather than letting them
//! propagate as faults.

use serde::Serialize;
use sqlsema_syntax::Span;
use thiserror::Error;

/// Result type alias for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while building or combining symbol tables
#[derive(Debug, Error, Clone, Serialize)]
pub enum CatalogError {
    /// A table, view, or common table with this name is already registered
    #[error("Table already defined with name {name}")]
    DuplicateTable { name: String, span: Span },

    /// A column list declared more columns than the definition provides
    #[error("Expected {expected} columns but found {found}")]
    ColumnCountMismatch {
        found: usize,
        expected: usize,
        span: Span,
    },
}

impl CatalogError {
    /// The source span the error originates from
    pub fn span(&self) -> Span {
        match self {
            CatalogError::DuplicateTable { span, .. }
            | CatalogError::ColumnCountMismatch { span, .. } => *span,
        }
    }
}

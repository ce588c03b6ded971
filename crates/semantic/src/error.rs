// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Resolution errors
//!
//! Every failure the resolver or a validator can report. All variants are
//! non-fatal values collected into an error sink; nothing here is ever raised
//! past the validator boundary. Each variant carries the originating source
//! span, which together with the message forms the deduplication key the
//! orchestrator collapses repeated reports on.

use serde::Serialize;
use sqlsema_syntax::Span;
use thiserror::Error;

/// A single resolution failure
#[derive(Debug, Error, Clone, PartialEq, Serialize)]
pub enum ResolutionError {
    /// WITH clause registration failed (duplicate or cyclic common table)
    #[error("{message}")]
    WithTable { message: String, span: Span },

    /// Compound select branches disagree on column count
    #[error("{message}")]
    Compound { message: String, span: Span },

    /// A table qualifier matched nothing in scope; carries the known names
    #[error("{message}")]
    TableNameNotFound {
        message: String,
        span: Span,
        suggestions: Vec<String>,
    },

    /// A structurally required element is missing
    #[error("{message}")]
    IncompleteRule { message: String, span: Span },

    /// CREATE TABLE constraint or foreign-key violation
    #[error("{message}")]
    CreateTable { message: String, span: Span },

    /// Duplicate or overlapping identifiers
    #[error("{message}")]
    Collision { message: String, span: Span },

    /// Expression-level failure (unknown column, empty result set, type misuse)
    #[error("{message}")]
    Expression { message: String, span: Span },

    /// INSERT arity or required-column violation
    #[error("{message}")]
    Insert { message: String, span: Span },

    /// VALUES rows disagree on column count
    #[error("{message}")]
    Values { message: String, span: Span },
}

/// Discriminant of a [`ResolutionError`], part of the reported triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    WithTable,
    Compound,
    TableNameNotFound,
    IncompleteRule,
    CreateTable,
    Collision,
    Expression,
    Insert,
    Values,
}

impl ResolutionError {
    pub fn with_table(span: Span, message: impl Into<String>) -> Self {
        ResolutionError::WithTable {
            message: message.into(),
            span,
        }
    }

    pub fn compound(span: Span, message: impl Into<String>) -> Self {
        ResolutionError::Compound {
            message: message.into(),
            span,
        }
    }

    pub fn table_name_not_found(
        span: Span,
        message: impl Into<String>,
        suggestions: Vec<String>,
    ) -> Self {
        ResolutionError::TableNameNotFound {
            message: message.into(),
            span,
            suggestions,
        }
    }

    pub fn incomplete_rule(span: Span, message: impl Into<String>) -> Self {
        ResolutionError::IncompleteRule {
            message: message.into(),
            span,
        }
    }

    pub fn create_table(span: Span, message: impl Into<String>) -> Self {
        ResolutionError::CreateTable {
            message: message.into(),
            span,
        }
    }

    pub fn collision(span: Span, message: impl Into<String>) -> Self {
        ResolutionError::Collision {
            message: message.into(),
            span,
        }
    }

    pub fn expression(span: Span, message: impl Into<String>) -> Self {
        ResolutionError::Expression {
            message: message.into(),
            span,
        }
    }

    pub fn insert(span: Span, message: impl Into<String>) -> Self {
        ResolutionError::Insert {
            message: message.into(),
            span,
        }
    }

    pub fn values(span: Span, message: impl Into<String>) -> Self {
        ResolutionError::Values {
            message: message.into(),
            span,
        }
    }

    /// The source span the error originates from
    pub fn span(&self) -> Span {
        match self {
            ResolutionError::WithTable { span, .. }
            | ResolutionError::Compound { span, .. }
            | ResolutionError::TableNameNotFound { span, .. }
            | ResolutionError::IncompleteRule { span, .. }
            | ResolutionError::CreateTable { span, .. }
            | ResolutionError::Collision { span, .. }
            | ResolutionError::Expression { span, .. }
            | ResolutionError::Insert { span, .. }
            | ResolutionError::Values { span, .. } => *span,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ResolutionError::WithTable { message, .. }
            | ResolutionError::Compound { message, .. }
            | ResolutionError::TableNameNotFound { message, .. }
            | ResolutionError::IncompleteRule { message, .. }
            | ResolutionError::CreateTable { message, .. }
            | ResolutionError::Collision { message, .. }
            | ResolutionError::Expression { message, .. }
            | ResolutionError::Insert { message, .. }
            | ResolutionError::Values { message, .. } => message,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolutionError::WithTable { .. } => ErrorKind::WithTable,
            ResolutionError::Compound { .. } => ErrorKind::Compound,
            ResolutionError::TableNameNotFound { .. } => ErrorKind::TableNameNotFound,
            ResolutionError::IncompleteRule { .. } => ErrorKind::IncompleteRule,
            ResolutionError::CreateTable { .. } => ErrorKind::CreateTable,
            ResolutionError::Collision { .. } => ErrorKind::Collision,
            ResolutionError::Expression { .. } => ErrorKind::Expression,
            ResolutionError::Insert { .. } => ErrorKind::Insert,
            ResolutionError::Values { .. } => ErrorKind::Values,
        }
    }

    /// Key used to collapse duplicate reports: same span, same message
    pub fn dedup_key(&self) -> (usize, usize, &str) {
        let span = self.span();
        (span.start, span.end, self.message())
    }
}

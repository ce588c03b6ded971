// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SqlSema - Semantic Analysis
//!
//! Resolution and validation of parsed statement files against a symbol
//! table of known tables, views, and common table expressions.
//!
//! ## Overview
//!
//! The semantic layer is responsible for:
//! - Resolving select statements into typed result sets
//! - Validating DML statements against the target table's schema
//! - Collecting bind arguments with inferred expected types
//! - Tracking which source files and tables a statement depends on
//!
//! ## Resolution Process
//!
//! ```text
//! Statement AST → Resolver (scope stack) → Resolved values → QueryResults
//! ```
//!
//! A [`Resolver`] carries an immutable symbol table and a stack of scope
//! frames; cloning it is cheap and shares the error sink and the
//! dependency/argument accumulators, so sub-resolutions report into the
//! same place unless explicitly isolated.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sqlsema_semantic::{FileValidator, ValidationStatus};
//!
//! let validator = FileValidator::new(symbol_table);
//! match validator.validate(&file) {
//!     ValidationStatus::Validated { queries, .. } => { /* generate */ }
//!     ValidationStatus::Invalid { errors, .. } => { /* report */ }
//! }
//! ```

pub mod error;
pub mod expr;
pub mod resolver;
pub mod result;
pub mod select;
pub mod table;
pub mod validator;
pub mod validators;

pub use error::{ErrorKind, ResolutionError};
pub use resolver::{Argument, ArgumentType, ErrorSink, Resolver};
pub use result::{expand, merge, result_column_size, QueryResults, Resolved, ResolvedTable, Value};
pub use validator::{path_as_type, FileValidator, StatementRecord, ValidationStatus};
pub use validators::{
    CreateTableValidator, DeleteValidator, InsertValidator, JoinValidator, SelectBodyValidator,
    SelectStmtValidator, UpdateValidator,
};

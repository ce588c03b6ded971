// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # sqlsema - Typed Syntax Tree
//!
//! This crate defines the typed syntax tree the sqlsema semantic analyzer
//! consumes. The grammar and parser that produce these nodes are external
//! collaborators; this crate is the contract they target.
//!
//! Every node carries a byte-offset [`Span`] into the source text of its
//! statement file. Spans are how the analyzer reports errors, deduplicates
//! them, and answers cursor-lookup queries, so parsers must populate them
//! faithfully.
//!
//! ## Layout
//!
//! - [`span`]: byte-offset spans and spanned identifiers
//! - [`expr`]: expression nodes
//! - [`stmt`]: statement and file nodes
//! - [`types`]: the unified [`DataType`] set

pub mod expr;
pub mod span;
pub mod stmt;
pub mod types;

// Re-export commonly used types
pub use expr::{BinaryOp, BindParameter, ColumnRef, Expr, Literal, UnaryOp};
pub use span::{Name, Span};
pub use stmt::{
    Assignment, ColumnConstraint, ColumnDef, CommonTableExpr, CompoundOp, CompoundSelect,
    CreateIndexStmt, CreateTableStmt, CreateTriggerStmt, CreateViewStmt, DeleteStmt,
    ForeignKeyClause, FromClause, ImportStmt, InsertSource, InsertStmt, Join, JoinClause,
    JoinConstraint, JoinOperator, NamedStatement, ResultColumn, SelectBody, SelectCore,
    SelectStmt, SqlFile, StatementKind, TableConstraint, TableOrSubquery, UpdateStmt,
    ValuesClause, ValuesRow, WithClause,
};
pub use types::DataType;

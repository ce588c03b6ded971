// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # sqlsema - Catalog Layer
//!
//! This crate provides the symbol table the semantic analyzer resolves
//! against. It defines:
//!
//! - [`TableSchema`] / [`ColumnSchema`]: schema metadata derived from
//!   `CREATE TABLE` syntax, including the primary-key and unique-constraint
//!   column sets foreign-key validation needs
//! - [`SymbolTable`]: an immutable registry mapping table/view names to their
//!   definitions, combined by structural union when entering a WITH scope
//! - [`SourceTag`]: opaque provenance attached to each entry, reported back
//!   as the dependency set of a resolution
//!
//! ## Immutability
//!
//! A [`SymbolTable`] is never mutated after construction. Resolving a WITH
//! clause produces a *new* table via [`SymbolTable::merge`]; entries are
//! reference-counted so the union copy is cheap. Lookups are identity
//! exact-match and no entry is ever removed.

pub mod error;
pub mod schema;
pub mod symbol_table;

// Re-exports
pub use error::{CatalogError, CatalogResult};
pub use schema::{ColumnSchema, TableSchema};
pub use symbol_table::{SourceTag, SymbolEntry, SymbolTable, TableDefinition};

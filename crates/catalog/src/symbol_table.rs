// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Symbol table
//!
//! The immutable registry of tables, views, and common tables a resolver can
//! select from. Entering a WITH scope produces a new table via
//! [`SymbolTable::merge`]; nothing is ever mutated or removed in place, so a
//! derived resolver can hold its own table without affecting the parent.

use crate::error::{CatalogError, CatalogResult};
use crate::schema::TableSchema;
use serde::{Deserialize, Serialize};
use sqlsema_syntax::stmt::{SelectStmt, SqlFile, StatementKind};
use sqlsema_syntax::{Name, Span};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Opaque provenance of a symbol table entry
///
/// Tags identify where a definition came from (typically a file path) and are
/// reported back as the dependency set of a resolution, driving incremental
/// re-validation in the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceTag(pub String);

impl SourceTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a symbol table name is defined as
#[derive(Debug, Clone, PartialEq)]
pub enum TableDefinition {
    /// A concrete table with a derived schema
    Table(TableSchema),
    /// A view over a select statement
    View { name: Name, select: SelectStmt },
    /// A common table expression introduced by a WITH clause
    CommonTable {
        name: Name,
        /// Explicit column list; empty when omitted
        columns: Vec<Name>,
        select: SelectStmt,
        recursive: bool,
    },
}

impl TableDefinition {
    /// The name this definition is registered under
    pub fn name(&self) -> &str {
        match self {
            TableDefinition::Table(schema) => &schema.name,
            TableDefinition::View { name, .. } | TableDefinition::CommonTable { name, .. } => {
                &name.text
            }
        }
    }

    /// The span of the defining name
    pub fn span(&self) -> Span {
        match self {
            TableDefinition::Table(schema) => schema.span,
            TableDefinition::View { name, .. } | TableDefinition::CommonTable { name, .. } => {
                name.span
            }
        }
    }
}

/// One symbol table entry: a definition plus its provenance
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolEntry {
    pub definition: Arc<TableDefinition>,
    /// Absent for common tables, which are local to one statement
    pub tag: Option<SourceTag>,
}

/// Registry mapping table/view names to their definitions
///
/// Lookups are identity exact-match. Entries are reference-counted so
/// cloning and merging are cheap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    entries: BTreeMap<String, SymbolEntry>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition; a duplicate name is an error
    pub fn insert(
        &mut self,
        definition: TableDefinition,
        tag: Option<SourceTag>,
    ) -> CatalogResult<()> {
        let name = definition.name().to_string();
        if self.entries.contains_key(&name) {
            return Err(CatalogError::DuplicateTable {
                name,
                span: definition.span(),
            });
        }
        self.entries.insert(
            name,
            SymbolEntry {
                definition: Arc::new(definition),
                tag,
            },
        );
        Ok(())
    }

    /// Look up a definition by exact name
    pub fn get(&self, name: &str) -> Option<&SymbolEntry> {
        self.entries.get(name)
    }

    /// All registered names, in sorted order (used for diagnostics)
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Structural union with another table, producing a new table
    ///
    /// Entries of `other` are added to a copy of `self`; a name collision is
    /// an error, and neither input is modified.
    pub fn merge(&self, other: &SymbolTable) -> CatalogResult<SymbolTable> {
        let mut merged = self.clone();
        for (name, entry) in &other.entries {
            if merged.entries.contains_key(name) {
                return Err(CatalogError::DuplicateTable {
                    name: name.clone(),
                    span: entry.definition.span(),
                });
            }
            merged.entries.insert(name.clone(), entry.clone());
        }
        Ok(merged)
    }

    /// Build a symbol table from one validated file
    ///
    /// Registers the file's `CREATE TABLE` schema and its views under the
    /// given tag. Callers accumulate per-file tables with [`Self::merge`] to
    /// form the full resolution environment.
    pub fn from_file(file: &SqlFile, tag: &SourceTag) -> CatalogResult<SymbolTable> {
        let mut table = SymbolTable::new();
        if let Some(create) = &file.create_table {
            table.insert(
                TableDefinition::Table(TableSchema::from_create_table(create)),
                Some(tag.clone()),
            )?;
        }
        for statement in &file.statements {
            if let StatementKind::CreateView(view) = &statement.kind {
                table.insert(
                    TableDefinition::View {
                        name: view.name.clone(),
                        select: (*view.select).clone(),
                    },
                    Some(tag.clone()),
                )?;
            }
        }
        Ok(table)
    }
}

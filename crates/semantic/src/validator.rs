// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # File validation
//!
//! Drives per-file validation: the file's CREATE TABLE first, then every
//! named statement with a fresh resolver, aggregating resolved queries,
//! views, dependency sets, and bind-argument records into a single status.
//! Failure carries the error list deduplicated on (span, message); discovery
//! order is statement traversal order.

use crate::error::ResolutionError;
use crate::resolver::{Argument, Resolver};
use crate::result::{result_column_size, QueryResults};
use crate::validators::{
    CreateTableValidator, DeleteValidator, InsertValidator, UpdateValidator,
};
use serde::Serialize;
use sqlsema_catalog::{SourceTag, SymbolTable};
use sqlsema_syntax::stmt::{NamedStatement, SqlFile, StatementKind};
use sqlsema_syntax::Span;
use std::collections::BTreeSet;

/// Per-statement output: bind arguments and the tables the statement uses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementRecord {
    pub name: String,
    pub arguments: Vec<Argument>,
    pub table_names: BTreeSet<String>,
}

/// Outcome of validating one file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ValidationStatus {
    Validated {
        dependencies: BTreeSet<SourceTag>,
        queries: Vec<QueryResults>,
        views: Vec<QueryResults>,
        statements: Vec<StatementRecord>,
    },
    Invalid {
        /// Deduplicated, in discovery order
        errors: Vec<ResolutionError>,
        /// Whatever dependencies were discovered before failing
        dependencies: BTreeSet<SourceTag>,
    },
}

impl ValidationStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationStatus::Validated { .. })
    }

    pub fn errors(&self) -> &[ResolutionError] {
        match self {
            ValidationStatus::Validated { .. } => &[],
            ValidationStatus::Invalid { errors, .. } => errors,
        }
    }

    pub fn dependencies(&self) -> &BTreeSet<SourceTag> {
        match self {
            ValidationStatus::Validated { dependencies, .. }
            | ValidationStatus::Invalid { dependencies, .. } => dependencies,
        }
    }
}

/// The generated type identity of a statement file
///
/// `com/example/User.sq` becomes `com.example.User`.
pub fn path_as_type(path: &str) -> String {
    let stem = match path.rsplit_once('.') {
        Some((stem, _extension)) => stem,
        None => path,
    };
    stem.replace('/', ".")
}

/// Validates statement files against a symbol table
pub struct FileValidator {
    symbol_table: SymbolTable,
}

impl FileValidator {
    pub fn new(symbol_table: SymbolTable) -> Self {
        Self { symbol_table }
    }

    /// Validate one file into a success or failure status
    pub fn validate(&self, file: &SqlFile) -> ValidationStatus {
        tracing::debug!(path = %file.path, statements = file.statements.len(), "validating file");
        self.validate_inner(file, None).0
    }

    /// What does the identifier at `offset` resolve to?
    ///
    /// Pure query for IDE integration: runs the same resolution as
    /// [`Self::validate`] with a cursor attached and returns the declaring
    /// element of the first identifier match.
    pub fn find_declaration(&self, file: &SqlFile, offset: usize) -> Option<Span> {
        self.validate_inner(file, Some(offset)).1
    }

    fn resolver(&self, cursor: Option<usize>) -> Resolver {
        match cursor {
            Some(offset) => Resolver::with_cursor(self.symbol_table.clone(), offset),
            None => Resolver::new(self.symbol_table.clone()),
        }
    }

    fn validate_inner(&self, file: &SqlFile, cursor: Option<usize>) -> (ValidationStatus, Option<Span>) {
        let mut errors: Vec<ResolutionError> = Vec::new();
        let mut queries: Vec<QueryResults> = Vec::new();
        let mut views: Vec<QueryResults> = Vec::new();
        let mut dependencies: BTreeSet<SourceTag> = BTreeSet::new();
        let mut statements: Vec<StatementRecord> = Vec::new();
        let mut found: Option<Span> = None;

        let mut column_names: BTreeSet<String> = BTreeSet::new();
        let mut statement_names: BTreeSet<String> = BTreeSet::new();

        // the file path mirrors a package-style namespace
        if let Some((folder, file_name)) = file.path.rsplit_once('/') {
            if folder.contains('.') {
                errors.push(ResolutionError::incomplete_rule(
                    file.span,
                    format!(
                        ".sq file parent directory should be package-compatible and not \
                         contain dots. Use {}/{} instead of {}",
                        folder.replace('.', "/"),
                        file_name,
                        file.path
                    ),
                ));
            }
        }

        if let Some(create_table) = &file.create_table {
            let resolver = self.resolver(cursor);
            CreateTableValidator::new(resolver.clone()).validate(create_table);

            for column in &create_table.columns {
                if !column_names.insert(column.name.text.clone()) {
                    errors.push(ResolutionError::create_table(
                        column.name.span,
                        "Duplicate column name",
                    ));
                }
            }
            errors.extend(resolver.errors.take());
            dependencies.extend(resolver.dependencies());
            found = found.or_else(|| resolver.element_found());
            statements.push(StatementRecord {
                name: create_table.name.text.clone(),
                arguments: resolver.arguments(),
                table_names: BTreeSet::new(),
            });
        }

        for statement in &file.statements {
            let resolver = self.resolver(cursor);
            if column_names.contains(&statement.name.text) {
                errors.push(ResolutionError::collision(
                    statement.name.span,
                    "SQL identifier collides with column name",
                ));
            }
            if !statement_names.insert(statement.name.text.clone()) {
                errors.push(ResolutionError::collision(
                    statement.name.span,
                    "Duplicate SQL identifier",
                ));
            }

            match &statement.kind {
                StatementKind::Select(select) => {
                    let errors_before = resolver.errors.len();
                    let resolution = resolver.resolve_select(select, None);
                    if resolver.errors.len() == errors_before {
                        if result_column_size(&resolution) == 0 {
                            errors.push(ResolutionError::expression(
                                select.span,
                                "No result column found",
                            ));
                        } else {
                            queries.push(
                                QueryResults::new(
                                    statement.name.text.clone(),
                                    resolution,
                                    statement.name.span,
                                )
                                .with_type_identity(path_as_type(&file.path))
                                .with_doc(statement.doc.clone())
                                .modify_duplicates(),
                            );
                        }
                    }
                }
                StatementKind::CreateView(view) => {
                    let errors_before = resolver.errors.len();
                    let resolution = resolver.resolve_view_body(view);
                    if resolver.errors.len() == errors_before {
                        if result_column_size(&resolution) == 0 {
                            errors.push(ResolutionError::expression(
                                view.span,
                                "No result column found",
                            ));
                        } else {
                            views.push(
                                QueryResults::new(
                                    view.name.text.clone(),
                                    resolution,
                                    view.name.span,
                                )
                                .with_type_identity(path_as_type(&file.path))
                                .modify_duplicates(),
                            );
                        }
                    }
                }
                StatementKind::Insert(insert) => {
                    InsertValidator::new(resolver.clone()).validate(insert);
                }
                StatementKind::Update(update) => {
                    UpdateValidator::new(resolver.clone()).validate(update);
                }
                StatementKind::Delete(delete) => {
                    DeleteValidator::new(resolver.clone()).validate(delete);
                }
                StatementKind::CreateIndex(index) => {
                    if let Some(resolution) = resolver.resolve_table_name(&index.table) {
                        for column in &index.columns {
                            resolver.resolve_column_in(&resolution, column, None);
                        }
                    }
                }
                StatementKind::CreateTrigger(trigger) => {
                    resolver.resolve_table_name(&trigger.table);
                }
            }

            errors.extend(resolver.errors.take());
            dependencies.extend(resolver.dependencies());
            found = found.or_else(|| resolver.element_found());
            statements.push(StatementRecord {
                name: statement.name.text.clone(),
                arguments: resolver.arguments(),
                table_names: table_names(statement, &resolver),
            });
        }

        let mut import_types: BTreeSet<String> = BTreeSet::new();
        for import in &file.imports {
            if !import_types.insert(import.simple_name().to_string()) {
                errors.push(ResolutionError::collision(
                    import.type_name.span,
                    format!("Multiple imports for type {}", import.simple_name()),
                ));
            }
        }

        let status = if errors.is_empty() {
            ValidationStatus::Validated {
                dependencies,
                queries,
                views,
                statements,
            }
        } else {
            ValidationStatus::Invalid {
                errors: dedup(errors),
                dependencies,
            }
        };
        (status, found)
    }
}

/// The table names a statement is recorded against, derived per kind
///
/// Selects and views report the transitive table set touched during
/// resolution; DML and DDL statements report their target table.
fn table_names(statement: &NamedStatement, resolver: &Resolver) -> BTreeSet<String> {
    match &statement.kind {
        StatementKind::Select(_) | StatementKind::CreateView(_) => resolver.table_dependencies(),
        StatementKind::Insert(insert) => BTreeSet::from([insert.table.text.clone()]),
        StatementKind::Update(update) => BTreeSet::from([update.table.text.clone()]),
        StatementKind::Delete(delete) => BTreeSet::from([delete.table.text.clone()]),
        StatementKind::CreateIndex(index) => BTreeSet::from([index.table.text.clone()]),
        StatementKind::CreateTrigger(trigger) => BTreeSet::from([trigger.table.text.clone()]),
    }
}

/// Collapse errors with identical span and message, keeping first occurrence
fn dedup(errors: Vec<ResolutionError>) -> Vec<ResolutionError> {
    let mut seen: BTreeSet<(usize, usize, String)> = BTreeSet::new();
    errors
        .into_iter()
        .filter(|error| {
            let (start, end, message) = error.dedup_key();
            seen.insert((start, end, message.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_as_type() {
        assert_eq!(path_as_type("com/example/User.sq"), "com.example.User");
        assert_eq!(path_as_type("User.sq"), "User");
        assert_eq!(path_as_type("plain"), "plain");
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let a = ResolutionError::expression(Span::new(1, 2), "x");
        let b = ResolutionError::expression(Span::new(1, 2), "x");
        let c = ResolutionError::expression(Span::new(1, 2), "y");
        let deduped = dedup(vec![a.clone(), b, c.clone()]);
        assert_eq!(deduped, vec![a, c]);
    }
}

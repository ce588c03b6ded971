// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! INSERT validation
//!
//! Resolves the target table, works out the expected column sequence (the
//! explicit column list, nothing for DEFAULT VALUES, or the full table
//! expansion), verifies every required column is covered, and checks the
//! supplied values against the expected arity and types.

use crate::error::ResolutionError;
use crate::resolver::Resolver;
use crate::result::{expand, result_column_size, Resolved, Value};
use sqlsema_syntax::stmt::{InsertSource, InsertStmt};

pub struct InsertValidator {
    resolver: Resolver,
    /// Outer scope supplied by an enclosing statement; empty at top level
    scoped_values: Vec<Resolved>,
}

impl InsertValidator {
    pub fn new(resolver: Resolver) -> Self {
        Self {
            resolver,
            scoped_values: Vec::new(),
        }
    }

    pub fn with_scope(resolver: Resolver, scoped_values: Vec<Resolved>) -> Self {
        Self {
            resolver,
            scoped_values,
        }
    }

    pub fn validate(&self, insert: &InsertStmt) {
        let resolution = self
            .resolver
            .resolve_table_name(&insert.table)
            .unwrap_or_default();

        let expected_types: Vec<Option<Value>> = if !insert.columns.is_empty() {
            insert
                .columns
                .iter()
                .map(|column| self.resolver.resolve_column_in(&resolution, column, None))
                .collect()
        } else if matches!(insert.source, InsertSource::DefaultValues) {
            vec![]
        } else {
            expand(&resolution).into_iter().map(Some).collect()
        };

        // Verify that the required columns are included.
        let missing: Vec<Value> = expand(&resolution)
            .into_iter()
            .filter(|column| !column.nullable && !column.has_default)
            .filter(|required| {
                !expected_types
                    .iter()
                    .flatten()
                    .any(|expected| expected.name == required.name)
            })
            .collect();
        if missing.len() == 1 {
            self.resolver.errors.push(ResolutionError::insert(
                insert.span,
                format!(
                    "Cannot populate default value for column {}, it must be specified in \
                     insert statement.",
                    missing[0].name
                ),
            ));
        } else if missing.len() > 1 {
            let names: Vec<&str> = missing.iter().map(|c| c.name.as_str()).collect();
            self.resolver.errors.push(ResolutionError::insert(
                insert.span,
                format!(
                    "Cannot populate default values for columns ({}), they must be specified \
                     in insert statement.",
                    names.join(", ")
                ),
            ));
        }

        let resolver = match &insert.with {
            Some(with) => match self.resolver.with_resolver(with) {
                Ok(resolver) => resolver,
                Err(error) => {
                    self.resolver.errors.push(ResolutionError::with_table(
                        error.span(),
                        error.to_string(),
                    ));
                    self.resolver.clone()
                }
            },
            None => self.resolver.clone(),
        };

        let errors_before = resolver.errors.len();
        let values_being_inserted: Vec<Resolved> = match &insert.source {
            InsertSource::Values(values) => {
                if let Some(first) = values.rows.first() {
                    if first.exprs.len() != expected_types.len() {
                        resolver.errors.push(ResolutionError::insert(
                            values.span,
                            format!(
                                "Unexpected number of values being inserted. found: {} expected: {}",
                                first.exprs.len(),
                                expected_types.len()
                            ),
                        ));
                    }
                }
                resolver
                    .with_scoped_values(self.scoped_values.clone())
                    .resolve_values(values, &expected_types)
            }
            InsertSource::Select(select) => resolver.resolve_select(select, None),
            // Inserting default values, no need to check against column size.
            InsertSource::DefaultValues => return,
        };

        let column_size = if !insert.columns.is_empty() {
            insert.columns.len()
        } else {
            result_column_size(&resolution)
        };
        let found = result_column_size(&values_being_inserted);
        if errors_before == resolver.errors.len() && found != column_size {
            let span = match &insert.source {
                InsertSource::Values(values) => values.span,
                InsertSource::Select(select) => select.span,
                InsertSource::DefaultValues => insert.span,
            };
            resolver.errors.push(ResolutionError::insert(
                span,
                format!(
                    "Unexpected number of values being inserted. found: {found} expected: {column_size}"
                ),
            ));
        }
    }
}

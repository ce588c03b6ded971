// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! UPDATE validation
//!
//! Resolves the target table, scopes an optional WITH clause, and checks the
//! WHERE clause as boolean. Each `SET column = expr` pair resolves the column
//! against the target table and propagates its declared type into the value
//! expression, so a bind argument on the right-hand side is typed by the
//! column it assigns.

use crate::error::ResolutionError;
use crate::resolver::{ArgumentType, Resolver};
use crate::result::Resolved;
use sqlsema_syntax::stmt::UpdateStmt;

pub struct UpdateValidator {
    resolver: Resolver,
    /// Outer scope supplied by an enclosing statement; empty at top level
    scoped_values: Vec<Resolved>,
}

impl UpdateValidator {
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

    pub fn validate(&self, update: &UpdateStmt) {
        let resolution = self
            .resolver
            .resolve_table_name(&update.table)
            .unwrap_or_default();

        let sub_resolver = match &update.with {
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

        // the outer scope sits beneath the target table's own scope
        let sub_resolver = sub_resolver
            .with_scoped_values(self.scoped_values.clone())
            .with_scoped_values(resolution.clone());

        if let Some(where_clause) = &update.where_clause {
            sub_resolver.resolve_expr(where_clause, Some(&ArgumentType::Boolean));
        }

        for assignment in &update.assignments {
            let column_value =
                self.resolver
                    .resolve_column_in(&resolution, &assignment.column, None);
            sub_resolver.resolve_expr(
                &assignment.value,
                Some(&ArgumentType::SingleValue(column_value)),
            );
        }
    }
}

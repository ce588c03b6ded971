// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! DELETE validation
//!
//! Resolves the target table, scopes an optional WITH clause with the same
//! fallback behavior as select, and checks the WHERE clause as boolean.

use crate::error::ResolutionError;
use crate::resolver::{ArgumentType, Resolver};
use crate::result::Resolved;
use sqlsema_syntax::stmt::DeleteStmt;

pub struct DeleteValidator {
    resolver: Resolver,
    /// Outer scope supplied by an enclosing statement; empty at top level
    scoped_values: Vec<Resolved>,
}

impl DeleteValidator {
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

    pub fn validate(&self, delete: &DeleteStmt) {
        let resolution = self
            .resolver
            .resolve_table_name(&delete.table)
            .unwrap_or_default();

        let resolver = match &delete.with {
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

        let resolver = resolver
            .with_scoped_values(self.scoped_values.clone())
            .with_scoped_values(resolution);

        if let Some(where_clause) = &delete.where_clause {
            resolver.resolve_expr(where_clause, Some(&ArgumentType::Boolean));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlsema_catalog::{ColumnSchema, SymbolTable, TableDefinition, TableSchema};
    use sqlsema_syntax::expr::{ColumnRef, Expr};
    use sqlsema_syntax::{DataType, Name, Span};

    fn symbol_table() -> SymbolTable {
        let schema = TableSchema::new("users", Span::new(13, 18)).with_columns(vec![
            ColumnSchema::new("id", DataType::Integer, Span::new(21, 23)).primary_key(),
            ColumnSchema::new("name", DataType::Text, Span::new(40, 44)),
        ]);
        let mut table = SymbolTable::new();
        table.insert(TableDefinition::Table(schema), None).unwrap();
        table
    }

    #[test]
    fn test_unknown_target_table() {
        let resolver = Resolver::new(symbol_table());
        let delete = DeleteStmt {
            with: None,
            table: Name::new("sessions", Span::new(12, 20)),
            where_clause: None,
            span: Span::new(0, 21),
        };
        DeleteValidator::new(resolver.clone()).validate(&delete);
        let errors = resolver.errors.take();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), "Cannot find table or view sessions");
    }

    #[test]
    fn test_where_is_checked_as_boolean() {
        let resolver = Resolver::new(symbol_table());
        let delete = DeleteStmt {
            with: None,
            table: Name::new("users", Span::new(12, 17)),
            where_clause: Some(Expr::Column(ColumnRef::new(Name::new(
                "name",
                Span::new(24, 28),
            )))),
            span: Span::new(0, 29),
        };
        DeleteValidator::new(resolver.clone()).validate(&delete);
        let errors = resolver.errors.take();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), "Expected a boolean expression");
    }
}

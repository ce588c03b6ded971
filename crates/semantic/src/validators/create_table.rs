// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! CREATE TABLE validation
//!
//! Checks column constraints, table constraints, and foreign keys. The table
//! being defined is resolved into scope first so constraint expressions can
//! reference sibling columns. A foreign key may be given its index a few
//! different ways:
//!
//! - no columns supplied: the index is the foreign table's primary key
//! - columns supplied: they must carry a unique constraint with the same
//!   collation as the table, and the full set must match an existing unique
//!   index exactly

use crate::error::ResolutionError;
use crate::resolver::{ArgumentType, Resolver};
use crate::result::{Resolved, ResolvedTable, Value};
use sqlsema_catalog::TableSchema;
use sqlsema_syntax::stmt::{
    ColumnConstraint, CreateTableStmt, ForeignKeyClause, TableConstraint,
};
use sqlsema_syntax::Name;

pub struct CreateTableValidator {
    resolver: Resolver,
}

impl CreateTableValidator {
    pub fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }

    pub fn validate(&self, create_table: &CreateTableStmt) {
        let schema = TableSchema::from_create_table(create_table);
        let resolution = self
            .resolver
            .table_under_definition(&schema, create_table.name.span);
        let scoped = self.resolver.with_scoped_values(resolution.clone());

        // constraint expressions see the sibling columns
        for def in &create_table.columns {
            for constraint in &def.constraints {
                match constraint {
                    ColumnConstraint::Check(expr) => {
                        scoped.resolve_expr(expr, Some(&ArgumentType::Boolean));
                    }
                    ColumnConstraint::Default(expr) => {
                        scoped.resolve_expr(expr, None);
                    }
                    _ => {}
                }
            }
        }

        for constraint in &create_table.constraints {
            match constraint {
                TableConstraint::Check(expr) => {
                    scoped.resolve_expr(expr, Some(&ArgumentType::Boolean));
                }
                TableConstraint::PrimaryKey { columns, .. }
                | TableConstraint::Unique { columns, .. } => {
                    for column in columns {
                        self.resolver.resolve_column_in(&resolution, column, None);
                    }
                }
                TableConstraint::ForeignKey { columns, .. } => {
                    for column in columns {
                        self.resolver.resolve_column_in(&resolution, column, None);
                    }
                }
            }
        }

        for def in &create_table.columns {
            let primary_keys = def
                .constraints
                .iter()
                .filter(|c| matches!(c, ColumnConstraint::PrimaryKey(_)))
                .count();
            if primary_keys > 1 {
                self.resolver.errors.push(ResolutionError::create_table(
                    def.span,
                    "Column can only have one primary key on a column",
                ));
            }
            let uniques = def
                .constraints
                .iter()
                .filter(|c| matches!(c, ColumnConstraint::Unique(_)))
                .count();
            if uniques > 1 {
                self.resolver.errors.push(ResolutionError::create_table(
                    def.span,
                    "Column can only have one unique constraint on a column",
                ));
            }
        }

        for def in &create_table.columns {
            for constraint in &def.constraints {
                if let ColumnConstraint::ForeignKey(clause) = constraint {
                    self.validate_column_foreign_key(clause);
                }
            }
        }

        for constraint in &create_table.constraints {
            if let TableConstraint::ForeignKey { columns, clause, .. } = constraint {
                self.validate_table_foreign_key(columns, clause);
            }
        }
    }

    fn validate_column_foreign_key(&self, clause: &ForeignKeyClause) {
        if clause.columns.len() > 1 {
            self.resolver.errors.push(ResolutionError::create_table(
                clause.span,
                "Column can only reference a single foreign key",
            ));
            return;
        }

        let Some(foreign) = self.resolver.foreign_table_schema(&clause.foreign_table) else {
            return;
        };

        if clause.columns.is_empty() {
            // must map to the foreign table's primary key, which must be
            // exactly one column long
            if foreign.primary_key.len() != 1 {
                self.resolver.errors.push(ResolutionError::create_table(
                    clause.span,
                    format!(
                        "Table {} has a composite primary key",
                        clause.foreign_table.text
                    ),
                ));
            }
            return;
        }

        let indexed = indexed_columns(&foreign);
        let errors_before = self.resolver.errors.len();
        for column in &clause.columns {
            self.resolver.resolve_column_in(
                &indexed,
                column,
                Some(format!(
                    "No column with unique constraint found with name {}",
                    column.text
                )),
            );
        }
        let column_names: Vec<String> =
            clause.columns.iter().map(|c| c.text.clone()).collect();
        if errors_before == self.resolver.errors.len()
            && !foreign.has_index_with_columns(&column_names)
        {
            self.resolver.errors.push(ResolutionError::create_table(
                clause.span,
                format!(
                    "Table {} does not have a unique index on column {}",
                    clause.foreign_table.text, clause.columns[0].text
                ),
            ));
        }
    }

    fn validate_table_foreign_key(&self, columns: &[Name], clause: &ForeignKeyClause) {
        let Some(foreign) = self.resolver.foreign_table_schema(&clause.foreign_table) else {
            return;
        };

        if clause.columns.is_empty() {
            // must match the foreign table's primary key index exactly
            if foreign.primary_key.len() != columns.len() {
                self.resolver.errors.push(ResolutionError::create_table(
                    clause.span,
                    format!(
                        "Foreign key constraint must match the primary key of the foreign \
                         table exactly. Constraint has {} columns and foreign table primary \
                         key has {} columns",
                        columns.len(),
                        foreign.primary_key.len()
                    ),
                ));
            }
            return;
        }

        let column_names: Vec<String> =
            clause.columns.iter().map(|c| c.text.clone()).collect();
        if !foreign.has_index_with_columns(&column_names) {
            self.resolver.errors.push(ResolutionError::create_table(
                clause.span,
                format!(
                    "Table {} does not have a unique index on columns [{}]",
                    clause.foreign_table.text,
                    column_names.join(", ")
                ),
            ));
        }
    }
}

/// The foreign table's primary key and unique-constraint columns, as a scope
fn indexed_columns(schema: &TableSchema) -> Vec<Resolved> {
    let mut seen: Vec<&str> = Vec::new();
    let mut columns: Vec<Value> = Vec::new();
    let candidates = schema
        .primary_key_columns()
        .into_iter()
        .chain(schema.unique_constraint_columns().into_iter().flatten());
    for column in candidates {
        if !seen.contains(&column.name.as_str()) {
            seen.push(&column.name);
            columns.push(Value::from_column(column));
        }
    }
    vec![Resolved::Table(ResolvedTable {
        name: schema.name.clone(),
        columns,
        tag: None,
        element: schema.span,
    })]
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlsema_catalog::{ColumnSchema, SymbolTable, TableDefinition};
    use sqlsema_syntax::stmt::ColumnDef;
    use sqlsema_syntax::{DataType, Span};

    fn name(text: &str, start: usize) -> Name {
        Name::new(text, Span::new(start, start + text.len()))
    }

    fn users_symbol_table() -> SymbolTable {
        let schema = TableSchema::new("users", Span::new(13, 18))
            .with_columns(vec![
                ColumnSchema::new("id", DataType::Integer, Span::new(21, 23)).primary_key(),
                ColumnSchema::new("email", DataType::Text, Span::new(40, 45)).not_null(),
            ])
            .with_unique(vec!["email".to_string()]);
        let mut table = SymbolTable::new();
        table.insert(TableDefinition::Table(schema), None).unwrap();
        table
    }

    fn validate(create: &CreateTableStmt) -> Vec<ResolutionError> {
        let resolver = Resolver::new(users_symbol_table());
        CreateTableValidator::new(resolver.clone()).validate(create);
        resolver.errors.take()
    }

    #[test]
    fn test_double_primary_key_single_error() {
        let create = CreateTableStmt {
            name: name("posts", 113),
            columns: vec![ColumnDef::new(name("id", 121), DataType::Integer)
                .with_constraint(ColumnConstraint::PrimaryKey(Span::new(132, 143)))
                .with_constraint(ColumnConstraint::PrimaryKey(Span::new(144, 155)))],
            constraints: vec![],
            span: Span::new(100, 160),
        };
        let errors = validate(&create);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message(),
            "Column can only have one primary key on a column"
        );
    }

    #[test]
    fn test_foreign_key_to_single_column_primary_key() {
        let create = CreateTableStmt {
            name: name("posts", 113),
            columns: vec![ColumnDef::new(name("author_id", 121), DataType::Integer)
                .with_constraint(ColumnConstraint::ForeignKey(ForeignKeyClause {
                    foreign_table: name("users", 150),
                    columns: vec![],
                    span: Span::new(139, 156),
                }))],
            constraints: vec![],
            span: Span::new(100, 160),
        };
        assert!(validate(&create).is_empty());
    }

    #[test]
    fn test_foreign_key_column_without_unique_index() {
        let create = CreateTableStmt {
            name: name("posts", 113),
            columns: vec![ColumnDef::new(name("author_id", 121), DataType::Integer)
                .with_constraint(ColumnConstraint::ForeignKey(ForeignKeyClause {
                    foreign_table: name("users", 150),
                    columns: vec![name("missing", 157)],
                    span: Span::new(139, 166),
                }))],
            constraints: vec![],
            span: Span::new(100, 170),
        };
        let errors = validate(&create);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message(),
            "No column with unique constraint found with name missing"
        );
    }

    #[test]
    fn test_foreign_key_columns_must_form_an_index() {
        // id and email are each uniquely indexed, but not together
        let create = CreateTableStmt {
            name: name("posts", 113),
            columns: vec![
                ColumnDef::new(name("a", 121), DataType::Integer),
                ColumnDef::new(name("b", 131), DataType::Text),
            ],
            constraints: vec![TableConstraint::ForeignKey {
                columns: vec![name("a", 153), name("b", 156)],
                clause: ForeignKeyClause {
                    foreign_table: name("users", 170),
                    columns: vec![name("id", 177), name("email", 181)],
                    span: Span::new(160, 187),
                },
                span: Span::new(140, 187),
            }],
            span: Span::new(100, 190),
        };
        let errors = validate(&create);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message(),
            "Table users does not have a unique index on columns [id, email]"
        );
    }

    #[test]
    fn test_table_foreign_key_arity_against_primary_key() {
        let create = CreateTableStmt {
            name: name("posts", 113),
            columns: vec![
                ColumnDef::new(name("a", 121), DataType::Integer),
                ColumnDef::new(name("b", 131), DataType::Integer),
            ],
            constraints: vec![TableConstraint::ForeignKey {
                columns: vec![name("a", 153), name("b", 156)],
                clause: ForeignKeyClause {
                    foreign_table: name("users", 170),
                    columns: vec![],
                    span: Span::new(160, 176),
                },
                span: Span::new(140, 176),
            }],
            span: Span::new(100, 180),
        };
        let errors = validate(&create);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message(),
            "Foreign key constraint must match the primary key of the foreign table \
             exactly. Constraint has 2 columns and foreign table primary key has 1 columns"
        );
    }
}

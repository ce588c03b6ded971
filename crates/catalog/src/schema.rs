// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Schema metadata
//!
//! Column and table schemas derived from `CREATE TABLE` syntax. The derived
//! form keeps the source spans of declarations so resolution errors and
//! cursor lookups can point back at them, and precomputes the primary-key
//! and unique-constraint column sets that foreign-key validation checks
//! against.

use serde::{Deserialize, Serialize};
use sqlsema_syntax::stmt::{ColumnConstraint, CreateTableStmt, TableConstraint};
use sqlsema_syntax::{DataType, Span};

/// Metadata for one table column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name
    pub name: String,
    /// Declared data type
    pub data_type: DataType,
    /// Whether the column admits NULL (no NOT NULL and no PRIMARY KEY)
    pub nullable: bool,
    /// Whether the column declares a DEFAULT expression
    pub has_default: bool,
    /// Whether the column is part of the primary key
    pub is_primary_key: bool,
    /// Span of the column name in the defining file
    pub span: Span,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, data_type: DataType, span: Span) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            has_default: false,
            is_primary_key: false,
            span,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.nullable = false;
        self
    }
}

/// Metadata for one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name
    pub name: String,
    /// Column definitions in declared order
    pub columns: Vec<ColumnSchema>,
    /// Primary key column names, in constraint order
    pub primary_key: Vec<String>,
    /// Unique constraints: each entry is the column set of one constraint
    pub unique_constraints: Vec<Vec<String>>,
    /// Span of the table name in the defining file
    pub span: Span,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            unique_constraints: Vec::new(),
            span,
        }
    }

    pub fn with_columns(mut self, columns: Vec<ColumnSchema>) -> Self {
        for column in &columns {
            if column.is_primary_key {
                self.primary_key.push(column.name.clone());
            }
        }
        self.columns = columns;
        self
    }

    pub fn with_unique(mut self, columns: Vec<String>) -> Self {
        self.unique_constraints.push(columns);
        self
    }

    /// Derive a schema from a `CREATE TABLE` statement
    ///
    /// Constraint *violations* (duplicate primary keys, dangling foreign
    /// keys) are not diagnosed here; the create-table validator owns those.
    /// This derivation is structural only.
    pub fn from_create_table(create: &CreateTableStmt) -> Self {
        let mut schema = TableSchema::new(create.name.text.clone(), create.name.span);

        for def in &create.columns {
            let mut column = ColumnSchema::new(def.name.text.clone(), def.data_type, def.name.span);
            for constraint in &def.constraints {
                match constraint {
                    ColumnConstraint::PrimaryKey(_) => {
                        column.is_primary_key = true;
                        column.nullable = false;
                    }
                    ColumnConstraint::NotNull(_) => column.nullable = false,
                    ColumnConstraint::Unique(_) => {
                        schema.unique_constraints.push(vec![def.name.text.clone()]);
                    }
                    ColumnConstraint::Default(_) => column.has_default = true,
                    ColumnConstraint::Check(_) | ColumnConstraint::ForeignKey(_) => {}
                }
            }
            if column.is_primary_key {
                schema.primary_key.push(column.name.clone());
            }
            schema.columns.push(column);
        }

        for constraint in &create.constraints {
            match constraint {
                TableConstraint::PrimaryKey { columns, .. } => {
                    for name in columns {
                        if !schema.primary_key.contains(&name.text) {
                            schema.primary_key.push(name.text.clone());
                        }
                        if let Some(column) = schema.column_mut(&name.text) {
                            column.is_primary_key = true;
                            column.nullable = false;
                        }
                    }
                }
                TableConstraint::Unique { columns, .. } => {
                    schema
                        .unique_constraints
                        .push(columns.iter().map(|c| c.text.clone()).collect());
                }
                TableConstraint::Check(_) | TableConstraint::ForeignKey { .. } => {}
            }
        }

        schema
    }

    /// Get a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    fn column_mut(&mut self, name: &str) -> Option<&mut ColumnSchema> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// The primary key columns, in constraint order
    pub fn primary_key_columns(&self) -> Vec<&ColumnSchema> {
        self.primary_key
            .iter()
            .filter_map(|name| self.column(name))
            .collect()
    }

    /// The column sets of each unique constraint
    pub fn unique_constraint_columns(&self) -> Vec<Vec<&ColumnSchema>> {
        self.unique_constraints
            .iter()
            .map(|names| names.iter().filter_map(|n| self.column(n)).collect())
            .collect()
    }

    /// Whether some unique index (the primary key or a unique constraint)
    /// consists of exactly the given column set, in any order
    pub fn has_index_with_columns(&self, columns: &[String]) -> bool {
        self.unique_constraints
            .iter()
            .chain(std::iter::once(&self.primary_key))
            .any(|index| {
                columns.len() == index.len() && index.iter().all(|c| columns.contains(c))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlsema_syntax::stmt::{ColumnDef, ForeignKeyClause};
    use sqlsema_syntax::Name;

    fn name(text: &str) -> Name {
        Name::new(text, Span::default())
    }

    fn users_create_table() -> CreateTableStmt {
        CreateTableStmt {
            name: name("users"),
            columns: vec![
                ColumnDef::new(name("id"), DataType::Integer)
                    .with_constraint(ColumnConstraint::PrimaryKey(Span::default())),
                ColumnDef::new(name("email"), DataType::Text)
                    .with_constraint(ColumnConstraint::NotNull(Span::default()))
                    .with_constraint(ColumnConstraint::Unique(Span::default())),
                ColumnDef::new(name("bio"), DataType::Text),
            ],
            constraints: vec![],
            span: Span::default(),
        }
    }

    #[test]
    fn test_from_create_table_columns() {
        let schema = TableSchema::from_create_table(&users_create_table());
        assert_eq!(schema.name, "users");
        assert_eq!(schema.columns.len(), 3);

        let id = schema.column("id").unwrap();
        assert!(id.is_primary_key);
        assert!(!id.nullable);

        let email = schema.column("email").unwrap();
        assert!(!email.nullable);
        assert!(!email.is_primary_key);

        let bio = schema.column("bio").unwrap();
        assert!(bio.nullable);
    }

    #[test]
    fn test_from_create_table_indexes() {
        let schema = TableSchema::from_create_table(&users_create_table());
        assert_eq!(schema.primary_key, vec!["id".to_string()]);
        assert_eq!(schema.unique_constraints, vec![vec!["email".to_string()]]);

        assert!(schema.has_index_with_columns(&["id".to_string()]));
        assert!(schema.has_index_with_columns(&["email".to_string()]));
        assert!(!schema.has_index_with_columns(&["bio".to_string()]));
        assert!(!schema.has_index_with_columns(&["id".to_string(), "email".to_string()]));
    }

    #[test]
    fn test_table_level_primary_key() {
        let create = CreateTableStmt {
            name: name("membership"),
            columns: vec![
                ColumnDef::new(name("user_id"), DataType::Integer),
                ColumnDef::new(name("group_id"), DataType::Integer),
            ],
            constraints: vec![TableConstraint::PrimaryKey {
                columns: vec![name("user_id"), name("group_id")],
                span: Span::default(),
            }],
            span: Span::default(),
        };
        let schema = TableSchema::from_create_table(&create);
        assert_eq!(schema.primary_key.len(), 2);
        assert!(!schema.column("user_id").unwrap().nullable);
        assert!(schema.has_index_with_columns(&["group_id".to_string(), "user_id".to_string()]));
    }

    #[test]
    fn test_foreign_key_clause_ignored_structurally() {
        let create = CreateTableStmt {
            name: name("orders"),
            columns: vec![ColumnDef::new(name("user_id"), DataType::Integer)
                .with_constraint(ColumnConstraint::ForeignKey(ForeignKeyClause {
                    foreign_table: name("users"),
                    columns: vec![],
                    span: Span::default(),
                }))],
            constraints: vec![],
            span: Span::default(),
        };
        let schema = TableSchema::from_create_table(&create);
        assert!(schema.primary_key.is_empty());
        assert!(schema.unique_constraints.is_empty());
    }
}

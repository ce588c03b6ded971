// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Schema and symbol-table fixtures
//!
//! A small `users` / `orders` schema reused across resolver and validator
//! tests, registered under per-file source tags so dependency-tracking
//! assertions have something to observe.

use sqlsema_catalog::{SourceTag, SymbolTable, TableSchema};
use sqlsema_syntax::stmt::{ColumnConstraint, ColumnDef, CreateTableStmt, SqlFile};
use sqlsema_syntax::{DataType, Name, Span};

/// Canonical test schemas
pub struct SchemaFixtures;

impl SchemaFixtures {
    /// Tag the `users` table is registered under
    pub fn users_tag() -> SourceTag {
        SourceTag::new("com/example/User.sq")
    }

    /// Tag the `orders` table is registered under
    pub fn orders_tag() -> SourceTag {
        SourceTag::new("com/example/Order.sq")
    }

    /// `CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, email TEXT)`
    pub fn users_create_table() -> CreateTableStmt {
        CreateTableStmt {
            name: Name::new("users", Span::new(13, 18)),
            columns: vec![
                ColumnDef::new(Name::new("id", Span::new(22, 24)), DataType::Integer)
                    .with_constraint(ColumnConstraint::PrimaryKey(Span::new(33, 44))),
                ColumnDef::new(Name::new("name", Span::new(48, 52)), DataType::Text)
                    .with_constraint(ColumnConstraint::NotNull(Span::new(58, 66))),
                ColumnDef::new(Name::new("email", Span::new(70, 75)), DataType::Text),
            ],
            constraints: vec![],
            span: Span::new(0, 82),
        }
    }

    /// `CREATE TABLE orders (id INTEGER PRIMARY KEY, user_id INTEGER NOT NULL, total REAL NOT NULL)`
    pub fn orders_create_table() -> CreateTableStmt {
        CreateTableStmt {
            name: Name::new("orders", Span::new(113, 119)),
            columns: vec![
                ColumnDef::new(Name::new("id", Span::new(123, 125)), DataType::Integer)
                    .with_constraint(ColumnConstraint::PrimaryKey(Span::new(134, 145))),
                ColumnDef::new(Name::new("user_id", Span::new(149, 156)), DataType::Integer)
                    .with_constraint(ColumnConstraint::NotNull(Span::new(165, 173))),
                ColumnDef::new(Name::new("total", Span::new(177, 182)), DataType::Real)
                    .with_constraint(ColumnConstraint::NotNull(Span::new(188, 196))),
            ],
            constraints: vec![],
            span: Span::new(100, 199),
        }
    }

    pub fn users_schema() -> TableSchema {
        TableSchema::from_create_table(&Self::users_create_table())
    }

    pub fn orders_schema() -> TableSchema {
        TableSchema::from_create_table(&Self::orders_create_table())
    }

    /// The `users` definition file, as a validator caller would hold it
    pub fn users_file() -> SqlFile {
        SqlFile {
            path: Self::users_tag().0,
            create_table: Some(Self::users_create_table()),
            imports: vec![],
            statements: vec![],
            span: Span::new(0, 82),
        }
    }

    /// The `orders` definition file
    pub fn orders_file() -> SqlFile {
        SqlFile {
            path: Self::orders_tag().0,
            create_table: Some(Self::orders_create_table()),
            imports: vec![],
            statements: vec![],
            span: Span::new(100, 199),
        }
    }

    /// Symbol table containing only `users`
    pub fn users_only() -> SymbolTable {
        SymbolTable::from_file(&Self::users_file(), &Self::users_tag()).expect("fresh table")
    }

    /// Symbol table containing `users` and `orders`
    pub fn users_and_orders() -> SymbolTable {
        let orders = SymbolTable::from_file(&Self::orders_file(), &Self::orders_tag())
            .expect("fresh table");
        Self::users_only().merge(&orders).expect("distinct names")
    }
}

// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Select clause validation
//!
//! Stateless checks of a select's clauses against the scope the resolver
//! assembled from the FROM sources: WHERE and HAVING must be boolean, GROUP
//! BY expressions must resolve, and the enclosing statement's ORDER BY and
//! LIMIT are checked once the inner scope is known.

use crate::resolver::{ArgumentType, Resolver};
use crate::result::Value;
use sqlsema_syntax::stmt::{SelectBody, SelectStmt};
use sqlsema_syntax::DataType;

/// Validates one select body's WHERE / GROUP BY / HAVING
pub struct SelectBodyValidator {
    resolver: Resolver,
}

impl SelectBodyValidator {
    pub fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }

    pub fn validate(&self, body: &SelectBody) {
        if let Some(where_clause) = &body.where_clause {
            self.resolver
                .resolve_expr(where_clause, Some(&ArgumentType::Boolean));
        }
        for expr in &body.group_by {
            self.resolver.resolve_expr(expr, None);
        }
        if let Some(having) = &body.having {
            self.resolver
                .resolve_expr(having, Some(&ArgumentType::Boolean));
        }
    }
}

/// Validates the enclosing select's ORDER BY / LIMIT / OFFSET
pub struct SelectStmtValidator {
    resolver: Resolver,
}

impl SelectStmtValidator {
    pub fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }

    pub fn validate(&self, select: &SelectStmt) {
        for ordering in &select.order_by {
            self.resolver.resolve_expr(ordering, None);
        }
        for limit in [&select.limit, &select.offset].into_iter().flatten() {
            let expected = ArgumentType::SingleValue(Some(Value::new(
                "expr",
                DataType::Integer,
                false,
                limit.span(),
            )));
            self.resolver.resolve_expr(limit, Some(&expected));
        }
    }
}

// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Select resolution
//!
//! Takes SQL that evaluates to a result set and returns the columns it
//! produces, accumulating errors, dependencies, and bind arguments as side
//! effects. Example:
//!
//! ```sql
//! SELECT *
//! FROM (
//!   SELECT column1
//!   FROM test
//!   WHERE column2 = 'stuff'
//! );
//! ```
//!
//! 1. The resolver is asked to resolve the top level select statement.
//! 2. It recursively resolves the second level select statement.
//! 3. `test` resolves to the set of `test.column1`, `test.column2`, which
//!    becomes the inner scope.
//! 4. The inner body's clauses are validated against that scope, then the
//!    projection narrows it to `test.column1`.
//! 5. The recursive call returns with `test.column1`, which becomes the
//!    outer scope, and `*` projects it unchanged.
//!
//! The resolver is stateful and the validators are stateless: validators
//! check clauses against an assembled scope, resolvers build that scope and
//! report anything that depends on it.

use crate::error::ResolutionError;
use crate::resolver::{ArgumentType, Resolver};
use crate::result::{merge, result_column_size, Resolved, Value};
use crate::validators::join::JoinValidator;
use crate::validators::select::{SelectBodyValidator, SelectStmtValidator};
use sqlsema_syntax::stmt::{
    CreateViewStmt, FromClause, JoinClause, JoinOperator, ResultColumn, SelectCore, SelectStmt,
    ValuesClause,
};
use sqlsema_syntax::Name;

impl Resolver {
    /// Resolve a select statement to its result columns
    ///
    /// `recursive_cte` carries the name and declared columns of a recursive
    /// common table whose body this is; the final compound branch is then
    /// resolved with that name bound to the accumulated result.
    pub fn resolve_select(
        &self,
        select: &SelectStmt,
        recursive_cte: Option<(&Name, &[Name])>,
    ) -> Vec<Resolved> {
        tracing::trace!(compounds = select.compounds.len(), "resolving select");
        let resolver = match &select.with {
            Some(with) => match self.with_resolver(with) {
                Ok(resolver) => resolver,
                Err(error) => {
                    self.errors.push(ResolutionError::with_table(
                        error.span(),
                        error.to_string(),
                    ));
                    self.clone()
                }
            },
            None => self.clone(),
        };

        let mut resolution = resolver.resolve_select_core(&select.core, Some(select), None);

        for (position, compound) in select.compounds.iter().enumerate() {
            let is_last = position + 1 == select.compounds.len();
            let branch = match (is_last, recursive_cte) {
                (true, Some((name, columns))) => {
                    // the final branch of a recursive common table may use
                    // the accumulated result under the common table's name
                    let bound =
                        resolver.apply_column_list(name, columns, resolution.clone());
                    resolver.resolve_select_core(
                        &compound.core,
                        None,
                        Some((name, bound.as_slice())),
                    )
                }
                _ => resolver.resolve_select_core(&compound.core, None, None),
            };
            let found = result_column_size(&branch);
            let expected = result_column_size(&resolution);
            if found != expected {
                self.errors.push(ResolutionError::compound(
                    compound.core.span(),
                    format!(
                        "Unexpected number of columns in compound statement found: {found} expected: {expected}"
                    ),
                ));
            }
            resolution = merge(resolution, &branch);
        }

        resolution
    }

    /// Resolve a view's defining select with the view name cycle-guarded
    pub fn resolve_view_body(&self, view: &CreateViewStmt) -> Vec<Resolved> {
        self.resolving(&view.name.text).resolve_select(&view.select, None)
    }

    /// Resolve one select-or-values core to the columns it selects
    fn resolve_select_core(
        &self,
        core: &SelectCore,
        parent: Option<&SelectStmt>,
        recursive: Option<(&Name, &[Resolved])>,
    ) -> Vec<Resolved> {
        let body = match core {
            // VALUES has no scope of its own; only its columns are returned
            SelectCore::Values(values) => return self.resolve_values(values, &[]),
            SelectCore::Select(body) => body,
        };

        let scope = match &body.from {
            None => vec![],
            Some(FromClause::Tables(sources)) => sources
                .iter()
                .flat_map(|source| self.resolve_table_or_subquery(source, recursive))
                .collect(),
            Some(FromClause::Join(join)) => self.resolve_join(join, recursive),
        };

        // Validate the body's clauses against the assembled scope before
        // projection.
        let scoped = self.with_scoped_values(scope.clone());
        SelectBodyValidator::new(scoped.clone()).validate(body);

        // If this core is the baseline of a larger select, the outer ORDER
        // BY and LIMIT are checked now that the inner scope is known.
        if let Some(parent) = parent {
            SelectStmtValidator::new(scoped).validate(parent);
        }

        body.columns
            .iter()
            .flat_map(|column| self.resolve_result_column(column, &scope))
            .collect()
    }

    /// Resolve a join chain to the union of its per-source columns
    fn resolve_join(
        &self,
        join: &JoinClause,
        recursive: Option<(&Name, &[Resolved])>,
    ) -> Vec<Resolved> {
        let base = self.resolve_table_or_subquery(&join.base, recursive);
        let mut frames: Vec<Vec<Resolved>> = vec![base.clone()];
        let mut resolution = base;

        for joined in &join.joins {
            let mut right = self.resolve_table_or_subquery(&joined.table, recursive);
            if joined.op == JoinOperator::Left {
                right = right.into_iter().map(Resolved::into_nullable).collect();
            }
            if let Some(constraint) = &joined.constraint {
                let probe_errors = JoinValidator::new(self, right.clone(), frames.clone())
                    .validate(constraint);
                self.errors.extend(probe_errors);
            }
            frames.push(right.clone());
            resolution.extend(right);
        }

        resolution
    }

    /// Take in the available columns and return the selected columns
    fn resolve_result_column(
        &self,
        column: &ResultColumn,
        available: &[Resolved],
    ) -> Vec<Resolved> {
        match column {
            ResultColumn::Wildcard(_) => available.to_vec(),
            ResultColumn::TableWildcard { table, span: _ } => {
                let tables: Vec<&Resolved> = available
                    .iter()
                    .filter(|r| matches!(r, Resolved::Table(_) | Resolved::QueryResults(_)))
                    .collect();
                let matched: Vec<Resolved> = tables
                    .iter()
                    .filter(|r| r.name() == table.text)
                    .map(|r| (*r).clone())
                    .collect();
                if result_column_size(&matched) == 0 {
                    let mut known: Vec<String> =
                        tables.iter().map(|r| r.name().to_string()).collect();
                    known.sort();
                    known.dedup();
                    self.errors.push(ResolutionError::table_name_not_found(
                        table.span,
                        format!("Table name {} not found", table.text),
                        known,
                    ));
                    return vec![];
                }
                self.find_element_at_cursor(table.span, matched[0].element());
                matched
            }
            ResultColumn::Expr { expr, alias } => {
                let scoped = self.scoped_only(available.to_vec());
                let Some(mut value) = scoped.resolve_expr(expr, None) else {
                    return vec![];
                };
                if let Some(alias) = alias {
                    value.name = alias.text.clone();
                    value.element = alias.span;
                }
                vec![Resolved::Value(value)]
            }
            ResultColumn::Incomplete(span) => {
                self.errors.push(ResolutionError::incomplete_rule(
                    *span,
                    "Result set requires at least one column",
                ));
                vec![]
            }
        }
    }

    /// Resolve a VALUES list to the columns its first row introduces
    ///
    /// Chained rows must match the first row's width; expected types are
    /// propagated positionally into each row's expressions. Type agreement
    /// across rows is not yet checked.
    pub fn resolve_values(
        &self,
        values: &ValuesClause,
        expected: &[Option<Value>],
    ) -> Vec<Resolved> {
        let Some(first) = values.rows.first() else {
            return vec![];
        };
        let resolve_row = |row: &sqlsema_syntax::stmt::ValuesRow| -> Vec<Resolved> {
            row.exprs
                .iter()
                .enumerate()
                .filter_map(|(position, expr)| {
                    let value = if position < expected.len() {
                        let expectation =
                            ArgumentType::SingleValue(expected[position].clone());
                        self.resolve_expr(expr, Some(&expectation))
                    } else {
                        self.resolve_expr(expr, None)
                    };
                    value.map(Resolved::Value)
                })
                .collect()
        };

        let selected = resolve_row(first);
        for row in values.rows.iter().skip(1) {
            resolve_row(row);
            if row.exprs.len() != first.exprs.len() {
                self.errors.push(ResolutionError::values(
                    row.span,
                    format!(
                        "Unexpected number of columns in values found: {} expected: {}",
                        row.exprs.len(),
                        first.exprs.len()
                    ),
                ));
            }
        }
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use sqlsema_catalog::{ColumnSchema, SymbolTable, TableDefinition, TableSchema};
    use sqlsema_syntax::expr::{ColumnRef, Expr};
    use sqlsema_syntax::stmt::{CompoundOp, SelectBody, TableOrSubquery};
    use sqlsema_syntax::{DataType, Span};

    fn symbol_table() -> SymbolTable {
        let schema = TableSchema::new("t", Span::new(13, 14)).with_columns(vec![
            ColumnSchema::new("a", DataType::Integer, Span::new(17, 18)),
            ColumnSchema::new("b", DataType::Text, Span::new(28, 29)),
        ]);
        let mut table = SymbolTable::new();
        table.insert(TableDefinition::Table(schema), None).unwrap();
        table
    }

    fn select_columns(columns: Vec<&str>, from: &str, base: usize) -> SelectStmt {
        let result_columns = columns
            .iter()
            .enumerate()
            .map(|(i, name)| ResultColumn::Expr {
                expr: Expr::Column(ColumnRef::new(Name::new(
                    *name,
                    Span::new(base + i * 3, base + i * 3 + 1),
                ))),
                alias: None,
            })
            .collect();
        let body = SelectBody::new(result_columns, Span::new(base, base + 40)).with_from(
            FromClause::Tables(vec![TableOrSubquery::table(Name::new(
                from,
                Span::new(base + 20, base + 21),
            ))]),
        );
        SelectStmt::new(SelectCore::Select(body), Span::new(base, base + 40))
    }

    #[test]
    fn test_wildcard_projects_full_scope() {
        let resolver = Resolver::new(symbol_table());
        let body = SelectBody::new(vec![ResultColumn::Wildcard(Span::new(7, 8))], Span::new(0, 20))
            .with_from(FromClause::Tables(vec![TableOrSubquery::table(Name::new(
                "t",
                Span::new(14, 15),
            ))]));
        let select = SelectStmt::new(SelectCore::Select(body), Span::new(0, 20));
        let resolution = resolver.resolve_select(&select, None);
        assert_eq!(result_column_size(&resolution), 2);
        let names: Vec<String> = crate::result::expand(&resolution)
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(resolver.errors.is_empty());
    }

    #[test]
    fn test_compound_arity_mismatch() {
        let resolver = Resolver::new(symbol_table());
        let mut select = select_columns(vec!["a", "b"], "t", 0);
        let branch = select_columns(vec!["a"], "t", 50);
        select = select.with_compound(CompoundOp::Union, branch.core);
        let resolution = resolver.resolve_select(&select, None);

        let errors = resolver.errors.snapshot();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), ErrorKind::Compound);
        assert_eq!(
            errors[0].message(),
            "Unexpected number of columns in compound statement found: 1 expected: 2"
        );
        // downstream consumers still see the baseline arity
        assert_eq!(result_column_size(&resolution), 2);
    }

    #[test]
    fn test_values_row_arity() {
        let resolver = Resolver::new(symbol_table());
        let values = ValuesClause {
            rows: vec![
                sqlsema_syntax::stmt::ValuesRow {
                    exprs: vec![
                        Expr::Literal {
                            value: sqlsema_syntax::expr::Literal::Integer(1),
                            span: Span::new(8, 9),
                        },
                        Expr::Literal {
                            value: sqlsema_syntax::expr::Literal::Integer(2),
                            span: Span::new(11, 12),
                        },
                    ],
                    span: Span::new(7, 13),
                },
                sqlsema_syntax::stmt::ValuesRow {
                    exprs: vec![Expr::Literal {
                        value: sqlsema_syntax::expr::Literal::Integer(3),
                        span: Span::new(16, 17),
                    }],
                    span: Span::new(15, 18),
                },
            ],
            span: Span::new(0, 19),
        };
        let resolution = resolver.resolve_values(&values, &[]);
        assert_eq!(resolution.len(), 2);
        let errors = resolver.errors.snapshot();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message(),
            "Unexpected number of columns in values found: 1 expected: 2"
        );
    }

    #[test]
    fn test_table_wildcard_not_found() {
        let resolver = Resolver::new(symbol_table());
        let body = SelectBody::new(
            vec![ResultColumn::TableWildcard {
                table: Name::new("missing", Span::new(7, 14)),
                span: Span::new(7, 16),
            }],
            Span::new(0, 30),
        )
        .with_from(FromClause::Tables(vec![TableOrSubquery::table(Name::new(
            "t",
            Span::new(22, 23),
        ))]));
        let select = SelectStmt::new(SelectCore::Select(body), Span::new(0, 30));
        let resolution = resolver.resolve_select(&select, None);
        assert!(resolution.is_empty());
        let errors = resolver.errors.snapshot();
        assert_eq!(errors[0].message(), "Table name missing not found");
        match &errors[0] {
            ResolutionError::TableNameNotFound { suggestions, .. } => {
                assert_eq!(suggestions, &vec!["t".to_string()]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_table_wildcard_suggestions_are_unique() {
        let mut table = symbol_table();
        table
            .insert(
                TableDefinition::Table(TableSchema::new("u", Span::new(33, 34)).with_columns(
                    vec![ColumnSchema::new("c", DataType::Integer, Span::new(37, 38))],
                )),
                None,
            )
            .unwrap();
        let resolver = Resolver::new(table);
        // `t` appears twice with `u` in between
        let body = SelectBody::new(
            vec![ResultColumn::TableWildcard {
                table: Name::new("missing", Span::new(7, 14)),
                span: Span::new(7, 16),
            }],
            Span::new(0, 50),
        )
        .with_from(FromClause::Tables(vec![
            TableOrSubquery::table(Name::new("t", Span::new(22, 23))),
            TableOrSubquery::table(Name::new("u", Span::new(25, 26))),
            TableOrSubquery::table(Name::new("t", Span::new(28, 29))),
        ]));
        let select = SelectStmt::new(SelectCore::Select(body), Span::new(0, 50));
        resolver.resolve_select(&select, None);

        let errors = resolver.errors.snapshot();
        match &errors[0] {
            ResolutionError::TableNameNotFound { suggestions, .. } => {
                assert_eq!(suggestions, &vec!["t".to_string(), "u".to_string()]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}

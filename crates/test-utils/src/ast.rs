// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Syntax tree factory for tests
//!
//! Builds typed AST nodes with non-overlapping spans, allocated left to right
//! as if the nodes had been parsed from a real file. Distinct spans matter:
//! error deduplication and cursor lookup both compare spans, so fixtures
//! built from `Span::default()` everywhere would mask bugs.

use sqlsema_syntax::expr::{BinaryOp, BindParameter, ColumnRef, Expr, Literal};
use sqlsema_syntax::stmt::{
    CommonTableExpr, CompoundOp, FromClause, InsertSource, InsertStmt, Join, JoinClause,
    JoinConstraint, JoinOperator, NamedStatement, ResultColumn, SelectBody, SelectCore,
    SelectStmt, SqlFile, StatementKind, TableOrSubquery, ValuesClause, ValuesRow, WithClause,
};
use sqlsema_syntax::{Name, Span};
use std::cell::Cell;

/// Factory producing AST nodes with fresh, ordered spans
#[derive(Debug, Default)]
pub struct AstFactory {
    offset: Cell<usize>,
}

impl AstFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a span of the given length at the current offset
    pub fn span(&self, len: usize) -> Span {
        let start = self.offset.get();
        // +1 leaves a separator gap between adjacent tokens
        self.offset.set(start + len + 1);
        Span::new(start, start + len)
    }

    /// A name spanning its own text
    pub fn name(&self, text: &str) -> Name {
        Name::new(text, self.span(text.len()))
    }

    // ===== Expressions =====

    /// Unqualified column reference
    pub fn column(&self, column: &str) -> Expr {
        Expr::Column(ColumnRef::new(self.name(column)))
    }

    /// Qualified `table.column` reference
    pub fn qualified_column(&self, table: &str, column: &str) -> Expr {
        let table = self.name(table);
        Expr::Column(ColumnRef::new(self.name(column)).with_table(table))
    }

    pub fn integer(&self, value: i64) -> Expr {
        Expr::Literal {
            value: Literal::Integer(value),
            span: self.span(value.to_string().len()),
        }
    }

    pub fn string(&self, value: &str) -> Expr {
        Expr::Literal {
            value: Literal::String(value.to_string()),
            span: self.span(value.len() + 2),
        }
    }

    pub fn null(&self) -> Expr {
        Expr::Literal {
            value: Literal::Null,
            span: self.span(4),
        }
    }

    /// Plain `?` bind parameter
    pub fn bind(&self) -> Expr {
        Expr::Bind(BindParameter {
            index: None,
            span: self.span(1),
        })
    }

    /// Explicitly indexed `?NNN` bind parameter
    pub fn bind_indexed(&self, index: usize) -> Expr {
        Expr::Bind(BindParameter {
            index: Some(index),
            span: self.span(1 + index.to_string().len()),
        })
    }

    pub fn binary(&self, left: Expr, op: BinaryOp, right: Expr) -> Expr {
        let span = Span::new(left.span().start, right.span().end);
        Expr::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
            span,
        }
    }

    pub fn eq(&self, left: Expr, right: Expr) -> Expr {
        self.binary(left, BinaryOp::Eq, right)
    }

    pub fn function(&self, name: &str, args: Vec<Expr>) -> Expr {
        let name = self.name(name);
        let end = args
            .last()
            .map(|a| a.span().end + 1)
            .unwrap_or(name.span.end + 2);
        let span = Span::new(name.span.start, end);
        Expr::Function {
            name,
            args,
            distinct: false,
            span,
        }
    }

    // ===== Select =====

    /// A result column for an expression, without alias
    pub fn result_expr(&self, expr: Expr) -> ResultColumn {
        ResultColumn::Expr { expr, alias: None }
    }

    /// A result column with an alias
    pub fn result_aliased(&self, expr: Expr, alias: &str) -> ResultColumn {
        ResultColumn::Expr {
            expr,
            alias: Some(self.name(alias)),
        }
    }

    /// `SELECT * FROM <table>`
    pub fn select_wildcard_from(&self, table: &str) -> SelectStmt {
        let start = self.offset.get();
        let wildcard = ResultColumn::Wildcard(self.span(1));
        let from = FromClause::Tables(vec![TableOrSubquery::table(self.name(table))]);
        self.finish_select(start, vec![wildcard], Some(from))
    }

    /// `SELECT <columns> FROM <table>`
    pub fn select_columns_from(&self, columns: Vec<ResultColumn>, table: &str) -> SelectStmt {
        let start = columns
            .first()
            .map(|c| c.span().start)
            .unwrap_or(self.offset.get());
        let from = FromClause::Tables(vec![TableOrSubquery::table(self.name(table))]);
        self.finish_select(start, columns, Some(from))
    }

    /// `SELECT <columns> FROM <table> AS <alias>`
    pub fn select_columns_from_aliased(
        &self,
        columns: Vec<ResultColumn>,
        table: &str,
        alias: &str,
    ) -> SelectStmt {
        let start = columns
            .first()
            .map(|c| c.span().start)
            .unwrap_or(self.offset.get());
        let table = self.name(table);
        let alias = self.name(alias);
        let from = FromClause::Tables(vec![TableOrSubquery::aliased(table, alias)]);
        self.finish_select(start, columns, Some(from))
    }

    /// A SELECT without a FROM clause
    pub fn select_no_from(&self, columns: Vec<ResultColumn>) -> SelectStmt {
        let start = columns
            .first()
            .map(|c| c.span().start)
            .unwrap_or(self.offset.get());
        self.finish_select(start, columns, None)
    }

    fn finish_select(
        &self,
        start: usize,
        columns: Vec<ResultColumn>,
        from: Option<FromClause>,
    ) -> SelectStmt {
        let end = self.offset.get();
        let span = Span::new(start, end.max(start + 1) - 1);
        let mut body = SelectBody::new(columns, span);
        body.from = from;
        SelectStmt::new(SelectCore::Select(body), span)
    }

    /// Attach a compound branch to an existing select
    pub fn compound(&self, select: SelectStmt, op: CompoundOp, branch: SelectStmt) -> SelectStmt {
        select.with_compound(op, branch.core)
    }

    /// `VALUES (row), (row), ...`
    pub fn values(&self, rows: Vec<Vec<Expr>>) -> ValuesClause {
        let start = self.offset.get();
        let rows: Vec<ValuesRow> = rows
            .into_iter()
            .map(|exprs| {
                let span = match (exprs.first(), exprs.last()) {
                    (Some(first), Some(last)) => {
                        Span::new(first.span().start, last.span().end)
                    }
                    _ => self.span(2),
                };
                ValuesRow { exprs, span }
            })
            .collect();
        let end = rows.last().map(|r| r.span.end).unwrap_or(start);
        ValuesClause {
            rows,
            span: Span::new(start, end),
        }
    }

    // ===== FROM sources =====

    /// A join chain starting at `base`
    pub fn join_clause(&self, base: TableOrSubquery, joins: Vec<Join>) -> FromClause {
        let start = base.span().start;
        let end = joins
            .last()
            .map(|j| j.table.span().end)
            .unwrap_or(base.span().end);
        FromClause::Join(JoinClause {
            base,
            joins,
            span: Span::new(start, end),
        })
    }

    pub fn join_on(&self, op: JoinOperator, table: TableOrSubquery, on: Expr) -> Join {
        Join {
            op,
            table,
            constraint: Some(JoinConstraint::On(on)),
        }
    }

    pub fn join_using(&self, op: JoinOperator, table: TableOrSubquery, columns: Vec<&str>) -> Join {
        Join {
            op,
            table,
            constraint: Some(JoinConstraint::Using(
                columns.into_iter().map(|c| self.name(c)).collect(),
            )),
        }
    }

    // ===== WITH =====

    pub fn with_clause(&self, recursive: bool, ctes: Vec<CommonTableExpr>) -> WithClause {
        let start = ctes.first().map(|c| c.span.start).unwrap_or_default();
        let end = ctes.last().map(|c| c.span.end).unwrap_or(start);
        WithClause {
            recursive,
            ctes,
            span: Span::new(start, end),
        }
    }

    pub fn cte(&self, name: &str, columns: Vec<&str>, select: SelectStmt) -> CommonTableExpr {
        let name = self.name(name);
        let span = Span::new(name.span.start, select.span.end);
        CommonTableExpr {
            name,
            columns: columns.into_iter().map(|c| self.name(c)).collect(),
            select,
            span,
        }
    }

    // ===== Statements and files =====

    pub fn insert_values(&self, table: &str, columns: Vec<&str>, rows: Vec<Vec<Expr>>) -> InsertStmt {
        let start = self.offset.get();
        let table = self.name(table);
        let columns: Vec<Name> = columns.into_iter().map(|c| self.name(c)).collect();
        let values = self.values(rows);
        let end = values.span.end;
        InsertStmt {
            with: None,
            table,
            columns,
            source: InsertSource::Values(values),
            span: Span::new(start, end),
        }
    }

    pub fn named_select(&self, name: &str, select: SelectStmt) -> NamedStatement {
        NamedStatement {
            name: self.name(name),
            doc: None,
            kind: StatementKind::Select(select),
        }
    }

    pub fn named(&self, name: &str, kind: StatementKind) -> NamedStatement {
        NamedStatement {
            name: self.name(name),
            doc: None,
            kind,
        }
    }

    pub fn file(&self, path: &str, statements: Vec<NamedStatement>) -> SqlFile {
        SqlFile {
            path: path.to_string(),
            create_table: None,
            imports: Vec::new(),
            statements,
            span: Span::new(0, self.offset.get()),
        }
    }
}

// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Expressions
//!
//! Expression nodes of the typed syntax tree.
//!
//! ## Design
//!
//! Expressions form a tree where complex expressions contain sub-expressions:
//!
//! - **Column references**: `table.column` or unqualified `column`
//! - **Literal values**: integers, reals, strings, blobs, NULL
//! - **Bind parameters**: `?` / `?NNN` positional placeholders
//! - **Binary/unary operations**: arithmetic, comparison, logical, string
//! - **Function calls**: `COUNT(*)`, `MAX(expr)`, scalar functions
//! - **Casts**: `CAST(expr AS type)`
//! - **Subqueries**: scalar subselects, `EXISTS`, `IN (SELECT ...)`
//!
//! Every variant exposes its source [`Span`] through [`Expr::span`].

use crate::span::{Name, Span};
use crate::stmt::SelectStmt;
use serde::{Deserialize, Serialize};

/// A SQL expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Column reference (e.g., `table.column` or just `column`)
    Column(ColumnRef),

    /// Literal value
    Literal { value: Literal, span: Span },

    /// Bind parameter (`?` or `?NNN`)
    Bind(BindParameter),

    /// Binary operation (e.g., `a + b`, `x = 5`)
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
        span: Span,
    },

    /// Unary operation (e.g., `-x`, `NOT a`)
    UnaryOp {
        op: UnaryOp,
        expr: Box<Expr>,
        span: Span,
    },

    /// Function call (e.g., `COUNT(*)`, `MAX(column)`)
    Function {
        name: Name,
        args: Vec<Expr>,
        distinct: bool,
        span: Span,
    },

    /// CAST expression; the target type name is resolved by the analyzer
    Cast {
        expr: Box<Expr>,
        type_name: Name,
        span: Span,
    },

    /// EXISTS / NOT EXISTS subquery
    Exists {
        select: Box<SelectStmt>,
        not: bool,
        span: Span,
    },

    /// `expr IN (a, b, c)`
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        not: bool,
        span: Span,
    },

    /// `expr IN (SELECT ...)`
    InSelect {
        expr: Box<Expr>,
        select: Box<SelectStmt>,
        not: bool,
        span: Span,
    },

    /// Scalar subquery `(SELECT ...)` used as a value
    Subselect { select: Box<SelectStmt>, span: Span },

    /// Parenthesized expression
    Paren(Box<Expr>),
}

impl Expr {
    /// The source span of this expression
    pub fn span(&self) -> Span {
        match self {
            Expr::Column(col) => col.span,
            Expr::Literal { span, .. }
            | Expr::BinaryOp { span, .. }
            | Expr::UnaryOp { span, .. }
            | Expr::Function { span, .. }
            | Expr::Cast { span, .. }
            | Expr::Exists { span, .. }
            | Expr::InList { span, .. }
            | Expr::InSelect { span, .. }
            | Expr::Subselect { span, .. } => *span,
            Expr::Bind(bind) => bind.span,
            Expr::Paren(inner) => inner.span(),
        }
    }
}

/// Column reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    /// Optional table/alias qualifier
    pub table: Option<Name>,
    /// Column name
    pub column: Name,
    /// Span of the whole reference, including the qualifier
    pub span: Span,
}

impl ColumnRef {
    pub fn new(column: Name) -> Self {
        let span = column.span;
        Self {
            table: None,
            column,
            span,
        }
    }

    pub fn with_table(mut self, table: Name) -> Self {
        self.span = Span::new(table.span.start, self.column.span.end);
        self.table = Some(table);
        self
    }

    pub fn qualified(&self) -> String {
        match &self.table {
            Some(table) => format!("{}.{}", table.text, self.column.text),
            None => self.column.text.clone(),
        }
    }
}

/// Bind parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BindParameter {
    /// Explicit index for `?NNN` parameters; `None` for plain `?`
    pub index: Option<usize>,
    pub span: Span,
}

/// Literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Integer(i64),
    Real(f64),
    String(String),
    Blob(Vec<u8>),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    And,
    Or,

    // String
    Like,
    NotLike,
    Concat,

    // NULL-safe comparison
    Is,
    IsNot,
}

impl BinaryOp {
    /// Whether this operator yields a boolean result
    pub fn is_boolean(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
                | BinaryOp::And
                | BinaryOp::Or
                | BinaryOp::Like
                | BinaryOp::NotLike
                | BinaryOp::Is
                | BinaryOp::IsNot
        )
    }

    /// Whether this operator is arithmetic
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod
        )
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

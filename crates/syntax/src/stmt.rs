// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Statements
//!
//! Statement and file nodes of the typed syntax tree.
//!
//! ## File structure
//!
//! A [`SqlFile`] is the unit of validation: at most one `CREATE TABLE`
//! defining the file's table, a list of imports, and a list of named
//! statements (queries, DML, views, indexes, triggers). The file's relative
//! path doubles as the namespace of its generated result types.
//!
//! ## Select structure
//!
//! A [`SelectStmt`] is a baseline [`SelectCore`] plus a list of compound
//! branches (`UNION` / `INTERSECT` / `EXCEPT`). The analyzer merges branch
//! result columns positionally into the baseline, so the branch list is kept
//! flat rather than as a binary tree.

use crate::expr::Expr;
use crate::span::{Name, Span};
use crate::types::DataType;
use serde::{Deserialize, Serialize};

/// A parsed statement file: the unit of validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlFile {
    /// Relative path of the file; directory segments mirror a package-style
    /// namespace and must not contain dots
    pub path: String,
    /// Table defined by this file, if any
    pub create_table: Option<CreateTableStmt>,
    /// Type imports referenced by column definitions
    pub imports: Vec<ImportStmt>,
    /// Named statements in declaration order
    pub statements: Vec<NamedStatement>,
    /// Span of the whole file
    pub span: Span,
}

/// A named statement (`name: <statement>;`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedStatement {
    /// Statement identifier, used to name generated accessors
    pub name: Name,
    /// Documentation comment attached to the statement
    pub doc: Option<String>,
    pub kind: StatementKind,
}

/// Statement kinds the analyzer validates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatementKind {
    Select(SelectStmt),
    Insert(InsertStmt),
    Update(UpdateStmt),
    Delete(DeleteStmt),
    CreateView(CreateViewStmt),
    CreateIndex(CreateIndexStmt),
    CreateTrigger(CreateTriggerStmt),
}

/// An import of an external column type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportStmt {
    /// Fully qualified dotted type name
    pub type_name: Name,
    pub span: Span,
}

impl ImportStmt {
    /// The final dotted segment: the simple type name imports collide on
    pub fn simple_name(&self) -> &str {
        self.type_name
            .text
            .rsplit('.')
            .next()
            .unwrap_or(&self.type_name.text)
    }
}

// ===== SELECT =====

/// A select statement: WITH prologue, baseline core, compound branches,
/// trailing ORDER BY / LIMIT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectStmt {
    pub with: Option<WithClause>,
    /// Baseline branch establishing the result arity
    pub core: SelectCore,
    /// Subsequent compound branches, in source order
    pub compounds: Vec<CompoundSelect>,
    pub order_by: Vec<Expr>,
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
    pub span: Span,
}

impl SelectStmt {
    pub fn new(core: SelectCore, span: Span) -> Self {
        Self {
            with: None,
            core,
            compounds: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            span,
        }
    }

    pub fn with_clause(mut self, with: WithClause) -> Self {
        self.with = Some(with);
        self
    }

    pub fn with_compound(mut self, op: CompoundOp, core: SelectCore) -> Self {
        self.compounds.push(CompoundSelect { op, core });
        self
    }

    pub fn with_limit(mut self, limit: Expr) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_order_by(mut self, order_by: Vec<Expr>) -> Self {
        self.order_by = order_by;
        self
    }
}

/// One compound branch of a select statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundSelect {
    pub op: CompoundOp,
    pub core: SelectCore,
}

/// Compound operator between select cores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompoundOp {
    Union,
    UnionAll,
    Intersect,
    Except,
}

/// Either a SELECT body or a VALUES list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectCore {
    Select(SelectBody),
    Values(ValuesClause),
}

impl SelectCore {
    pub fn span(&self) -> Span {
        match self {
            SelectCore::Select(body) => body.span,
            SelectCore::Values(values) => values.span,
        }
    }
}

/// The body of a single SELECT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectBody {
    pub distinct: bool,
    /// Projection list
    pub columns: Vec<ResultColumn>,
    pub from: Option<FromClause>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub span: Span,
}

impl SelectBody {
    pub fn new(columns: Vec<ResultColumn>, span: Span) -> Self {
        Self {
            distinct: false,
            columns,
            from: None,
            where_clause: None,
            group_by: Vec::new(),
            having: None,
            span,
        }
    }

    pub fn with_from(mut self, from: FromClause) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_where(mut self, where_clause: Expr) -> Self {
        self.where_clause = Some(where_clause);
        self
    }

    pub fn with_group_by(mut self, group_by: Vec<Expr>) -> Self {
        self.group_by = group_by;
        self
    }

    pub fn with_having(mut self, having: Expr) -> Self {
        self.having = Some(having);
        self
    }
}

/// Item in a SELECT projection list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResultColumn {
    /// `*`
    Wildcard(Span),
    /// `table.*`
    TableWildcard { table: Name, span: Span },
    /// Expression, optionally aliased
    Expr { expr: Expr, alias: Option<Name> },
    /// Structurally incomplete column produced by an error-recovering parser
    Incomplete(Span),
}

impl ResultColumn {
    pub fn span(&self) -> Span {
        match self {
            ResultColumn::Wildcard(span) | ResultColumn::Incomplete(span) => *span,
            ResultColumn::TableWildcard { span, .. } => *span,
            ResultColumn::Expr { expr, alias } => match alias {
                Some(alias) => Span::new(expr.span().start, alias.span.end),
                None => expr.span(),
            },
        }
    }
}

/// A VALUES list: one or more chained rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuesClause {
    pub rows: Vec<ValuesRow>,
    pub span: Span,
}

/// One `(expr, ...)` row of a VALUES list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuesRow {
    pub exprs: Vec<Expr>,
    pub span: Span,
}

// ===== FROM =====

/// FROM clause: either an explicit join chain or a comma-joined table list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FromClause {
    Join(JoinClause),
    Tables(Vec<TableOrSubquery>),
}

/// A join chain: base source plus joined sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinClause {
    pub base: TableOrSubquery,
    pub joins: Vec<Join>,
    pub span: Span,
}

/// One joined source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub op: JoinOperator,
    pub table: TableOrSubquery,
    pub constraint: Option<JoinConstraint>,
}

/// Join operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinOperator {
    Comma,
    Inner,
    Left,
    Cross,
}

/// Join condition (ON or USING)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JoinConstraint {
    On(Expr),
    Using(Vec<Name>),
}

/// A table reference or a parenthesized subquery in a FROM clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TableOrSubquery {
    Table {
        name: Name,
        alias: Option<Name>,
    },
    Subquery {
        select: Box<SelectStmt>,
        alias: Option<Name>,
        span: Span,
    },
}

impl TableOrSubquery {
    pub fn table(name: Name) -> Self {
        TableOrSubquery::Table { name, alias: None }
    }

    pub fn aliased(name: Name, alias: Name) -> Self {
        TableOrSubquery::Table {
            name,
            alias: Some(alias),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            TableOrSubquery::Table { name, alias } => match alias {
                Some(alias) => Span::new(name.span.start, alias.span.end),
                None => name.span,
            },
            TableOrSubquery::Subquery { span, .. } => *span,
        }
    }
}

// ===== WITH =====

/// WITH prologue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithClause {
    pub recursive: bool,
    pub ctes: Vec<CommonTableExpr>,
    pub span: Span,
}

/// One common table expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonTableExpr {
    pub name: Name,
    /// Explicit column list; empty when omitted
    pub columns: Vec<Name>,
    pub select: SelectStmt,
    pub span: Span,
}

// ===== DML =====

/// INSERT statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertStmt {
    pub with: Option<WithClause>,
    pub table: Name,
    /// Explicit column list; empty when omitted
    pub columns: Vec<Name>,
    pub source: InsertSource,
    pub span: Span,
}

/// The values supplied to an INSERT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InsertSource {
    Values(ValuesClause),
    Select(Box<SelectStmt>),
    DefaultValues,
}

/// UPDATE statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateStmt {
    pub with: Option<WithClause>,
    pub table: Name,
    pub assignments: Vec<Assignment>,
    pub where_clause: Option<Expr>,
    pub span: Span,
}

/// One `SET column = expr` pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub column: Name,
    pub value: Expr,
}

/// DELETE statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteStmt {
    pub with: Option<WithClause>,
    pub table: Name,
    pub where_clause: Option<Expr>,
    pub span: Span,
}

// ===== DDL =====

/// CREATE TABLE statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTableStmt {
    pub name: Name,
    pub columns: Vec<ColumnDef>,
    pub constraints: Vec<TableConstraint>,
    pub span: Span,
}

/// One column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: Name,
    pub data_type: DataType,
    pub constraints: Vec<ColumnConstraint>,
    pub span: Span,
}

impl ColumnDef {
    pub fn new(name: Name, data_type: DataType) -> Self {
        let span = name.span;
        Self {
            name,
            data_type,
            constraints: Vec::new(),
            span,
        }
    }

    pub fn with_constraint(mut self, constraint: ColumnConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }
}

/// Column-level constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnConstraint {
    PrimaryKey(Span),
    NotNull(Span),
    Unique(Span),
    Default(Expr),
    Check(Expr),
    ForeignKey(ForeignKeyClause),
}

/// Table-level constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TableConstraint {
    PrimaryKey {
        columns: Vec<Name>,
        span: Span,
    },
    Unique {
        columns: Vec<Name>,
        span: Span,
    },
    Check(Expr),
    ForeignKey {
        columns: Vec<Name>,
        clause: ForeignKeyClause,
        span: Span,
    },
}

/// `REFERENCES foreign_table (columns...)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyClause {
    pub foreign_table: Name,
    /// Referenced columns; empty means "the foreign table's primary key"
    pub columns: Vec<Name>,
    pub span: Span,
}

/// CREATE VIEW statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateViewStmt {
    pub name: Name,
    pub select: Box<SelectStmt>,
    pub span: Span,
}

/// CREATE INDEX statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateIndexStmt {
    pub name: Name,
    pub table: Name,
    pub columns: Vec<Name>,
    pub unique: bool,
    pub span: Span,
}

/// CREATE TRIGGER statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTriggerStmt {
    pub name: Name,
    pub table: Name,
    pub span: Span,
}

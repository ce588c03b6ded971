// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Expression resolution
//!
//! Resolves an expression against the resolver's scope stack, inferring the
//! type and nullability of the result and appending bind-parameter
//! descriptors as they are encountered. Column lookup is innermost-frame
//! first; a qualifier restricts candidates to the table or result set
//! carrying that name.

use crate::resolver::{ArgumentType, Resolver};
use crate::result::{result_column_size, Resolved, Value};
use sqlsema_syntax::expr::{BinaryOp, ColumnRef, Expr, Literal, UnaryOp};
use sqlsema_syntax::{DataType, Span};

use crate::error::ResolutionError;

impl Resolver {
    /// Resolve an expression to its typed value
    ///
    /// Returns `None` when resolution failed; the failure has already been
    /// pushed to the error sink. When `expected` is a boolean position, a
    /// text- or blob-typed result is reported but still returned so
    /// downstream checks keep going.
    pub fn resolve_expr(
        &self,
        expr: &Expr,
        expected: Option<&ArgumentType>,
    ) -> Option<Value> {
        let value = self.resolve_expr_inner(expr, expected)?;
        if let Some(ArgumentType::Boolean) = expected {
            if !value.data_type.usable_as_boolean() {
                self.errors.push(ResolutionError::expression(
                    expr.span(),
                    "Expected a boolean expression",
                ));
            }
        }
        Some(value)
    }

    fn resolve_expr_inner(&self, expr: &Expr, expected: Option<&ArgumentType>) -> Option<Value> {
        match expr {
            Expr::Column(column) => self.resolve_column_ref(column),
            Expr::Literal { value, span } => Some(literal_value(value, expected, *span)),
            Expr::Bind(bind) => {
                let argument_type = match expected {
                    Some(argument_type) => argument_type.clone(),
                    None => ArgumentType::SingleValue(None),
                };
                self.add_argument(bind.index, argument_type.clone(), bind.span);
                Some(bind_value(&argument_type, bind.span))
            }
            Expr::BinaryOp {
                left,
                op,
                right,
                span,
            } => {
                // comparisons propagate one side's type into the other, so
                // `WHERE name = ?` types the bind from the column
                let comparison =
                    op.is_boolean() && !matches!(op, BinaryOp::And | BinaryOp::Or);
                let (left_value, right_value) = if comparison
                    && is_bare_bind(left)
                    && !is_bare_bind(right)
                {
                    let right_value = self.resolve_expr(right, None);
                    let expectation = ArgumentType::SingleValue(right_value.clone());
                    let left_value = self.resolve_expr(left, Some(&expectation));
                    (left_value, right_value)
                } else if comparison {
                    let left_value = self.resolve_expr(left, None);
                    let expectation = ArgumentType::SingleValue(left_value.clone());
                    let right_value = self.resolve_expr(right, Some(&expectation));
                    (left_value, right_value)
                } else {
                    (self.resolve_expr(left, None), self.resolve_expr(right, None))
                };
                Some(binary_value(
                    *op,
                    left_value.as_ref(),
                    right_value.as_ref(),
                    *span,
                ))
            }
            Expr::UnaryOp { op, expr, span } => {
                let inner = self.resolve_expr(expr, None);
                Some(match op {
                    UnaryOp::Neg => {
                        let data_type = inner
                            .as_ref()
                            .map(|v| v.data_type)
                            .unwrap_or(DataType::Integer);
                        let nullable = inner.as_ref().is_none_or(|v| v.nullable);
                        Value::new("expr", data_type, nullable, *span)
                    }
                    UnaryOp::Not => Value::new(
                        "expr",
                        DataType::Integer,
                        inner.as_ref().is_none_or(|v| v.nullable),
                        *span,
                    ),
                })
            }
            Expr::Function {
                name, args, span, ..
            } => {
                let resolved: Vec<Option<Value>> = args
                    .iter()
                    .map(|arg| self.resolve_expr(arg, None))
                    .collect();
                Some(function_value(&name.text, &resolved, *span))
            }
            Expr::Cast {
                expr, type_name, ..
            } => {
                let inner = self.resolve_expr(expr, None);
                match DataType::from_type_name(&type_name.text) {
                    Some(data_type) => Some(Value::new(
                        "expr",
                        data_type,
                        inner.as_ref().is_none_or(|v| v.nullable),
                        type_name.span,
                    )),
                    None => {
                        self.errors.push(ResolutionError::expression(
                            type_name.span,
                            format!("Unknown type name {}", type_name.text),
                        ));
                        None
                    }
                }
            }
            Expr::Exists { select, span, .. } => {
                self.resolve_select(select, None);
                Some(Value::new("expr", DataType::Integer, false, *span))
            }
            Expr::InList {
                expr, list, span, ..
            } => {
                self.resolve_expr(expr, None);
                for item in list {
                    self.resolve_expr(item, None);
                }
                Some(Value::new("expr", DataType::Integer, false, *span))
            }
            Expr::InSelect {
                expr, select, span, ..
            } => {
                self.resolve_expr(expr, None);
                self.resolve_select(select, None);
                Some(Value::new("expr", DataType::Integer, false, *span))
            }
            Expr::Subselect { select, span } => {
                let resolution = self.resolve_select(select, None);
                if result_column_size(&resolution) == 0 {
                    self.errors.push(ResolutionError::expression(
                        *span,
                        "No result column found",
                    ));
                    return None;
                }
                let leaf = crate::result::expand(&resolution).remove(0);
                // a scalar subquery yields NULL when the select is empty
                Some(Value::new(leaf.name, leaf.data_type, true, *span))
            }
            Expr::Paren(inner) => self.resolve_expr(inner, expected),
        }
    }

    /// Resolve a column reference against the scope stack, innermost first
    pub(crate) fn resolve_column_ref(&self, column: &ColumnRef) -> Option<Value> {
        for frame in self.scoped_values.iter().rev() {
            let mut matches: Vec<(Span, Value)> = Vec::new();
            for result in frame {
                match &column.table {
                    Some(qualifier) => {
                        let owner_matches = match result {
                            Resolved::Table(table) => table.name == qualifier.text,
                            Resolved::QueryResults(query) => query.name == qualifier.text,
                            Resolved::Value(_) => false,
                        };
                        if owner_matches {
                            for leaf in result.expand() {
                                if leaf.name == column.column.text {
                                    matches.push((result.element(), leaf));
                                }
                            }
                        }
                    }
                    None => {
                        for leaf in result.expand() {
                            if leaf.name == column.column.text {
                                matches.push((result.element(), leaf));
                            }
                        }
                    }
                }
            }
            if matches.len() > 1 {
                self.errors.push(ResolutionError::expression(
                    column.span,
                    format!("Multiple columns found with name {}", column.column.text),
                ));
                return None;
            }
            if let Some((owner_element, value)) = matches.pop() {
                if let Some(qualifier) = &column.table {
                    self.find_element_at_cursor(qualifier.span, owner_element);
                }
                self.find_element_at_cursor(column.column.span, value.element);
                return Some(value);
            }
        }
        self.errors.push(ResolutionError::expression(
            column.span,
            format!("No column found with name {}", column.qualified()),
        ));
        None
    }
}

fn is_bare_bind(expr: &Expr) -> bool {
    match expr {
        Expr::Bind(_) => true,
        Expr::Paren(inner) => is_bare_bind(inner),
        _ => false,
    }
}

fn literal_value(literal: &Literal, expected: Option<&ArgumentType>, span: Span) -> Value {
    match literal {
        Literal::Null => {
            // NULL adopts the expected type when one is imposed
            let data_type = match expected {
                Some(ArgumentType::SingleValue(Some(value))) => value.data_type,
                _ => DataType::Null,
            };
            Value::new("literal", data_type, true, span)
        }
        Literal::Integer(_) => Value::new("literal", DataType::Integer, false, span),
        Literal::Real(_) => Value::new("literal", DataType::Real, false, span),
        Literal::String(_) => Value::new("literal", DataType::Text, false, span),
        Literal::Blob(_) => Value::new("literal", DataType::Blob, false, span),
    }
}

fn bind_value(expected: &ArgumentType, span: Span) -> Value {
    match expected {
        ArgumentType::Boolean => Value::new("?", DataType::Integer, false, span),
        ArgumentType::SingleValue(Some(value)) => {
            Value::new("?", value.data_type, value.nullable, span)
        }
        ArgumentType::SingleValue(None) => Value::new("?", DataType::Null, true, span),
    }
}

fn binary_value(op: BinaryOp, left: Option<&Value>, right: Option<&Value>, span: Span) -> Value {
    let nullable =
        left.is_none_or(|v| v.nullable) || right.is_none_or(|v| v.nullable);
    if op.is_arithmetic() {
        let data_type = match (left.map(|v| v.data_type), right.map(|v| v.data_type)) {
            (Some(DataType::Real), _) | (_, Some(DataType::Real)) => DataType::Real,
            _ => DataType::Integer,
        };
        return Value::new("expr", data_type, nullable, span);
    }
    match op {
        BinaryOp::Concat => Value::new("expr", DataType::Text, nullable, span),
        // IS / IS NOT never yield NULL
        BinaryOp::Is | BinaryOp::IsNot => Value::new("expr", DataType::Integer, false, span),
        _ => Value::new("expr", DataType::Integer, nullable, span),
    }
}

/// Built-in function typing
///
/// Unknown functions resolve to a nullable untyped value without an error;
/// the registry here covers the common SQLite set only.
fn function_value(name: &str, args: &[Option<Value>], span: Span) -> Value {
    let first = args.first().and_then(|v| v.as_ref());
    let first_type = first.map(|v| v.data_type).unwrap_or(DataType::Null);
    let first_nullable = first.is_none_or(|v| v.nullable);
    match name.to_ascii_lowercase().as_str() {
        "count" => Value::new(name, DataType::Integer, false, span),
        "sum" | "min" | "max" | "nullif" => Value::new(name, first_type, true, span),
        "avg" => Value::new(name, DataType::Real, true, span),
        "abs" | "round" => Value::new(name, first_type, first_nullable, span),
        "length" => Value::new(name, DataType::Integer, first_nullable, span),
        "upper" | "lower" | "trim" => Value::new(name, DataType::Text, first_nullable, span),
        "coalesce" | "ifnull" => {
            let data_type = args
                .iter()
                .flatten()
                .map(|v| v.data_type)
                .find(|t| *t != DataType::Null)
                .unwrap_or(DataType::Null);
            let nullable = args.iter().all(|v| v.as_ref().is_none_or(|v| v.nullable));
            Value::new(name, data_type, nullable, span)
        }
        _ => Value::new(name, DataType::Null, true, span),
    }
}

// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Resolver
//!
//! The threaded resolution context. A fresh resolver is created once per
//! top-level statement; nested resolution (subselect, join side, WITH scope)
//! derives a child resolver that shares the error, dependency, and argument
//! accumulators by handle while owning its own scope stack and cycle guard.
//! Discarding a child therefore loses nothing but its scope.
//!
//! ## Scoping
//!
//! `scoped_values` is a stack of frames, outer first. Identifier lookup tries
//! frames innermost-first and falls outward only on failure, which is what
//! lets a correlated subquery see an outer alias:
//!
//! ```sql
//! SELECT *
//! FROM test AS test1
//! WHERE 'sup' IN (
//!   SELECT *
//!   FROM test AS test2
//!   WHERE test2.some_id = test1.some_id
//! );
//! ```
//!
//! Resolving the inner select pushes the `test2` frame on top of the `test1`
//! frame, so `test1.some_id` still resolves while `test2` wins any conflict.
//!
//! ## Error sink sharing
//!
//! Sharing is an explicit design knob: scope-derived resolvers share the
//! parent's sink so nested errors surface immediately, but a speculative
//! probe (join-constraint checking) must derive with a fresh sink via
//! [`Resolver::with_isolated_errors`] and merge only on acceptance.

use crate::error::ResolutionError;
use crate::result::{Resolved, Value};
use serde::Serialize;
use sqlsema_catalog::{CatalogError, SourceTag, SymbolTable, TableDefinition};
use sqlsema_syntax::stmt::WithClause;
use sqlsema_syntax::Span;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use std::sync::{Arc, OnceLock};

/// Expected type of an expression, propagated into bind parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ArgumentType {
    /// The expression is used in a boolean position (WHERE, HAVING, ON)
    Boolean,
    /// The expression should produce this value's type; `None` when the
    /// context imposes no expectation
    SingleValue(Option<Value>),
}

/// One bind-parameter descriptor, appended in traversal order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Argument {
    /// 1-based bind index: explicit for `?NNN`, positional otherwise
    pub index: usize,
    pub argument_type: ArgumentType,
    pub span: Span,
}

/// Shared error accumulator handle
#[derive(Debug, Clone, Default)]
pub struct ErrorSink(Rc<RefCell<Vec<ResolutionError>>>);

impl ErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, error: ResolutionError) {
        self.0.borrow_mut().push(error);
    }

    pub fn extend(&self, errors: impl IntoIterator<Item = ResolutionError>) {
        self.0.borrow_mut().extend(errors);
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Copy of the accumulated errors
    pub fn snapshot(&self) -> Vec<ResolutionError> {
        self.0.borrow().clone()
    }

    /// Drain the accumulated errors
    pub fn take(&self) -> Vec<ResolutionError> {
        self.0.borrow_mut().drain(..).collect()
    }
}

/// Per-statement resolution context
///
/// Cloning derives a child: the symbol table, scope stack, cursor offset,
/// and cycle guard are copied by value; the error sink and the dependency,
/// table-name, and argument accumulators stay shared with the parent.
#[derive(Debug, Clone)]
pub struct Resolver {
    symbol_table: SymbolTable,
    dependencies: Rc<RefCell<BTreeSet<SourceTag>>>,
    table_dependencies: Rc<RefCell<BTreeSet<String>>>,
    arguments: Rc<RefCell<Vec<Argument>>>,
    pub(crate) scoped_values: Vec<Vec<Resolved>>,
    /// Byte offset of an identifier whose declaration is being looked up
    element_to_find: Option<usize>,
    /// Write-once result cell for the cursor lookup; first match wins.
    /// Readable from another execution context than the writer's.
    element_found: Arc<OnceLock<Span>>,
    /// Names of views and common tables currently being expanded
    currently_resolving: BTreeSet<String>,
    pub errors: ErrorSink,
}

impl Resolver {
    pub fn new(symbol_table: SymbolTable) -> Self {
        Self {
            symbol_table,
            dependencies: Rc::default(),
            table_dependencies: Rc::default(),
            arguments: Rc::default(),
            scoped_values: Vec::new(),
            element_to_find: None,
            element_found: Arc::new(OnceLock::new()),
            currently_resolving: BTreeSet::new(),
            errors: ErrorSink::new(),
        }
    }

    /// A resolver that additionally records what the identifier at `offset`
    /// resolves to
    pub fn with_cursor(symbol_table: SymbolTable, offset: usize) -> Self {
        let mut resolver = Self::new(symbol_table);
        resolver.element_to_find = Some(offset);
        resolver
    }

    pub(crate) fn symbol_table(&self) -> &SymbolTable {
        &self.symbol_table
    }

    /// Derive a resolver with the WITH clause's common tables registered
    ///
    /// Fails when a common table duplicates an existing name; callers convert
    /// the failure into a `WithTableError` and fall back to `self`.
    pub(crate) fn with_resolver(&self, with: &WithClause) -> Result<Resolver, CatalogError> {
        let mut symbol_table = self.symbol_table.clone();
        for cte in &with.ctes {
            symbol_table.insert(
                TableDefinition::CommonTable {
                    name: cte.name.clone(),
                    columns: cte.columns.clone(),
                    select: cte.select.clone(),
                    recursive: with.recursive,
                },
                None,
            )?;
        }
        let mut derived = self.clone();
        derived.symbol_table = symbol_table;
        Ok(derived)
    }

    /// Derive a resolver with one more scope frame (innermost)
    pub(crate) fn with_scoped_values(&self, frame: Vec<Resolved>) -> Resolver {
        let mut derived = self.clone();
        derived.scoped_values.push(frame);
        derived
    }

    /// Derive a resolver with several more scope frames, outer first
    pub(crate) fn with_frames(&self, frames: Vec<Vec<Resolved>>) -> Resolver {
        let mut derived = self.clone();
        derived.scoped_values.extend(frames);
        derived
    }

    /// Derive a resolver whose scope is exactly `frame`
    pub(crate) fn scoped_only(&self, frame: Vec<Resolved>) -> Resolver {
        let mut derived = self.clone();
        derived.scoped_values = vec![frame];
        derived
    }

    /// Derive a resolver with a fresh, empty error sink for speculative
    /// probing; the probe's errors are merged back only on acceptance
    pub(crate) fn with_isolated_errors(&self) -> Resolver {
        let mut derived = self.clone();
        derived.errors = ErrorSink::new();
        derived
    }

    /// Derive a resolver for expanding the named view or common table,
    /// with an empty scope and the name added to the cycle guard
    pub(crate) fn resolving(&self, name: &str) -> Resolver {
        let mut derived = self.clone();
        derived.scoped_values = Vec::new();
        derived.currently_resolving.insert(name.to_string());
        derived
    }

    /// Drop the cursor offset when changing resolution contexts (a view body
    /// belongs to another file; its offsets are not this file's offsets)
    pub(crate) fn without_cursor(&self) -> Resolver {
        let mut derived = self.clone();
        derived.element_to_find = None;
        derived
    }

    pub(crate) fn is_resolving(&self, name: &str) -> bool {
        self.currently_resolving.contains(name)
    }

    /// Record `source` as the cursor result if `element` sits at the cursor
    pub(crate) fn find_element_at_cursor(&self, element: Span, source: Span) {
        if self.element_to_find == Some(element.start) {
            // first match wins
            let _ = self.element_found.set(source);
        }
    }

    /// The element the cursor offset resolved to, if any
    pub fn element_found(&self) -> Option<Span> {
        self.element_found.get().copied()
    }

    pub(crate) fn add_dependency(&self, tag: SourceTag) {
        self.dependencies.borrow_mut().insert(tag);
    }

    pub(crate) fn add_table_dependency(&self, name: impl Into<String>) {
        self.table_dependencies.borrow_mut().insert(name.into());
    }

    pub(crate) fn add_argument(&self, index: Option<usize>, expected: ArgumentType, span: Span) {
        let mut arguments = self.arguments.borrow_mut();
        let index = index.unwrap_or(arguments.len() + 1);
        arguments.push(Argument {
            index,
            argument_type: expected,
            span,
        });
    }

    /// Snapshot of the source tags touched during resolution
    pub fn dependencies(&self) -> BTreeSet<SourceTag> {
        self.dependencies.borrow().clone()
    }

    /// Snapshot of the concrete table names used (excludes views and CTEs)
    pub fn table_dependencies(&self) -> BTreeSet<String> {
        self.table_dependencies.borrow().clone()
    }

    /// Snapshot of the bind arguments, in statement order
    pub fn arguments(&self) -> Vec<Argument> {
        self.arguments.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlsema_syntax::DataType;

    #[test]
    fn test_derived_resolver_shares_error_sink() {
        let resolver = Resolver::new(SymbolTable::new());
        let derived = resolver.with_scoped_values(vec![]);
        derived
            .errors
            .push(ResolutionError::expression(Span::new(0, 1), "nested failure"));
        assert_eq!(resolver.errors.len(), 1);
    }

    #[test]
    fn test_isolated_errors_do_not_leak() {
        let resolver = Resolver::new(SymbolTable::new());
        let probe = resolver.with_isolated_errors();
        probe
            .errors
            .push(ResolutionError::expression(Span::new(0, 1), "probe failure"));
        assert!(resolver.errors.is_empty());
        assert_eq!(probe.errors.len(), 1);
    }

    #[test]
    fn test_cursor_cell_is_write_once() {
        let resolver = Resolver::with_cursor(SymbolTable::new(), 7);
        resolver.find_element_at_cursor(Span::new(7, 10), Span::new(100, 105));
        resolver.find_element_at_cursor(Span::new(7, 10), Span::new(200, 205));
        assert_eq!(resolver.element_found(), Some(Span::new(100, 105)));
        // misses never write
        resolver.find_element_at_cursor(Span::new(8, 10), Span::new(300, 305));
        assert_eq!(resolver.element_found(), Some(Span::new(100, 105)));
    }

    #[test]
    fn test_positional_bind_index() {
        let resolver = Resolver::new(SymbolTable::new());
        resolver.add_argument(None, ArgumentType::SingleValue(None), Span::new(0, 1));
        resolver.add_argument(Some(5), ArgumentType::Boolean, Span::new(2, 4));
        resolver.add_argument(None, ArgumentType::SingleValue(None), Span::new(5, 6));
        let args = resolver.arguments();
        assert_eq!(args[0].index, 1);
        assert_eq!(args[1].index, 5);
        assert_eq!(args[2].index, 3);
    }

    #[test]
    fn test_accumulators_shared_across_derivation() {
        let resolver = Resolver::new(SymbolTable::new());
        let derived = resolver.scoped_only(vec![Resolved::Value(Value::new(
            "x",
            DataType::Integer,
            false,
            Span::default(),
        ))]);
        derived.add_table_dependency("users");
        assert!(resolver.table_dependencies().contains("users"));
    }
}

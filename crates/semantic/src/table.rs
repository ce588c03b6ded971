// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Table resolution
//!
//! Resolves FROM-clause sources and DML target tables against the symbol
//! table: concrete tables expand to their columns, views and common tables
//! expand by resolving their defining select under the cycle guard, and
//! subqueries recurse with the outer scope preserved for correlation.

use crate::error::ResolutionError;
use crate::result::{expand, QueryResults, Resolved, ResolvedTable, Value};
use crate::resolver::Resolver;
use sqlsema_catalog::{CatalogError, TableDefinition, TableSchema};
use sqlsema_syntax::stmt::TableOrSubquery;
use sqlsema_syntax::{Name, Span};

impl Resolver {
    /// Resolve one FROM-clause source to the columns it contributes
    ///
    /// `recursive` binds a common table name to an already-accumulated result
    /// while the final branch of a recursive common table is resolved.
    pub(crate) fn resolve_table_or_subquery(
        &self,
        source: &TableOrSubquery,
        recursive: Option<(&Name, &[Resolved])>,
    ) -> Vec<Resolved> {
        match source {
            TableOrSubquery::Table { name, alias } => {
                if let Some((recursive_name, columns)) = recursive {
                    if recursive_name.text == name.text {
                        self.find_element_at_cursor(name.span, recursive_name.span);
                        let visible = alias.as_ref().unwrap_or(name);
                        return vec![Resolved::QueryResults(QueryResults::new(
                            visible.text.clone(),
                            columns.to_vec(),
                            visible.span,
                        ))];
                    }
                }
                self.resolve_named_table(name, alias.as_ref())
            }
            TableOrSubquery::Subquery { select, alias, .. } => {
                let resolution = self.resolve_select(select, None);
                match alias {
                    Some(alias) => vec![Resolved::QueryResults(QueryResults::new(
                        alias.text.clone(),
                        resolution,
                        alias.span,
                    ))],
                    // anonymous subqueries contribute their columns directly
                    None => resolution,
                }
            }
        }
    }

    /// Resolve a bare table name (DML targets, index/trigger targets)
    pub fn resolve_table_name(&self, name: &Name) -> Option<Vec<Resolved>> {
        let resolution = self.resolve_named_table(name, None);
        if resolution.is_empty() {
            None
        } else {
            Some(resolution)
        }
    }

    fn resolve_named_table(&self, name: &Name, alias: Option<&Name>) -> Vec<Resolved> {
        let Some(entry) = self.symbol_table().get(&name.text) else {
            self.errors.push(ResolutionError::table_name_not_found(
                name.span,
                format!("Cannot find table or view {}", name.text),
                self.symbol_table().names(),
            ));
            return vec![];
        };
        if let Some(tag) = &entry.tag {
            self.add_dependency(tag.clone());
        }
        let visible = alias.unwrap_or(name);
        match entry.definition.as_ref() {
            TableDefinition::Table(schema) => {
                self.add_table_dependency(&schema.name);
                self.find_element_at_cursor(name.span, schema.span);
                vec![Resolved::Table(ResolvedTable::from_schema(
                    schema,
                    &visible.text,
                    entry.tag.clone(),
                    visible.span,
                ))]
            }
            TableDefinition::View {
                name: view_name,
                select,
            } => {
                if self.is_resolving(&view_name.text) {
                    tracing::warn!(view = %view_name.text, "cyclic view resolution");
                    self.errors.push(ResolutionError::expression(
                        name.span,
                        format!("Cyclic resolution of view {}", view_name.text),
                    ));
                    return vec![];
                }
                self.find_element_at_cursor(name.span, view_name.span);
                // the view body belongs to another context; its resolution
                // must not observe this statement's scope or cursor
                let derived = self.resolving(&view_name.text).without_cursor();
                let resolution = derived.resolve_select(select, None);
                vec![Resolved::QueryResults(QueryResults::new(
                    visible.text.clone(),
                    resolution,
                    visible.span,
                ))]
            }
            TableDefinition::CommonTable {
                name: cte_name,
                columns,
                select,
                recursive,
            } => {
                if self.is_resolving(&cte_name.text) {
                    tracing::warn!(common_table = %cte_name.text, "cyclic common table resolution");
                    self.errors.push(ResolutionError::with_table(
                        name.span,
                        format!("Cyclic resolution of common table {}", cte_name.text),
                    ));
                    return vec![];
                }
                self.find_element_at_cursor(name.span, cte_name.span);
                let derived = self.resolving(&cte_name.text);
                let binding = if *recursive {
                    Some((cte_name, columns.as_slice()))
                } else {
                    None
                };
                let resolution = derived.resolve_select(select, binding);
                let renamed = self.apply_column_list(cte_name, columns, resolution);
                vec![Resolved::QueryResults(QueryResults::new(
                    visible.text.clone(),
                    renamed,
                    visible.span,
                ))]
            }
        }
    }

    /// Rename a resolution's leaves to a common table's explicit column list
    pub(crate) fn apply_column_list(
        &self,
        cte_name: &Name,
        columns: &[Name],
        resolution: Vec<Resolved>,
    ) -> Vec<Resolved> {
        if columns.is_empty() {
            return resolution;
        }
        let leaf_count = crate::result::result_column_size(&resolution);
        if columns.len() != leaf_count {
            let mismatch = CatalogError::ColumnCountMismatch {
                found: leaf_count,
                expected: columns.len(),
                span: cte_name.span,
            };
            self.errors
                .push(ResolutionError::with_table(mismatch.span(), mismatch.to_string()));
            return resolution;
        }
        let mut renamed = resolution;
        let mut index = 0usize;
        for result in &mut renamed {
            result.for_each_leaf_mut(&mut |leaf| {
                leaf.name = columns[index].text.clone();
                leaf.element = columns[index].span;
                index += 1;
            });
        }
        renamed
    }

    /// Find a column by name within an assembled resolution
    ///
    /// Used for explicit column lists (INSERT, UPDATE SET, indexed columns,
    /// USING clauses). Reports `error_text` when given, otherwise a generic
    /// not-found message.
    pub fn resolve_column_in(
        &self,
        values: &[Resolved],
        name: &Name,
        error_text: Option<String>,
    ) -> Option<Value> {
        let leaves = expand(values);
        let mut matches = leaves.into_iter().filter(|leaf| leaf.name == name.text);
        match matches.next() {
            Some(leaf) => {
                self.find_element_at_cursor(name.span, leaf.element);
                Some(leaf)
            }
            None => {
                let message = error_text
                    .unwrap_or_else(|| format!("No column found with name {}", name.text));
                self.errors
                    .push(ResolutionError::expression(name.span, message));
                None
            }
        }
    }

    /// The schema of a foreign-key target; only concrete tables qualify
    pub(crate) fn foreign_table_schema(&self, name: &Name) -> Option<TableSchema> {
        match self.symbol_table().get(&name.text) {
            Some(entry) => {
                if let Some(tag) = &entry.tag {
                    self.add_dependency(tag.clone());
                }
                match entry.definition.as_ref() {
                    TableDefinition::Table(schema) => {
                        self.find_element_at_cursor(name.span, schema.span);
                        Some(schema.clone())
                    }
                    _ => {
                        self.errors.push(ResolutionError::table_name_not_found(
                            name.span,
                            format!("Cannot find table {}", name.text),
                            self.symbol_table().names(),
                        ));
                        None
                    }
                }
            }
            None => {
                self.errors.push(ResolutionError::table_name_not_found(
                    name.span,
                    format!("Cannot find table {}", name.text),
                    self.symbol_table().names(),
                ));
                None
            }
        }
    }

    /// Build a resolved table scope for a CREATE TABLE being validated
    pub(crate) fn table_under_definition(
        &self,
        schema: &TableSchema,
        element: Span,
    ) -> Vec<Resolved> {
        vec![Resolved::Table(ResolvedTable::from_schema(
            schema,
            &schema.name,
            None,
            element,
        ))]
    }
}

// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Resolution results
//!
//! The closed variant describing what a name resolves to: a single typed
//! value, a whole table's columns, or a named composite result set (view,
//! subquery, or common table). Arity checks everywhere go through
//! [`result_column_size`], defined recursively over the variant, and
//! consumers needing flat columns use [`expand`].

use serde::{Deserialize, Serialize};
use sqlsema_catalog::{ColumnSchema, SourceTag, TableSchema};
use sqlsema_syntax::{DataType, Span};
use std::collections::BTreeMap;

/// A single typed column or expression result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Value {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    pub has_default: bool,
    /// The source element this value resolves back to
    pub element: Span,
}

impl Value {
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool, element: Span) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
            has_default: false,
            element,
        }
    }

    pub fn from_column(column: &ColumnSchema) -> Self {
        Self {
            name: column.name.clone(),
            data_type: column.data_type,
            nullable: column.nullable,
            has_default: column.has_default,
            element: column.span,
        }
    }
}

/// A resolved table reference: ordered columns plus provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTable {
    /// Name the table is visible under in scope (the alias when aliased)
    pub name: String,
    pub columns: Vec<Value>,
    pub tag: Option<SourceTag>,
    /// The aliasing element, used as the resolution target of qualifiers
    pub element: Span,
}

impl ResolvedTable {
    pub fn from_schema(
        schema: &TableSchema,
        name: impl Into<String>,
        tag: Option<SourceTag>,
        element: Span,
    ) -> Self {
        Self {
            name: name.into(),
            columns: schema.columns.iter().map(Value::from_column).collect(),
            tag,
            element,
        }
    }
}

/// A named composite result set (view, subquery, or query)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResults {
    pub name: String,
    /// Nested results in projection order
    pub results: Vec<Resolved>,
    /// Generated type identity derived from the owning file path
    pub type_identity: Option<String>,
    /// Documentation text attached to the statement
    pub doc: Option<String>,
    pub element: Span,
}

impl QueryResults {
    pub fn new(name: impl Into<String>, results: Vec<Resolved>, element: Span) -> Self {
        Self {
            name: name.into(),
            results,
            type_identity: None,
            doc: None,
            element,
        }
    }

    pub fn with_type_identity(mut self, identity: impl Into<String>) -> Self {
        self.type_identity = Some(identity.into());
        self
    }

    pub fn with_doc(mut self, doc: Option<String>) -> Self {
        self.doc = doc;
        self
    }

    /// Disambiguate duplicate leaf-column names deterministically
    ///
    /// The second occurrence of a name becomes `name_2`, the third `name_3`,
    /// in flattened leaf order. This produces stable generated names; it is
    /// not a semantic renaming of the SQL.
    pub fn modify_duplicates(mut self) -> Self {
        let mut seen: BTreeMap<String, usize> = BTreeMap::new();
        for result in &mut self.results {
            result.for_each_leaf_mut(&mut |leaf| {
                let count = seen.entry(leaf.name.clone()).or_insert(0);
                *count += 1;
                if *count > 1 {
                    leaf.name = format!("{}_{}", leaf.name, *count);
                }
            });
        }
        self
    }
}

/// What a name resolved to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Resolved {
    Value(Value),
    Table(ResolvedTable),
    QueryResults(QueryResults),
}

impl Resolved {
    pub fn name(&self) -> &str {
        match self {
            Resolved::Value(value) => &value.name,
            Resolved::Table(table) => &table.name,
            Resolved::QueryResults(query) => &query.name,
        }
    }

    pub fn element(&self) -> Span {
        match self {
            Resolved::Value(value) => value.element,
            Resolved::Table(table) => table.element,
            Resolved::QueryResults(query) => query.element,
        }
    }

    /// Total leaf-column count, recursive over the variant
    pub fn result_column_size(&self) -> usize {
        match self {
            Resolved::Value(_) => 1,
            Resolved::Table(table) => table.columns.len(),
            Resolved::QueryResults(query) => result_column_size(&query.results),
        }
    }

    /// Flatten to leaf columns, in order
    pub fn expand(&self) -> Vec<Value> {
        match self {
            Resolved::Value(value) => vec![value.clone()],
            Resolved::Table(table) => table.columns.clone(),
            Resolved::QueryResults(query) => expand(&query.results),
        }
    }

    /// Mark every leaf column nullable (right side of a LEFT JOIN)
    pub fn into_nullable(mut self) -> Self {
        self.for_each_leaf_mut(&mut |leaf| leaf.nullable = true);
        self
    }

    pub(crate) fn for_each_leaf_mut(&mut self, f: &mut dyn FnMut(&mut Value)) {
        match self {
            Resolved::Value(value) => f(value),
            Resolved::Table(table) => table.columns.iter_mut().for_each(|c| f(c)),
            Resolved::QueryResults(query) => {
                query.results.iter_mut().for_each(|r| r.for_each_leaf_mut(f))
            }
        }
    }
}

/// Total leaf-column count of a result sequence
pub fn result_column_size(results: &[Resolved]) -> usize {
    results.iter().map(Resolved::result_column_size).sum()
}

/// Flatten a result sequence to its leaf columns, in order
pub fn expand(results: &[Resolved]) -> Vec<Value> {
    results.iter().flat_map(Resolved::expand).collect()
}

/// Positionally unify a compound branch into the baseline
///
/// Column *i* of `other` refines column *i* of `baseline`; the baseline's
/// structure and arity always survive, so trailing baseline columns past a
/// shorter branch keep their own definition.
pub fn merge(baseline: Vec<Resolved>, other: &[Resolved]) -> Vec<Resolved> {
    let other_leaves = expand(other);
    let mut merged = baseline;
    let mut index = 0usize;
    for result in &mut merged {
        result.for_each_leaf_mut(&mut |leaf| {
            if let Some(branch) = other_leaves.get(index) {
                let (data_type, nullable) = unify(leaf, branch);
                leaf.data_type = data_type;
                leaf.nullable = nullable;
            }
            index += 1;
        });
    }
    merged
}

/// Unify one baseline column with its positional counterpart
///
/// Equal types are kept; `Null` defers to the other side and forces
/// nullability; integer and real widen to real; any other disagreement keeps
/// the baseline type. Nullability is OR-ed.
fn unify(base: &Value, other: &Value) -> (DataType, bool) {
    let nullable = base.nullable || other.nullable;
    match (base.data_type, other.data_type) {
        (a, b) if a == b => (a, nullable),
        (DataType::Null, b) => (b, true),
        (a, DataType::Null) => (a, true),
        (DataType::Integer, DataType::Real) | (DataType::Real, DataType::Integer) => {
            (DataType::Real, nullable)
        }
        (a, _) => (a, nullable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(name: &str, data_type: DataType, nullable: bool) -> Value {
        Value::new(name, data_type, nullable, Span::default())
    }

    fn table(name: &str, columns: Vec<Value>) -> Resolved {
        Resolved::Table(ResolvedTable {
            name: name.to_string(),
            columns,
            tag: None,
            element: Span::default(),
        })
    }

    #[test]
    fn test_result_column_size_recursive() {
        let results = vec![
            Resolved::Value(value("a", DataType::Integer, false)),
            table(
                "t",
                vec![
                    value("b", DataType::Text, true),
                    value("c", DataType::Real, false),
                ],
            ),
            Resolved::QueryResults(QueryResults::new(
                "q",
                vec![Resolved::Value(value("d", DataType::Integer, false))],
                Span::default(),
            )),
        ];
        assert_eq!(result_column_size(&results), 4);
        assert_eq!(
            expand(&results).iter().map(|v| v.name.as_str()).collect::<Vec<_>>(),
            vec!["a", "b", "c", "d"]
        );
    }

    #[test]
    fn test_merge_unifies_positionally() {
        let baseline = vec![
            Resolved::Value(value("a", DataType::Integer, false)),
            Resolved::Value(value("b", DataType::Text, false)),
        ];
        let branch = vec![
            Resolved::Value(value("x", DataType::Real, false)),
            Resolved::Value(value("y", DataType::Null, true)),
        ];
        let merged = merge(baseline, &branch);
        let leaves = expand(&merged);
        // names come from the baseline
        assert_eq!(leaves[0].name, "a");
        assert_eq!(leaves[0].data_type, DataType::Real);
        assert_eq!(leaves[1].data_type, DataType::Text);
        assert!(leaves[1].nullable);
    }

    #[test]
    fn test_merge_past_shorter_branch_keeps_baseline() {
        let baseline = vec![
            Resolved::Value(value("a", DataType::Integer, false)),
            Resolved::Value(value("b", DataType::Text, true)),
        ];
        let branch = vec![Resolved::Value(value("x", DataType::Integer, false))];
        let merged = merge(baseline.clone(), &branch);
        assert_eq!(merged[1], baseline[1]);
    }

    #[test]
    fn test_modify_duplicates() {
        let query = QueryResults::new(
            "q",
            vec![
                Resolved::Value(value("id", DataType::Integer, false)),
                table(
                    "t",
                    vec![
                        value("id", DataType::Integer, false),
                        value("name", DataType::Text, false),
                    ],
                ),
                Resolved::Value(value("id", DataType::Integer, false)),
            ],
            Span::default(),
        );
        let names: Vec<String> = expand(&query.modify_duplicates().results)
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(names, vec!["id", "id_2", "name", "id_3"]);
    }

    #[test]
    fn test_into_nullable() {
        let result = table("t", vec![value("a", DataType::Integer, false)]).into_nullable();
        assert!(result.expand()[0].nullable);
    }
}

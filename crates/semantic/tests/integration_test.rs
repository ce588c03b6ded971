// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Integration tests for the semantic crate
//!
//! Exercises resolution and file validation end to end over AST fixtures:
//! scope assembly, compound merging, common table expressions, bind-argument
//! typing, and the per-file orchestration including error aggregation.

use sqlsema_catalog::{ColumnSchema, SymbolTable, TableDefinition, TableSchema};
use sqlsema_semantic::{
    expand, ArgumentType, ErrorKind, FileValidator, Resolver, ValidationStatus,
};
use sqlsema_syntax::expr::Expr;
use sqlsema_syntax::stmt::{
    CompoundOp, CreateViewStmt, FromClause, ImportStmt, JoinOperator, ResultColumn, SelectBody,
    SelectCore, SelectStmt, StatementKind, TableOrSubquery,
};
use sqlsema_syntax::{DataType, Span};
use sqlsema_test_utils::{AstFactory, SchemaFixtures};

// ===== Resolution =====

#[test]
fn test_select_star_resolves_table_shape() {
    let f = AstFactory::new();
    let resolver = Resolver::new(SchemaFixtures::users_only());
    let select = f.select_wildcard_from("users");

    let resolution = resolver.resolve_select(&select, None);

    assert!(resolver.errors.is_empty(), "{:?}", resolver.errors.take());
    let columns = expand(&resolution);
    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "name", "email"]);
    assert_eq!(columns[0].data_type, DataType::Integer);
    assert!(!columns[0].nullable);
    assert_eq!(columns[2].data_type, DataType::Text);
    assert!(columns[2].nullable);

    assert!(resolver.dependencies().contains(&SchemaFixtures::users_tag()));
    assert!(resolver.table_dependencies().contains("users"));
}

#[test]
fn test_resolution_is_idempotent() {
    let f = AstFactory::new();
    let resolver = Resolver::new(SchemaFixtures::users_and_orders());
    let select = f.select_wildcard_from("users");

    let first = resolver.resolve_select(&select, None);
    let second = resolver.resolve_select(&select, None);

    assert_eq!(first, second);
    assert!(resolver.errors.is_empty(), "{:?}", resolver.errors.take());
}

#[test]
fn test_compound_column_count_mismatch() {
    let f = AstFactory::new();
    let resolver = Resolver::new(SchemaFixtures::users_only());
    let two = f.select_columns_from(
        vec![
            f.result_expr(f.column("id")),
            f.result_expr(f.column("name")),
        ],
        "users",
    );
    let one = f.select_columns_from(vec![f.result_expr(f.column("id"))], "users");
    let select = f.compound(two, CompoundOp::Union, one);

    resolver.resolve_select(&select, None);

    let errors = resolver.errors.take();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message(),
        "Unexpected number of columns in compound statement found: 1 expected: 2"
    );
}

#[test]
fn test_compound_null_branch_widens_nullability() {
    let f = AstFactory::new();
    let resolver = Resolver::new(SchemaFixtures::users_only());
    let base = f.select_columns_from(vec![f.result_expr(f.column("id"))], "users");
    let nulls = f.select_no_from(vec![f.result_expr(f.null())]);
    let select = f.compound(base, CompoundOp::Union, nulls);

    let resolution = resolver.resolve_select(&select, None);

    assert!(resolver.errors.is_empty(), "{:?}", resolver.errors.take());
    let columns = expand(&resolution);
    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0].data_type, DataType::Integer);
    assert!(columns[0].nullable);
}

#[test]
fn test_common_table_scopes_select() {
    let f = AstFactory::new();
    let resolver = Resolver::new(SchemaFixtures::users_only());
    let body = f.select_wildcard_from("users");
    let with = f.with_clause(false, vec![f.cte("u", vec![], body)]);
    let select = f.select_wildcard_from("u").with_clause(with);

    let resolution = resolver.resolve_select(&select, None);

    assert!(resolver.errors.is_empty(), "{:?}", resolver.errors.take());
    assert_eq!(expand(&resolution).len(), 3);
    // the common table itself is not a concrete table dependency
    assert!(resolver.table_dependencies().contains("users"));
    assert!(!resolver.table_dependencies().contains("u"));
}

#[test]
fn test_cyclic_common_table_terminates_with_error() {
    let f = AstFactory::new();
    let resolver = Resolver::new(SymbolTable::new());
    // no terminating non-recursive branch; expansion must hit the guard
    let body = f.select_wildcard_from("t");
    let with = f.with_clause(true, vec![f.cte("t", vec![], body)]);
    let select = f.select_wildcard_from("t").with_clause(with);

    resolver.resolve_select(&select, None);

    let errors = resolver.errors.take();
    assert!(
        errors
            .iter()
            .any(|e| e.message() == "Cyclic resolution of common table t"),
        "{errors:?}"
    );
}

#[test]
fn test_cyclic_view_terminates_with_error() {
    let f = AstFactory::new();
    let mut table = SymbolTable::new();
    // v is defined as SELECT * FROM v
    let name = f.name("v");
    let body = f.select_wildcard_from("v");
    table
        .insert(TableDefinition::View { name, select: body }, None)
        .expect("fresh table");
    let resolver = Resolver::new(table);

    resolver.resolve_select(&f.select_wildcard_from("v"), None);

    let errors = resolver.errors.take();
    assert!(
        errors
            .iter()
            .any(|e| e.kind() == ErrorKind::Expression
                && e.message() == "Cyclic resolution of view v"),
        "{errors:?}"
    );
}

#[test]
fn test_recursive_common_table_binds_final_branch() {
    let f = AstFactory::new();
    let resolver = Resolver::new(SymbolTable::new());
    let seed = f.select_no_from(vec![f.result_expr(f.integer(1))]);
    let step = f.select_columns_from(vec![f.result_expr(f.column("x"))], "cnt");
    let body = f.compound(seed, CompoundOp::UnionAll, step);
    let with = f.with_clause(true, vec![f.cte("cnt", vec!["x"], body)]);
    let select = f.select_wildcard_from("cnt").with_clause(with);

    let resolution = resolver.resolve_select(&select, None);

    assert!(resolver.errors.is_empty(), "{:?}", resolver.errors.take());
    let columns = expand(&resolution);
    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0].name, "x");
    assert_eq!(columns[0].data_type, DataType::Integer);
}

#[test]
fn test_left_join_makes_right_side_nullable() {
    let f = AstFactory::new();
    let resolver = Resolver::new(SchemaFixtures::users_and_orders());
    let base = TableOrSubquery::table(f.name("users"));
    let on = f.eq(
        f.qualified_column("users", "id"),
        f.qualified_column("orders", "user_id"),
    );
    let join = f.join_on(JoinOperator::Left, TableOrSubquery::table(f.name("orders")), on);
    let from = f.join_clause(base, vec![join]);

    let span = f.span(1);
    let mut body = SelectBody::new(vec![ResultColumn::Wildcard(span)], span);
    body.from = Some(from);
    let select = SelectStmt::new(SelectCore::Select(body), span);

    let resolution = resolver.resolve_select(&select, None);

    assert!(resolver.errors.is_empty(), "{:?}", resolver.errors.take());
    let columns = expand(&resolution);
    assert_eq!(columns.len(), 6);
    // left side keeps its declared nullability
    assert!(!columns[0].nullable);
    // everything from the right side may be absent
    assert!(columns[3..].iter().all(|c| c.nullable));
}

#[test]
fn test_where_bind_takes_compared_column_type() {
    let f = AstFactory::new();
    let resolver = Resolver::new(SchemaFixtures::users_only());
    let mut select = f.select_wildcard_from("users");
    let SelectCore::Select(body) = &mut select.core else {
        panic!("expected select body")
    };
    body.where_clause = Some(f.eq(f.column("name"), f.bind()));

    resolver.resolve_select(&select, None);

    assert!(resolver.errors.is_empty(), "{:?}", resolver.errors.take());
    let arguments = resolver.arguments();
    assert_eq!(arguments.len(), 1);
    assert_eq!(arguments[0].index, 1);
    match &arguments[0].argument_type {
        ArgumentType::SingleValue(Some(value)) => {
            assert_eq!(value.data_type, DataType::Text);
            assert!(!value.nullable);
        }
        other => panic!("unexpected argument type {other:?}"),
    }
}

// ===== File validation =====

#[test]
fn test_validated_file_carries_queries_and_dependencies() {
    let f = AstFactory::new();
    let select = f.select_columns_from(
        vec![
            f.result_expr(f.column("name")),
            f.result_expr(f.column("name")),
        ],
        "users",
    );
    let file = f.file("com/example/User.sq", vec![f.named_select("selectNames", select)]);

    let status = FileValidator::new(SchemaFixtures::users_only()).validate(&file);

    let ValidationStatus::Validated {
        dependencies,
        queries,
        statements,
        ..
    } = status
    else {
        panic!("expected validated, got {status:?}")
    };
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].name, "selectNames");
    assert_eq!(
        queries[0].type_identity.as_deref(),
        Some("com.example.User")
    );
    // colliding result names are disambiguated positionally
    let columns = expand(&queries[0].results);
    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["name", "name_2"]);
    assert!(dependencies.contains(&SchemaFixtures::users_tag()));
    assert!(statements[0].table_names.contains("users"));
}

#[test]
fn test_duplicate_statement_identifier() {
    let f = AstFactory::new();
    let first = f.select_wildcard_from("users");
    let second = f.select_wildcard_from("users");
    let file = f.file(
        "com/example/User.sq",
        vec![
            f.named_select("selectAll", first),
            f.named_select("selectAll", second),
        ],
    );

    let status = FileValidator::new(SchemaFixtures::users_only()).validate(&file);

    assert!(status
        .errors()
        .iter()
        .any(|e| e.message() == "Duplicate SQL identifier"));
}

#[test]
fn test_statement_identifier_collides_with_column() {
    let f = AstFactory::new();
    let select = f.select_wildcard_from("users");
    let mut file = f.file("com/example/User.sq", vec![f.named_select("name", select)]);
    file.create_table = Some(SchemaFixtures::users_create_table());

    let status = FileValidator::new(SchemaFixtures::users_only()).validate(&file);

    assert!(status
        .errors()
        .iter()
        .any(|e| e.message() == "SQL identifier collides with column name"));
}

#[test]
fn test_path_with_dots_is_rejected() {
    let f = AstFactory::new();
    let select = f.select_wildcard_from("users");
    let file = f.file(
        "com/example.bad/Query.sq",
        vec![f.named_select("selectAll", select)],
    );

    let status = FileValidator::new(SchemaFixtures::users_only()).validate(&file);

    assert!(status.errors().iter().any(|e| e.message()
        == ".sq file parent directory should be package-compatible and not contain dots. \
            Use com/example/bad/Query.sq instead of com/example.bad/Query.sq"));
}

#[test]
fn test_empty_projection_is_rejected() {
    let f = AstFactory::new();
    let select = f.select_no_from(vec![]);
    let file = f.file("com/example/User.sq", vec![f.named_select("selectNothing", select)]);

    let status = FileValidator::new(SchemaFixtures::users_only()).validate(&file);

    assert!(status
        .errors()
        .iter()
        .any(|e| e.message() == "No result column found"));
}

#[test]
fn test_insert_missing_required_column() {
    let f = AstFactory::new();
    let insert = f.insert_values("users", vec!["id"], vec![vec![f.integer(1)]]);
    let file = f.file(
        "com/example/User.sq",
        vec![f.named("insertId", StatementKind::Insert(insert))],
    );

    let status = FileValidator::new(SchemaFixtures::users_only()).validate(&file);

    assert!(status.errors().iter().any(|e| e.message()
        == "Cannot populate default value for column name, it must be specified in \
            insert statement."));
}

#[test]
fn test_insert_binds_typed_by_target_columns() {
    let f = AstFactory::new();
    let insert = f.insert_values(
        "users",
        vec!["id", "name"],
        vec![vec![f.bind(), f.bind()]],
    );
    let file = f.file(
        "com/example/User.sq",
        vec![f.named("insertUser", StatementKind::Insert(insert))],
    );

    let status = FileValidator::new(SchemaFixtures::users_only()).validate(&file);

    let ValidationStatus::Validated { statements, .. } = status else {
        panic!("expected validated, got {status:?}")
    };
    let arguments = &statements[0].arguments;
    assert_eq!(arguments.len(), 2);
    assert_eq!(arguments[0].index, 1);
    assert_eq!(arguments[1].index, 2);
    match &arguments[1].argument_type {
        ArgumentType::SingleValue(Some(value)) => assert_eq!(value.data_type, DataType::Text),
        other => panic!("unexpected argument type {other:?}"),
    }
    assert!(statements[0].table_names.contains("users"));
}

#[test]
fn test_view_statement_produces_view_results() {
    let f = AstFactory::new();
    let name = f.name("activeUsers");
    let select = f.select_wildcard_from("users");
    let span = Span::new(name.span.start, select.span.end);
    let view = CreateViewStmt {
        name,
        select: Box::new(select),
        span,
    };
    let file = f.file(
        "com/example/User.sq",
        vec![f.named("activeUsers", StatementKind::CreateView(view))],
    );

    let status = FileValidator::new(SchemaFixtures::users_only()).validate(&file);

    let ValidationStatus::Validated { views, queries, .. } = status else {
        panic!("expected validated, got {status:?}")
    };
    assert!(queries.is_empty());
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].name, "activeUsers");
    assert_eq!(expand(&views[0].results).len(), 3);
}

#[test]
fn test_duplicate_imports_collide() {
    let f = AstFactory::new();
    let select = f.select_wildcard_from("users");
    let mut file = f.file("com/example/User.sq", vec![f.named_select("selectAll", select)]);
    file.imports = vec![
        ImportStmt {
            type_name: f.name("java.util.List"),
            span: f.span(22),
        },
        ImportStmt {
            type_name: f.name("kotlin.collections.List"),
            span: f.span(30),
        },
    ];

    let status = FileValidator::new(SchemaFixtures::users_only()).validate(&file);

    assert!(status
        .errors()
        .iter()
        .any(|e| e.message() == "Multiple imports for type List"));
}

#[test]
fn test_invalid_status_serializes_for_reporting() {
    let f = AstFactory::new();
    let select = f.select_wildcard_from("missing");
    let file = f.file("com/example/User.sq", vec![f.named_select("selectAll", select)]);

    let status = FileValidator::new(SchemaFixtures::users_only()).validate(&file);

    let json = serde_json::to_value(&status).expect("status serializes");
    let errors = &json["Invalid"]["errors"];
    assert_eq!(
        errors[0]["TableNameNotFound"]["message"],
        "Cannot find table or view missing"
    );
    assert_eq!(errors[0]["TableNameNotFound"]["suggestions"][0], "users");
}

// ===== Cursor lookup =====

fn bar_symbol_table() -> SymbolTable {
    let schema = TableSchema::new("bar", Span::new(913, 916)).with_columns(vec![
        ColumnSchema::new("x", DataType::Integer, Span::new(918, 919)),
    ]);
    let mut table = SymbolTable::new();
    table.insert(TableDefinition::Table(schema), None).unwrap();
    table
}

#[test]
fn test_find_declaration_of_alias_qualifier() {
    let f = AstFactory::new();
    let expr = f.qualified_column("foo", "x");
    let Expr::Column(column) = &expr else {
        panic!("expected column")
    };
    let qualifier_span = column.table.as_ref().unwrap().span;

    let select = f.select_columns_from_aliased(vec![f.result_expr(expr.clone())], "bar", "foo");
    let SelectCore::Select(body) = &select.core else {
        panic!("expected select body")
    };
    let Some(FromClause::Tables(sources)) = &body.from else {
        panic!("expected table source")
    };
    let TableOrSubquery::Table { alias, .. } = &sources[0] else {
        panic!("expected named table")
    };
    let alias_span = alias.as_ref().unwrap().span;

    let file = f.file("com/example/Bar.sq", vec![f.named_select("selectX", select)]);
    let validator = FileValidator::new(bar_symbol_table());

    assert_eq!(
        validator.find_declaration(&file, qualifier_span.start),
        Some(alias_span)
    );
    // and the file itself is otherwise valid
    assert!(validator.validate(&file).is_valid());
}

#[test]
fn test_find_declaration_of_column_leaf() {
    let f = AstFactory::new();
    let expr = f.column("x");
    let column_span = expr.span();

    let select = f.select_columns_from(vec![f.result_expr(expr)], "bar");
    let file = f.file("com/example/Bar.sq", vec![f.named_select("selectX", select)]);
    let validator = FileValidator::new(bar_symbol_table());

    // the unqualified reference resolves back to the schema column
    assert_eq!(
        validator.find_declaration(&file, column_span.start),
        Some(Span::new(918, 919))
    );
}

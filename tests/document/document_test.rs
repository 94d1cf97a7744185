use insta::assert_snapshot;
use ormql::config::Settings;
use ormql::document::{DocumentError, QueryDocument};
use ormql::prelude::*;

const CONFIG: &str = r#"
[dialect]
name = "mysql"

[entities.user]
table = "user"
columns = ["Id", "FirstName", "Age"]

[entities.order_detail]
columns = ["OrderId", "ItemId"]
"#;

fn db() -> Db {
    let settings: Settings = toml::from_str(CONFIG).unwrap();
    settings.db().unwrap()
}

fn render(json: &str) -> Result<Query, DocumentError> {
    QueryDocument::from_json(json)?.render(&db())
}

#[test]
fn test_render_fixture() {
    let json = std::fs::read_to_string(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/adults.json"
    ))
    .unwrap();
    let q = render(&json).unwrap();
    assert_snapshot!(
        q.sql,
        @"SELECT `first_name`,AVG(`age`) AS `avg_age` FROM `user` WHERE (`age` >= ?) AND (`id` IN (SELECT `order_id` FROM `order_detail` WHERE `item_id` > ?)) GROUP BY `first_name` HAVING AVG(`age`) < ? ORDER BY `first_name` DESC LIMIT ? OFFSET ?;"
    );
    assert_eq!(
        q.args,
        vec![
            Value::Int(18),
            Value::Int(3),
            Value::Int(60),
            Value::Int(10),
            Value::Int(20)
        ]
    );
}

#[test]
fn test_named_subquery_shared_between_references() {
    let q = render(
        r#"{
            "entity": "user",
            "where": [
                { "binary": { "op": "in", "left": { "column": { "name": "Id" } }, "right": { "subquery": "o" } } },
                { "keyword": { "keyword": "exists", "subquery": "o" } }
            ],
            "subqueries": {
                "o": { "entity": "order_detail", "alias": "o",
                       "select": [{ "column": { "name": "OrderId" } }],
                       "where": [{ "binary": { "op": "eq", "left": { "column": { "name": "ItemId" } }, "right": { "value": "x" } } }] }
            }
        }"#,
    )
    .unwrap();
    assert_snapshot!(
        q.sql,
        @"SELECT * FROM `user` WHERE (`id` IN (SELECT `order_id` FROM `order_detail` WHERE `item_id` = ?)) AND EXISTS (SELECT `order_id` FROM `order_detail` WHERE `item_id` = ?);"
    );
    assert_eq!(q.args, vec![Value::Text("x".into()), Value::Text("x".into())]);
}

#[test]
fn test_subquery_from_and_qualified_columns() {
    let q = render(
        r#"{
            "entity": "order_detail",
            "select": [{ "column": { "name": "ItemId", "table": { "subquery": "s" } } }],
            "from": { "subquery": "s" },
            "subqueries": { "s": { "entity": "order_detail", "alias": "s", "columns": ["ItemId"] } }
        }"#,
    )
    .unwrap();
    assert_snapshot!(
        q.sql,
        @"SELECT `s`.`item_id` FROM (SELECT * FROM `order_detail`) AS `s`;"
    );
}

#[test]
fn test_empty_subquery_alias_rejected() {
    let err = render(
        r#"{
            "entity": "order_detail",
            "from": { "subquery": "s" },
            "subqueries": { "s": { "entity": "order_detail", "alias": "" } }
        }"#,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        DocumentError::Build(BuildError::MissingSubqueryAlias)
    ));
}

#[test]
fn test_empty_table_alias_leaves_columns_bare() {
    let q = render(
        r#"{
            "entity": "user",
            "select": [{ "column": { "name": "ItemId", "table": { "entity": "order_detail", "alias": "" } } }],
            "from": { "entity": "order_detail", "alias": "" }
        }"#,
    )
    .unwrap();
    assert_snapshot!(q.sql, @"SELECT `item_id` FROM `order_detail`;");
}

#[test]
fn test_arithmetic_and_raw_nodes() {
    let q = render(
        r#"{
            "entity": "user",
            "where": [
                { "binary": { "op": "eq",
                              "left": { "column": { "name": "Age" } },
                              "right": { "binary": { "op": "add", "left": { "column": { "name": "Age" } }, "right": { "value": 1 } } } } },
                { "raw": { "sql": "`id` BETWEEN ? AND ?", "args": [1, 9] } },
                { "binary": { "op": "not", "left": { "binary": { "op": "is_null", "left": { "column": { "name": "FirstName" } } } } } }
            ]
        }"#,
    )
    .unwrap();
    assert_snapshot!(
        q.sql,
        @"SELECT * FROM `user` WHERE ((`age` = (`age` + ?)) AND (`id` BETWEEN ? AND ?)) AND (NOT (`first_name` IS NULL));"
    );
    assert_eq!(q.args, vec![Value::Int(1), Value::Int(1), Value::Int(9)]);
}

#[test]
fn test_verbatim_from_text() {
    let q = render(r#"{ "entity": "user", "from": "shop.user" }"#).unwrap();
    assert_eq!(q.sql, "SELECT * FROM shop.user;");
}

#[test]
fn test_missing_entity() {
    assert!(matches!(
        render(r#"{ "limit": 1 }"#),
        Err(DocumentError::Build(BuildError::NilEntity))
    ));
}

#[test]
fn test_unknown_field_surfaces_build_error() {
    let err = render(
        r#"{ "entity": "user", "where": [{ "binary": { "op": "eq", "left": { "column": { "name": "Nope" } }, "right": { "value": 1 } } }] }"#,
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "unknown field 'Nope'");
}

#[test]
fn test_bad_sort_direction() {
    assert!(matches!(
        render(r#"{ "entity": "user", "order_by": [{ "column": { "name": "Id" }, "dir": "desc" }] }"#),
        Err(DocumentError::UnknownSortDirection(dir)) if dir == "desc"
    ));
}

#[test]
fn test_invalid_json() {
    assert!(matches!(render("{"), Err(DocumentError::Json(_))));
}

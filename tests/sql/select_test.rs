use insta::assert_snapshot;
use ormql::prelude::*;

struct User;

impl Entity for User {
    fn metadata() -> EntityMetadata {
        EntityMetadata::new("user").fields(&["Id", "FirstName", "Age", "LastName"])
    }
}

#[test]
fn test_select_all_default_table() {
    let q = Db::default().select::<User>().from("").build().unwrap();
    assert_snapshot!(q.sql, @"SELECT * FROM `user`;");
    assert!(q.args.is_empty());
}

#[test]
fn test_where_resolves_column_name() {
    let q = Db::default()
        .select::<User>()
        .filter(col("Age").gt(18))
        .build()
        .unwrap();
    assert_snapshot!(q.sql, @"SELECT * FROM `user` WHERE `age` > ?;");
    assert_eq!(q.args, vec![Value::Int(18)]);
}

#[test]
fn test_multiple_filters_fold_with_and() {
    let q = Db::default()
        .select::<User>()
        .where_all([
            col("Age").gt(18),
            col("FirstName").eq("Tom"),
            col("LastName").like("J%").or(col("LastName").is_null()),
        ])
        .build()
        .unwrap();
    assert_snapshot!(
        q.sql,
        @"SELECT * FROM `user` WHERE ((`age` > ?) AND (`first_name` = ?)) AND ((`last_name` LIKE ?) OR (`last_name` IS NULL));"
    );
    assert_eq!(
        q.args,
        vec![Value::Int(18), Value::Text("Tom".into()), Value::Text("J%".into())]
    );
}

#[test]
fn test_paging_order_is_fixed() {
    let a = Db::default().select::<User>().limit(10).offset(5).build().unwrap();
    let b = Db::default().select::<User>().offset(5).limit(10).build().unwrap();
    assert_eq!(a, b);
    assert_snapshot!(a.sql, @"SELECT * FROM `user` LIMIT ? OFFSET ?;");
    assert_eq!(a.args, vec![Value::Int(10), Value::Int(5)]);
}

#[test]
fn test_args_follow_placeholder_order() {
    let q = Db::default()
        .select::<User>()
        .select(vec![raw("`age` * ?", vec![2.into()]).into()])
        .filter(col("Id").gt(7))
        .having(avg("Age").lt(40))
        .group_by([col("Age")])
        .limit(3)
        .build()
        .unwrap();
    assert_snapshot!(
        q.sql,
        @"SELECT `age` * ? FROM `user` WHERE `id` > ? GROUP BY `age` HAVING AVG(`age`) < ? LIMIT ?;"
    );
    assert_eq!(
        q.args,
        vec![Value::Int(2), Value::Int(7), Value::Int(40), Value::Int(3)]
    );
}

#[test]
fn test_arithmetic_parenthesization() {
    let q = Db::default()
        .select::<User>()
        .filter(col("Age").eq(col("Age").add(1)))
        .filter(not(col("Id").modulo(2).eq(0)))
        .build()
        .unwrap();
    assert_snapshot!(
        q.sql,
        @"SELECT * FROM `user` WHERE (`age` = (`age` + ?)) AND (NOT ((`id` % ?) = ?));"
    );
}

#[test]
fn test_unknown_field_returns_no_sql() {
    let err = Db::default()
        .select::<User>()
        .filter(col("Unknown").eq(1))
        .build()
        .unwrap_err();
    assert_eq!(err, BuildError::UnknownField("Unknown".into()));
    assert_eq!(err.to_string(), "unknown field 'Unknown'");
}

#[test]
fn test_unknown_field_in_select_list() {
    let err = Db::default()
        .select::<User>()
        .select(vec![col("Nickname").into()])
        .build()
        .unwrap_err();
    assert_eq!(err, BuildError::UnknownField("Nickname".into()));
}

#[test]
fn test_unknown_aggregate_field() {
    let err = Db::default()
        .select::<User>()
        .select(vec![avg("Nope").alias("a").into()])
        .build()
        .unwrap_err();
    assert_eq!(err, BuildError::UnknownField("Nope".into()));

    let err = Db::default()
        .select::<User>()
        .group_by([col("Age")])
        .having(avg("Nope").gt(1))
        .build()
        .unwrap_err();
    assert_eq!(err, BuildError::UnknownField("Nope".into()));
}

#[test]
fn test_determinism() {
    let selector = Db::default()
        .select::<User>()
        .select(vec![col("FirstName").alias("name").into(), max("Age").into()])
        .filter(col("Age").gte(18).and(col("Age").lte(65)))
        .group_by([col("FirstName")])
        .order_by([OrderBy::desc(col("FirstName"))]);
    let first = selector.build().unwrap();
    let second = selector.build().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_postgres_quoting() {
    let q = Db::with_dialect(Dialect::Postgres)
        .select::<User>()
        .select(vec![col("FirstName").into(), count("Id").alias("n").into()])
        .filter(col("Age").ne(30))
        .group_by([col("FirstName")])
        .build()
        .unwrap();
    assert_snapshot!(
        q.sql,
        @r#"SELECT "first_name",COUNT("id") AS "n" FROM "user" WHERE "age" <> ? GROUP BY "first_name";"#
    );
}

#[test]
fn test_sqlite_not_equal_spelling() {
    let q = Db::with_dialect(Dialect::Sqlite)
        .select::<User>()
        .filter(col("Age").ne(30))
        .build()
        .unwrap();
    assert_snapshot!(q.sql, @r#"SELECT * FROM "user" WHERE "age" != ?;"#);
}

#[test]
fn test_custom_dialect_substitution() {
    let dialect = CustomDialect::new("odd", Dialect::MySql)
        .with_quote('"')
        .with_operator(Operator::And, "&&");
    let q = Db::with_dialect(dialect)
        .select::<User>()
        .filter(col("Age").gt(1))
        .filter(col("Id").lt(9))
        .build()
        .unwrap();
    assert_snapshot!(q.sql, @r#"SELECT * FROM "user" WHERE ("age" > ?) && ("id" < ?);"#);
}

#[test]
fn test_query_serializes_to_json() {
    let q = Db::default()
        .select::<User>()
        .filter(col("FirstName").eq("Tom"))
        .build()
        .unwrap();
    let json = serde_json::to_string(&q).unwrap();
    assert_eq!(
        json,
        r#"{"sql":"SELECT * FROM `user` WHERE `first_name` = ?;","args":["Tom"]}"#
    );
}

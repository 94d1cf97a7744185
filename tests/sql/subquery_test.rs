use insta::assert_snapshot;
use ormql::prelude::*;

struct User;

impl Entity for User {
    fn metadata() -> EntityMetadata {
        EntityMetadata::new("user").fields(&["Id", "FirstName", "Age"])
    }
}

struct OrderDetail;

impl Entity for OrderDetail {
    fn metadata() -> EntityMetadata {
        EntityMetadata::new("order_detail")
            .fields(&["OrderId", "ItemId"])
            .field("UsingCol1", "using_col_1")
    }
}

fn orders(db: &Db) -> Selector {
    db.select::<OrderDetail>()
        .select(vec![col("OrderId").into()])
        .filter(col("ItemId").gt(100))
}

#[test]
fn test_subquery_as_from_source() {
    let db = Db::default();
    let sub = db.select::<OrderDetail>().as_subquery("sub");
    let q = db
        .select::<User>()
        .from_table(sub)
        .build()
        .unwrap();
    assert_snapshot!(q.sql, @"SELECT * FROM (SELECT * FROM `order_detail`) AS `sub`;");
}

#[test]
fn test_subquery_args_precede_outer_args() {
    let db = Db::default();
    let sub = orders(&db).as_subquery("sub");
    let q = db
        .select::<User>()
        .select(vec![sub.col("OrderId").into()])
        .from_table(sub.clone())
        .filter(sub.col("OrderId").lt(5))
        .build()
        .unwrap();
    assert_snapshot!(
        q.sql,
        @"SELECT `sub`.`order_id` FROM (SELECT `order_id` FROM `order_detail` WHERE `item_id` > ?) AS `sub` WHERE `sub`.`order_id` < ?;"
    );
    assert_eq!(q.args, vec![Value::Int(100), Value::Int(5)]);
}

#[test]
fn test_missing_alias_is_rejected_at_build() {
    let db = Db::default();
    let sub = db.select::<OrderDetail>().as_subquery("");
    assert_eq!(
        db.select::<User>().from_table(sub).build(),
        Err(BuildError::MissingSubqueryAlias)
    );
}

#[test]
fn test_empty_alias_counts_as_missing() {
    let db = Db::default();
    let sub = Subquery::new(db.select::<OrderDetail>(), vec![], Some(String::new()));
    assert_eq!(
        db.select::<User>().from_table(sub).build(),
        Err(BuildError::MissingSubqueryAlias)
    );
}

#[test]
fn test_in_subquery() {
    let db = Db::default();
    let sub = orders(&db).as_subquery("sub");
    let q = db
        .select::<User>()
        .filter(col("Id").in_query(sub))
        .build()
        .unwrap();
    assert_snapshot!(
        q.sql,
        @"SELECT * FROM `user` WHERE `id` IN (SELECT `order_id` FROM `order_detail` WHERE `item_id` > ?);"
    );
    assert_eq!(q.args, vec![Value::Int(100)]);
}

#[test]
fn test_keyword_prefixes() {
    let db = Db::default();
    let sub = db.select::<OrderDetail>().as_subquery("sub");

    let q = db
        .select::<User>()
        .filter(not_exists(sub.clone()))
        .build()
        .unwrap();
    assert_snapshot!(
        q.sql,
        @"SELECT * FROM `user` WHERE NOT EXISTS (SELECT * FROM `order_detail`);"
    );

    let q = db
        .select::<User>()
        .filter(col("Id").gt(all(sub.clone())))
        .filter(col("Age").eq(any(sub)))
        .build()
        .unwrap();
    assert_snapshot!(
        q.sql,
        @"SELECT * FROM `user` WHERE (`id` > ALL (SELECT * FROM `order_detail`)) AND (`age` = ANY (SELECT * FROM `order_detail`));"
    );
}

#[test]
fn test_same_node_referenced_twice() {
    let db = Db::default();
    let sub = orders(&db).as_subquery("sub");
    assert!(!sub.is_compiled());

    let q = db
        .select::<User>()
        .filter(col("Id").in_query(sub.clone()))
        .filter(exists(sub.clone()))
        .build()
        .unwrap();

    assert!(sub.is_compiled());
    let inner = "(SELECT `order_id` FROM `order_detail` WHERE `item_id` > ?)";
    assert_eq!(q.sql.matches(inner).count(), 2);
    assert_eq!(q.args, vec![Value::Int(100), Value::Int(100)]);
}

#[test]
fn test_cached_text_reused_across_statements() {
    let db = Db::default();
    let sub = orders(&db).as_subquery("sub");
    let first = db
        .select::<User>()
        .filter(col("Id").in_query(sub.clone()))
        .build()
        .unwrap();
    let second = db
        .select::<User>()
        .filter(col("Id").not_in_query(sub.clone()))
        .build()
        .unwrap();
    assert!(first.sql.contains(&sub.compiled().unwrap().sql));
    assert!(second.sql.contains("NOT IN (SELECT `order_id`"));
    assert_eq!(second.args, vec![Value::Int(100)]);
}

#[test]
fn test_concurrent_builds_share_one_compilation() {
    let db = Db::default();
    let sub = orders(&db).as_subquery("sub");

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let db = db.clone();
            let sub = sub.clone();
            std::thread::spawn(move || {
                db.select::<User>()
                    .filter(col("Id").in_query(sub))
                    .filter(col("Age").gt(i))
                    .build()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let q = handle.join().unwrap().unwrap();
        assert_eq!(q.args, vec![Value::Int(100), Value::Int(i as i64)]);
    }
    assert!(sub.is_compiled());
}

#[test]
fn test_restricted_columns() {
    let db = Db::default();
    let sub = db
        .select::<OrderDetail>()
        .as_subquery_with(&["OrderId", "UsingCol1"], "sub");

    let q = db
        .select::<User>()
        .select(vec![sub.col("UsingCol1").into()])
        .from_table(sub.clone())
        .build()
        .unwrap();
    assert_snapshot!(
        q.sql,
        @"SELECT `sub`.`using_col_1` FROM (SELECT * FROM `order_detail`) AS `sub`;"
    );

    let err = db
        .select::<User>()
        .select(vec![sub.col("ItemId").into()])
        .from_table(sub)
        .build()
        .unwrap_err();
    assert_eq!(err, BuildError::UnknownField("ItemId".into()));
}

#[test]
fn test_restricted_columns_apply_to_aggregates() {
    let db = Db::default();
    let sub = db
        .select::<OrderDetail>()
        .as_subquery_with(&["OrderId"], "sub");

    let q = db
        .select::<User>()
        .select(vec![Aggregate::new("COUNT", "OrderId").of(sub.clone()).alias("n").into()])
        .from_table(sub.clone())
        .build()
        .unwrap();
    assert_snapshot!(
        q.sql,
        @"SELECT COUNT(`sub`.`order_id`) AS `n` FROM (SELECT * FROM `order_detail`) AS `sub`;"
    );

    let err = db
        .select::<User>()
        .select(vec![Aggregate::new("SUM", "ItemId").of(sub.clone()).into()])
        .from_table(sub.clone())
        .build()
        .unwrap_err();
    assert_eq!(err, BuildError::UnknownField("ItemId".into()));

    let err = db
        .select::<User>()
        .from_table(sub.clone())
        .group_by([sub.col("OrderId")])
        .having(Aggregate::new("MAX", "ItemId").of(sub).gt(1))
        .build()
        .unwrap_err();
    assert_eq!(err, BuildError::UnknownField("ItemId".into()));
}

#[test]
fn test_unrestricted_subquery_checks_inner_fields() {
    let db = Db::default();
    let sub = db.select::<OrderDetail>().as_subquery("sub");
    let err = db
        .select::<User>()
        .select(vec![sub.col("FirstName").into()])
        .from_table(sub)
        .build()
        .unwrap_err();
    assert_eq!(err, BuildError::UnknownField("FirstName".into()));
}

#[test]
fn test_inner_error_aborts_outer_build() {
    let db = Db::default();
    let sub = db
        .select::<OrderDetail>()
        .filter(col("Missing").eq(1))
        .as_subquery("sub");
    let q = db.select::<User>().filter(exists(sub.clone())).build();
    assert_eq!(q, Err(BuildError::UnknownField("Missing".into())));
    assert!(!sub.is_compiled());
}

#[test]
fn test_empty_table_alias_is_no_alias() {
    let db = Db::default();
    let t = Table::of::<OrderDetail>().alias("");
    let q = db
        .select::<User>()
        .from_table(t.clone())
        .filter(t.col("ItemId").eq(3))
        .build()
        .unwrap();
    assert_snapshot!(q.sql, @"SELECT * FROM `order_detail` WHERE `item_id` = ?;");
}

#[test]
fn test_aliased_table_qualifies_columns() {
    let db = Db::default();
    let t = Table::of::<OrderDetail>().alias("od");
    let q = db
        .select::<User>()
        .select(vec![
            t.col("ItemId").into(),
            t.aggregate("COUNT", "OrderId").alias("n").into(),
        ])
        .from_table(t.clone())
        .group_by([t.col("ItemId")])
        .build()
        .unwrap();
    assert_snapshot!(
        q.sql,
        @"SELECT `od`.`item_id`,COUNT(`od`.`order_id`) AS `n` FROM `order_detail` AS `od` GROUP BY `od`.`item_id`;"
    );
}

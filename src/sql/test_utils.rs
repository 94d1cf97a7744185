//! Test utilities for SQL emission validation.
//!
//! Checks that emitted SQL parses with sqlparser-rs for the target dialect.

use sqlparser::dialect::{MySqlDialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::parser::Parser;

use super::dialect::Dialect;

/// Validates that a SQL string is syntactically valid for the given dialect.
///
/// PostgreSQL parsing reads `?` as a JSONB operator, so placeholders are
/// renumbered to `$n` before parsing for that dialect.
pub fn validate_sql(sql: &str, dialect: Dialect) -> Result<(), String> {
    let parser_dialect: Box<dyn sqlparser::dialect::Dialect> = match dialect {
        Dialect::MySql => Box::new(MySqlDialect {}),
        Dialect::Postgres => Box::new(PostgreSqlDialect {}),
        Dialect::Sqlite => Box::new(SQLiteDialect {}),
    };

    let text = match dialect {
        Dialect::Postgres => numbered_placeholders(sql),
        _ => sql.to_string(),
    };

    Parser::parse_sql(&*parser_dialect, &text)
        .map(|_| ())
        .map_err(|e| format!("Invalid SQL for {:?}: {}\nSQL: {}", dialect, e, sql))
}

fn numbered_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut n = 0;
    for c in sql.chars() {
        if c == '?' {
            n += 1;
            out.push_str(&format!("${}", n));
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Db;
    use crate::metadata::{Entity, EntityMetadata};
    use crate::sql::expr::{col, sum, ExprExt};
    use crate::sql::query::OrderBy;

    struct User;

    impl Entity for User {
        fn metadata() -> EntityMetadata {
            EntityMetadata::new("user").fields(&["Id", "FirstName", "LastName", "Age"])
        }
    }

    #[test]
    fn test_validate_invalid_sql() {
        assert!(validate_sql("SELEC * FORM users", Dialect::Postgres).is_err());
    }

    #[test]
    fn test_built_statements_parse() {
        for dialect in [Dialect::MySql, Dialect::Postgres, Dialect::Sqlite] {
            let q = Db::with_dialect(dialect)
                .select::<User>()
                .filter(col("Age").gt(18).or(col("Id").eq(col("Age").add(1))))
                .limit(10)
                .offset(5)
                .build()
                .unwrap();
            validate_sql(&q.sql, dialect).unwrap();
        }
    }

    #[test]
    fn test_every_clause_parses() {
        for dialect in [Dialect::MySql, Dialect::Postgres, Dialect::Sqlite] {
            let q = Db::with_dialect(dialect)
                .select::<User>()
                .select(vec![col("Age").into(), sum("Id").alias("total").into()])
                .filter(col("FirstName").like("A%").and(col("LastName").is_not_null()))
                .group_by([col("Age")])
                .having(sum("Id").gt(3))
                .order_by([OrderBy::asc(col("Age"))])
                .limit(10)
                .offset(20)
                .build()
                .unwrap();
            validate_sql(&q.sql, dialect).unwrap();
        }
    }
}

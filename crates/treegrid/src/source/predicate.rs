//! Composable query predicates.
//!
//! A predicate can be evaluated against an in-memory record or lowered to a
//! SeaQuery condition for SQL sources.

use sea_query::{Alias, Cond, Expr, ExprTrait, SimpleExpr};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::grid::types::{KeyValue, Record, field};

/// Filter condition over record columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Column is NULL.
    IsNull(String),
    /// Column is not NULL.
    IsNotNull(String),
    /// Column equals a value.
    Equals(String, Value),
    /// Column is one of the values. An empty list matches nothing.
    In(String, Vec<Value>),
    /// All predicates hold.
    And(Vec<Predicate>),
    /// Any predicate holds.
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn is_null(column: impl Into<String>) -> Self {
        Self::IsNull(column.into())
    }

    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self::IsNotNull(column.into())
    }

    pub fn equals(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Equals(column.into(), value.into())
    }

    pub fn is_in(column: impl Into<String>, values: Vec<Value>) -> Self {
        Self::In(column.into(), values)
    }

    /// Evaluate against a record.
    ///
    /// Values compare loosely through [`KeyValue`]; `null` never equals
    /// anything, as in SQL.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::IsNull(column) => column_value(record, column).is_null(),
            Self::IsNotNull(column) => !column_value(record, column).is_null(),
            Self::Equals(column, value) => match KeyValue::of(column_value(record, column)) {
                Some(actual) => KeyValue::of(value).is_some_and(|expected| expected == actual),
                None => false,
            },
            Self::In(column, values) => match KeyValue::of(column_value(record, column)) {
                Some(actual) => values
                    .iter()
                    .filter_map(KeyValue::of)
                    .any(|candidate| candidate == actual),
                None => false,
            },
            Self::And(predicates) => predicates.iter().all(|p| p.matches(record)),
            Self::Or(predicates) => predicates.iter().any(|p| p.matches(record)),
        }
    }

    /// Lower to a SQL condition.
    pub fn to_condition(&self) -> SimpleExpr {
        match self {
            Self::IsNull(column) => column_expr(column).is_null(),
            Self::IsNotNull(column) => column_expr(column).is_not_null(),
            Self::Equals(column, value) => match sql_value(value) {
                Some(value) => column_expr(column).eq(value),
                None => Expr::cust("FALSE"),
            },
            Self::In(column, values) => {
                let values: Vec<sea_query::Value> = values.iter().filter_map(sql_value).collect();
                if values.is_empty() {
                    return Expr::cust("FALSE");
                }
                column_expr(column).is_in(values)
            }
            Self::And(predicates) => {
                if predicates.is_empty() {
                    return Expr::cust("TRUE");
                }
                predicates
                    .iter()
                    .fold(Cond::all(), |cond, p| cond.add(p.to_condition()))
                    .into()
            }
            Self::Or(predicates) => {
                if predicates.is_empty() {
                    return Expr::cust("FALSE");
                }
                predicates
                    .iter()
                    .fold(Cond::any(), |cond, p| cond.add(p.to_condition()))
                    .into()
            }
        }
    }
}

/// Column value for predicate evaluation.
///
/// Qualified references (`t.parent_id`) fall back to the bare column name
/// since records carry unqualified fields.
fn column_value<'a>(record: &'a Record, column: &str) -> &'a Value {
    let value = field(record, column);
    if value.is_null()
        && let Some((_, bare)) = column.rsplit_once('.')
    {
        return field(record, bare);
    }
    value
}

/// Build a column expression, splitting `table.column` references.
pub(crate) fn column_expr(column: &str) -> SimpleExpr {
    match column.split_once('.') {
        Some((table, name)) => Expr::col((Alias::new(table), Alias::new(name))).into(),
        None => Expr::col(Alias::new(column)).into(),
    }
}

/// Convert a JSON scalar to a SQL value. `null` has no SQL literal here.
fn sql_value(value: &Value) -> Option<sea_query::Value> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(sea_query::Value::from(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(sea_query::Value::from)
            .or_else(|| n.as_f64().map(sea_query::Value::from)),
        Value::String(s) => Some(sea_query::Value::from(s.clone())),
        other => Some(sea_query::Value::from(other.to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use sea_query::{PostgresQueryBuilder, Query};
    use serde_json::json;

    fn where_sql(predicate: &Predicate) -> String {
        Query::select()
            .column(Alias::new("id"))
            .from(Alias::new("node"))
            .and_where(predicate.to_condition())
            .to_string(PostgresQueryBuilder)
    }

    #[test]
    fn null_checks() {
        let record = json!({"id": 1, "parent_id": null});
        assert!(Predicate::is_null("parent_id").matches(&record));
        assert!(!Predicate::is_not_null("parent_id").matches(&record));
        assert!(Predicate::is_null("missing").matches(&record));
    }

    #[test]
    fn membership_is_loose() {
        let record = json!({"id": 2, "parent_id": "10"});
        assert!(Predicate::is_in("parent_id", vec![json!(10), json!(11)]).matches(&record));
        assert!(!Predicate::is_in("parent_id", vec![json!(12)]).matches(&record));
        assert!(!Predicate::is_in("parent_id", vec![]).matches(&record));
    }

    #[test]
    fn null_never_equals() {
        let record = json!({"id": 3, "parent_id": null});
        assert!(!Predicate::equals("parent_id", Value::Null).matches(&record));
        assert!(!Predicate::is_in("parent_id", vec![Value::Null]).matches(&record));
    }

    #[test]
    fn qualified_columns_match_bare_fields() {
        let record = json!({"id": 2, "parent_id": 1});
        assert!(Predicate::is_in("t.parent_id", vec![json!(1)]).matches(&record));
    }

    #[test]
    fn boolean_composition() {
        let record = json!({"id": 2, "parent_id": 1, "status": "active"});
        let both = Predicate::And(vec![
            Predicate::is_not_null("parent_id"),
            Predicate::equals("status", "active"),
        ]);
        let either = Predicate::Or(vec![
            Predicate::is_null("parent_id"),
            Predicate::equals("status", "archived"),
        ]);
        assert!(both.matches(&record));
        assert!(!either.matches(&record));
        assert!(Predicate::And(vec![]).matches(&record));
        assert!(!Predicate::Or(vec![]).matches(&record));
    }

    #[test]
    fn sql_is_null() {
        let sql = where_sql(&Predicate::is_null("parent_id"));
        assert!(sql.contains("\"parent_id\" IS NULL"), "{sql}");
    }

    #[test]
    fn sql_qualified_column() {
        let sql = where_sql(&Predicate::is_not_null("t.parent_id"));
        assert!(sql.contains("\"t\".\"parent_id\" IS NOT NULL"), "{sql}");
    }

    #[test]
    fn sql_in_list() {
        let sql = where_sql(&Predicate::And(vec![
            Predicate::is_not_null("parent_id"),
            Predicate::is_in("parent_id", vec![json!(1), json!(2)]),
        ]));
        assert!(sql.contains("IS NOT NULL"), "{sql}");
        assert!(sql.contains("\"parent_id\" IN (1, 2)"), "{sql}");
        assert!(sql.contains(" AND "), "{sql}");
    }

    #[test]
    fn sql_empty_in_is_false() {
        let sql = where_sql(&Predicate::is_in("parent_id", vec![]));
        assert!(sql.contains("FALSE"), "{sql}");
        assert!(!sql.contains(" IN "), "{sql}");
    }

    #[test]
    fn sql_string_values_are_quoted() {
        let sql = where_sql(&Predicate::equals("code", "a'b"));
        assert!(sql.contains("\"code\" = 'a''b'") || sql.contains("E'a\\'b'"), "{sql}");
    }
}

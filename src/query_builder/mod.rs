//! Statement construction for mutations and reads.
//!
//! Builders never interpolate caller values into SQL text. Each value becomes a numbered
//! `?N` placeholder and is carried alongside the SQL in [`Statement::params`]. The
//! [`Display`](std::fmt::Display) rendering inlines quoted literals so the statement's shape
//! can be logged and asserted on; that text is never sent to a database.

use std::borrow::Cow;
use std::fmt;

use crate::error::SqlProxyError;
use crate::model::FieldValue;
use crate::translation::{PlaceholderStyle, rewrite_placeholders, translate_placeholders};

mod dml;
mod select;

pub use dml::{build_insert, build_mutation, build_update};
pub(crate) use dml::validate_mutation;
pub use select::{build_query, build_select};

/// SQL text with numbered `?N` placeholders plus the values bound to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    sql: String,
    params: Vec<String>,
}

impl Statement {
    fn new(sql: String) -> Self {
        Self {
            sql,
            params: Vec::new(),
        }
    }

    /// Bind `value` and return the placeholder that refers to it.
    fn bind(&mut self, value: &str) -> String {
        self.params.push(value.to_owned());
        PlaceholderStyle::Sqlite.render(self.params.len())
    }

    /// Append ` WHERE name = ?N` when the condition is present and named.
    fn push_condition(&mut self, condition: Option<&FieldValue>) {
        if let Some(condition) = condition.filter(|c| !c.name.is_empty()) {
            let placeholder = self.bind(&condition.value);
            self.sql.push_str(" WHERE ");
            self.sql.push_str(&condition.name);
            self.sql.push_str(" = ");
            self.sql.push_str(&placeholder);
        }
    }

    /// SQL text in canonical `?N` placeholder form.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Values bound to the placeholders, in placeholder order.
    #[must_use]
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// SQL text with placeholders written the way `style` expects.
    #[must_use]
    pub fn sql_for(&self, style: PlaceholderStyle) -> Cow<'_, str> {
        translate_placeholders(&self.sql, style)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = rewrite_placeholders(&self.sql, |placeholder| {
            self.params
                .get(placeholder.index - 1)
                .map(|value| quote_literal(value))
        });
        f.write_str(&rendered)
    }
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn validate_table(table: &str) -> Result<(), SqlProxyError> {
    if table.trim().is_empty() {
        return Err(SqlProxyError::InvalidRequest(
            "table name must not be empty".into(),
        ));
    }
    Ok(())
}

fn validate_names<'a>(names: impl ExactSizeIterator<Item = &'a str>) -> Result<(), SqlProxyError> {
    if names.len() == 0 {
        return Err(SqlProxyError::InvalidRequest(
            "at least one field is required".into(),
        ));
    }
    for (position, name) in names.enumerate() {
        if name.trim().is_empty() {
            return Err(SqlProxyError::InvalidRequest(format!(
                "field {position} has an empty name"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Vec<FieldValue> {
        pairs.iter().map(|(n, v)| FieldValue::new(*n, *v)).collect()
    }

    #[test]
    fn insert_shape() {
        let stmt = build_insert("t", &fields(&[("a", "1"), ("b", "2")])).unwrap();
        assert_eq!(stmt.to_string(), "INSERT INTO t (a,b) VALUES ('1','2')");
        assert_eq!(stmt.sql(), "INSERT INTO t (a,b) VALUES (?1,?2)");
        assert_eq!(stmt.params(), ["1", "2"]);
    }

    #[test]
    fn update_with_condition() {
        let cond = FieldValue::new("id", "7");
        let stmt = build_update("t", &fields(&[("a", "1")]), Some(&cond)).unwrap();
        assert_eq!(stmt.to_string(), "UPDATE t SET a = '1' WHERE id = '7'");
        assert_eq!(stmt.sql_for(PlaceholderStyle::Postgres), "UPDATE t SET a = $1 WHERE id = $2");
    }

    #[test]
    fn update_without_condition_targets_every_row() {
        let stmt = build_update("t", &fields(&[("a", "1")]), None).unwrap();
        assert_eq!(stmt.to_string(), "UPDATE t SET a = '1'");
    }

    #[test]
    fn update_with_unnamed_condition_has_no_where() {
        let cond = FieldValue::new("", "7");
        let stmt = build_update("t", &fields(&[("a", "1"), ("b", "2")]), Some(&cond)).unwrap();
        assert_eq!(stmt.to_string(), "UPDATE t SET a = '1', b = '2'");
        assert_eq!(stmt.params(), ["1", "2"]);
    }

    #[test]
    fn select_shape() {
        let cond = FieldValue::new("id", "7");
        let stmt = build_select("t", &["a", "b"], Some(&cond)).unwrap();
        assert_eq!(stmt.to_string(), "SELECT a, b FROM t WHERE id = '7'");
        assert_eq!(stmt.sql(), "SELECT a, b FROM t WHERE id = ?1");
    }

    #[test]
    fn values_stay_out_of_the_sql_text() {
        let stmt = build_insert("people", &fields(&[("name", "O'Brien ?1")])).unwrap();
        assert_eq!(stmt.sql(), "INSERT INTO people (name) VALUES (?1)");
        assert_eq!(stmt.params(), ["O'Brien ?1"]);
        assert_eq!(
            stmt.to_string(),
            "INSERT INTO people (name) VALUES ('O''Brien ?1')"
        );
    }

    #[test]
    fn rejects_empty_inputs() {
        assert!(matches!(
            build_insert("t", &[]),
            Err(SqlProxyError::InvalidRequest(_))
        ));
        assert!(matches!(
            build_update("t", &[], None),
            Err(SqlProxyError::InvalidRequest(_))
        ));
        assert!(matches!(
            build_select::<&str>("t", &[], None),
            Err(SqlProxyError::InvalidRequest(_))
        ));
        assert!(matches!(
            build_insert(" ", &fields(&[("a", "1")])),
            Err(SqlProxyError::InvalidRequest(_))
        ));
        assert!(matches!(
            build_insert("t", &fields(&[("", "1")])),
            Err(SqlProxyError::InvalidRequest(_))
        ));
    }
}

//! Type definitions for sqlite MCP
//!
//! Result rows have no fixed schema, so a row is an ordered list of
//! column name / tagged value pairs rather than a struct.

use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

// ============================================================================
// Values
// ============================================================================

/// A single SQLite value of dynamic type
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(#[serde(serialize_with = "serialize_real")] f64),
    Text(String),
    Blob(Vec<u8>),
}

/// JSON has no infinity or NaN; those are rendered as text ("inf", "-inf", "NaN")
fn serialize_real<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.serialize_str(&value.to_string())
    }
}

impl SqlValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<ValueRef<'_>> for SqlValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => SqlValue::Null,
            ValueRef::Integer(i) => SqlValue::Integer(i),
            ValueRef::Real(f) => SqlValue::Real(f),
            ValueRef::Text(t) => SqlValue::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => SqlValue::Blob(b.to_vec()),
        }
    }
}

/// JSON arguments from the caller become bindable values
impl From<serde_json::Value> for SqlValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => SqlValue::Null,
            Value::Bool(b) => SqlValue::Integer(i64::from(b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => SqlValue::Integer(i),
                None => SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => SqlValue::Text(s),
            other => SqlValue::Text(other.to_string()),
        }
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let value = match self {
            SqlValue::Null => ValueRef::Null,
            SqlValue::Integer(i) => ValueRef::Integer(*i),
            SqlValue::Real(f) => ValueRef::Real(*f),
            SqlValue::Text(s) => ValueRef::Text(s.as_bytes()),
            SqlValue::Blob(b) => ValueRef::Blob(b),
        };
        Ok(ToSqlOutput::Borrowed(value))
    }
}

// ============================================================================
// Rows
// ============================================================================

/// One result row, columns kept in statement order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, SqlValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: impl Into<String>, value: SqlValue) {
        self.columns.push((column.into(), value));
    }

    /// Look up a value by column name
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Row reported for statements that yield no columns
    pub fn affected(rows: usize) -> Self {
        let mut row = Self::new();
        row.push("affected_rows", SqlValue::Integer(rows as i64));
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Rows returned by a statement, in store order
pub type ResultSet = Vec<Row>;

/// Named statement parameters, keyed with or without their `:`/`@`/`$` sigil
pub type NamedParams = BTreeMap<String, SqlValue>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_serializes_in_column_order() {
        let mut row = Row::new();
        row.push("zeta", SqlValue::Integer(1));
        row.push("alpha", SqlValue::Text("a".to_string()));
        row.push("gone", SqlValue::Null);

        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"zeta":1,"alpha":"a","gone":null}"#);
    }

    #[test]
    fn test_row_get() {
        let mut row = Row::new();
        row.push("id", SqlValue::Integer(7));
        assert_eq!(row.get("id").and_then(SqlValue::as_i64), Some(7));
        assert!(row.get("missing").is_none());
    }

    #[test]
    fn test_json_to_sql_value() {
        assert_eq!(SqlValue::from(json!(null)), SqlValue::Null);
        assert_eq!(SqlValue::from(json!(true)), SqlValue::Integer(1));
        assert_eq!(SqlValue::from(json!(42)), SqlValue::Integer(42));
        assert_eq!(SqlValue::from(json!(1.5)), SqlValue::Real(1.5));
        assert_eq!(SqlValue::from(json!("x")), SqlValue::Text("x".to_string()));
        assert_eq!(
            SqlValue::from(json!({"a": 1})),
            SqlValue::Text(r#"{"a":1}"#.to_string())
        );
    }

    #[test]
    fn test_non_finite_reals_serialize_as_text() {
        assert_eq!(serde_json::to_value(SqlValue::Real(1.5)).unwrap(), json!(1.5));
        assert_eq!(serde_json::to_value(SqlValue::Real(f64::INFINITY)).unwrap(), json!("inf"));
        assert_eq!(
            serde_json::to_value(SqlValue::Real(f64::NEG_INFINITY)).unwrap(),
            json!("-inf")
        );
        assert_eq!(serde_json::to_value(SqlValue::Real(f64::NAN)).unwrap(), json!("NaN"));
    }

    #[test]
    fn test_blob_serializes_as_bytes() {
        let json = serde_json::to_value(SqlValue::Blob(vec![0, 255])).unwrap();
        assert_eq!(json, json!([0, 255]));
    }
}

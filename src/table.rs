//! In-memory table model shared by the Daylio and Fitbit pipelines
//!
//! A [`NormalizedTable`] is what the normalizer, the tag expander and the
//! sleep classifier hand to the persistence sink: a name, the ordered column
//! declarations, and rows keyed by column name.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Storage format for timestamps; sub-second digits only appear when non-zero
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Semantic type of a declared column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[serde(alias = "str", alias = "string")]
    Text,
    #[serde(alias = "int")]
    Integer,
    #[serde(alias = "float")]
    Real,
    #[serde(alias = "datetime")]
    Timestamp,
    #[serde(alias = "bool")]
    Boolean,
}

impl ColumnType {
    /// SQLite column type used when the table is (re)created
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Integer | ColumnType::Boolean => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Timestamp => "TIMESTAMP",
        }
    }
}

/// One declared column of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "type", alias = "type_name")]
    pub column_type: ColumnType,
    #[serde(default, alias = "kind")]
    pub role: String,
}

impl ColumnSchema {
    pub fn new(name: &str, column_type: ColumnType, role: &str) -> Self {
        Self {
            name: name.to_string(),
            column_type,
            role: role.to_string(),
        }
    }

    pub fn is_identifier(&self) -> bool {
        self.role == "id"
    }
}

/// A single cell
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Boolean(bool),
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
    /// Array-valued source field; kept in memory, serialized as JSON text if persisted
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Boolean(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Untyped conversion for fields that no column declares
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => n.as_f64().map(Value::Real).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::Text(s.clone()),
            serde_json::Value::Array(items) => Value::List(items.iter().map(Value::from_json).collect()),
            serde_json::Value::Object(_) => Value::Text(value.to_string()),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Real(f) => serde_json::Value::from(*f),
            Value::Text(s) => serde_json::Value::from(s.as_str()),
            Value::Boolean(b) => serde_json::Value::from(*b),
            Value::Timestamp(ts) => serde_json::Value::from(ts.format(TIMESTAMP_FORMAT).to_string()),
            Value::Date(d) => serde_json::Value::from(d.format(DATE_FORMAT).to_string()),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Timestamp(ts) => write!(f, "{}", ts.format(TIMESTAMP_FORMAT)),
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Value::List(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<Option<i64>> for Value {
    fn from(value: Option<i64>) -> Self {
        value.map(Value::Integer).unwrap_or(Value::Null)
    }
}

impl From<Option<NaiveDate>> for Value {
    fn from(value: Option<NaiveDate>) -> Self {
        value.map(Value::Date).unwrap_or(Value::Null)
    }
}

pub type Row = BTreeMap<String, Value>;

/// A named, ordered collection of rows conforming to a column list
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    pub name: String,
    pub columns: Vec<ColumnSchema>,
    pub rows: Vec<Row>,
}

impl NormalizedTable {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnSchema>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Declared column names in persistence order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Name of the identifier column: the one with role `id`, else `id`
    pub fn id_column(&self) -> &str {
        self.columns
            .iter()
            .find(|c| c.is_identifier())
            .map(|c| c.name.as_str())
            .unwrap_or("id")
    }
}

/// Human-readable identity of a row for diagnostics
pub(crate) fn row_identity(id_column: &str, row: Option<&Row>, index: usize) -> String {
    match row.and_then(|r| r.get(id_column)) {
        Some(value) if !value.is_null() => format!("{}={}", id_column, value),
        _ => format!("row #{}", index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_type_aliases() {
        let cols: Vec<ColumnSchema> = serde_json::from_str(
            r#"[
                {"name": "id", "type": "int", "role": "id"},
                {"name": "note", "type": "str"},
                {"name": "createdAt", "type": "timestamp", "role": "timestamp"},
                {"name": "done", "type": "bool"}
            ]"#,
        )
        .unwrap();

        assert_eq!(cols[0].column_type, ColumnType::Integer);
        assert!(cols[0].is_identifier());
        assert_eq!(cols[1].column_type, ColumnType::Text);
        assert_eq!(cols[1].role, "");
        assert_eq!(cols[2].column_type, ColumnType::Timestamp);
        assert_eq!(cols[3].column_type.sql_type(), "INTEGER");
    }

    #[test]
    fn test_value_from_json_keeps_arrays() {
        let v = Value::from_json(&serde_json::json!([1, 2, "x"]));
        assert_eq!(
            v,
            Value::List(vec![Value::Integer(1), Value::Integer(2), Value::Text("x".into())])
        );
    }

    #[test]
    fn test_timestamp_display_drops_zero_fraction() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(7, 5, 0).unwrap();
        assert_eq!(Value::Timestamp(ts).to_string(), "2024-03-01 07:05:00");

        let ts = ts + chrono::Duration::milliseconds(250);
        assert_eq!(Value::Timestamp(ts).to_string(), "2024-03-01 07:05:00.250");
    }

    #[test]
    fn test_row_identity_falls_back_to_index() {
        let mut table = NormalizedTable::new("tags", vec![ColumnSchema::new("id", ColumnType::Integer, "id")]);
        table.rows.push(Row::from([("id".to_string(), Value::Integer(42))]));
        table.rows.push(Row::from([("id".to_string(), Value::Null)]));

        let identity = |i: usize| row_identity(table.id_column(), table.rows.get(i), i);
        assert_eq!(identity(0), "id=42");
        assert_eq!(identity(1), "row #1");
        assert_eq!(identity(7), "row #7");
    }
}

//! Table normalizer
//!
//! Turns the raw JSON records of one Daylio table into a [`NormalizedTable`]:
//!
//! 1. every declared column is coerced to its declared type
//! 2. timestamp columns go from epoch milliseconds to points in time, with the
//!    "unset" sentinels (`0`, and `-1` for goals) becoming null
//! 3. creation/end timestamps get a companion calendar-date column
//! 4. the table's enrichment strategy runs (mood groups get `mood_value` and
//!    the neutral labels)
//!
//! Undeclared source fields are carried along untyped so later steps (tag
//! expansion) can still see them; only declared columns are ever persisted.

use crate::error::{Error, Result};
use crate::table::{ColumnSchema, ColumnType, NormalizedTable, Row, Value};
use chrono::{DateTime, NaiveDateTime};
use serde_json::Value as Json;
use tracing::{debug, info, warn};

pub const GOALS_TABLE: &str = "goals";
pub const MOOD_GROUPS_TABLE: &str = "mood_groups";
pub const CUSTOM_MOODS_TABLE: &str = "customMoods";

/// `mood_value = MOOD_VALUE_BASE - mood_group_id`, so group 1 scores 5
pub const MOOD_VALUE_BASE: i64 = 6;

/// Companion date column for a timestamp column, by naming convention
pub fn derived_date_column(timestamp_column: &str) -> Option<&'static str> {
    match timestamp_column {
        "createdAt" | "datetime" | "created_at" => Some("date"),
        "end_date" => Some("date_end"),
        _ => None,
    }
}

/// Label carried by the order-0 mood of the middle groups
pub fn neutral_label(mood_group_id: i64) -> Option<&'static str> {
    match mood_group_id {
        2 => Some("Good"),
        3 => Some("Meh"),
        4 => Some("Bad"),
        _ => None,
    }
}

/// Epoch values meaning "no date" for a table
fn unset_sentinels(table_name: &str) -> &'static [i64] {
    if table_name == GOALS_TABLE {
        &[0, -1]
    } else {
        &[0]
    }
}

/// Table-specific enrichment, selected by table identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enrichment {
    MoodGroup,
    Default,
}

impl Enrichment {
    pub fn for_table(table_name: &str) -> Self {
        match table_name {
            MOOD_GROUPS_TABLE | CUSTOM_MOODS_TABLE => Enrichment::MoodGroup,
            _ => Enrichment::Default,
        }
    }

    fn apply(self, table: &mut NormalizedTable) {
        match self {
            Enrichment::MoodGroup => enrich_mood_groups(table),
            Enrichment::Default => {}
        }
    }
}

/// Normalize the raw records of `table_name` against its declared columns
pub fn normalize(table_name: &str, rows: &[Json], schema: &[ColumnSchema]) -> Result<NormalizedTable> {
    info!(table = table_name, rows = rows.len(), "normalizing table");

    let mut table = NormalizedTable::new(table_name, schema.to_vec());
    let id_column = table.id_column().to_string();
    let sentinels = unset_sentinels(table_name);

    for (index, raw) in rows.iter().enumerate() {
        let record = raw
            .as_object()
            .ok_or_else(|| Error::mismatch(format!("object records in '{}'", table_name), raw.to_string()))?;

        let mut row = Row::new();
        for (key, value) in record {
            if !table.has_column(key) {
                row.insert(key.clone(), Value::from_json(value));
            }
        }

        for col in schema {
            let source = record.get(&col.name).unwrap_or(&Json::Null);
            let value = coerce(col.column_type, source, sentinels).map_err(|reason| {
                let identity = record_identity(&id_column, record, index);
                warn!(table = table_name, row = %identity, column = %col.name, "malformed value");
                Error::malformed(table_name, identity, &col.name, reason)
            })?;
            row.insert(col.name.clone(), value);
        }

        table.rows.push(row);
    }

    derive_dates(&mut table);
    Enrichment::for_table(table_name).apply(&mut table);

    Ok(table)
}

fn record_identity(id_column: &str, record: &serde_json::Map<String, Json>, index: usize) -> String {
    match record.get(id_column) {
        Some(id) if !id.is_null() => format!("{}={}", id_column, id),
        _ => format!("row #{}", index),
    }
}

fn derive_dates(table: &mut NormalizedTable) {
    let timestamp_columns: Vec<String> = table
        .columns
        .iter()
        .filter(|c| c.column_type == ColumnType::Timestamp)
        .map(|c| c.name.clone())
        .collect();

    for source in timestamp_columns {
        let Some(target) = derived_date_column(&source) else {
            continue;
        };
        debug!(table = %table.name, source = %source, target, "deriving date column");
        for row in &mut table.rows {
            let date = row.get(&source).and_then(Value::as_timestamp).map(|ts| ts.date());
            row.insert(target.to_string(), Value::from(date));
        }
    }
}

fn enrich_mood_groups(table: &mut NormalizedTable) {
    if !table.has_column("mood_group_id") {
        warn!(table = %table.name, column = "mood_group_id", "column not in schema, skipping mood enrichment");
        return;
    }
    let has_order = table.has_column("mood_group_order");
    if !has_order {
        warn!(table = %table.name, column = "mood_group_order", "column not in schema, skipping mood labels");
    }

    // reference rows carry only the neutral labels; user moods keep their names
    let reference = table.name == MOOD_GROUPS_TABLE;

    for row in &mut table.rows {
        let group = row.get("mood_group_id").and_then(Value::as_i64);
        row.insert("mood_value".to_string(), Value::from(group.map(|g| MOOD_VALUE_BASE - g)));

        let order = if has_order {
            row.get("mood_group_order").and_then(Value::as_i64)
        } else {
            None
        };
        match (order, group.and_then(neutral_label)) {
            (Some(0), Some(label)) => {
                row.insert("custom_name".to_string(), Value::Text(label.to_string()));
            }
            _ if reference => {
                row.insert("custom_name".to_string(), Value::Null);
            }
            _ => {
                row.entry("custom_name".to_string()).or_insert(Value::Null);
            }
        }
    }
}

/// Coerce one JSON value to a declared column type
fn coerce(column_type: ColumnType, value: &Json, unset: &[i64]) -> std::result::Result<Value, String> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    match column_type {
        ColumnType::Text => Ok(match value {
            Json::String(s) => Value::Text(s.clone()),
            other => Value::Text(other.to_string()),
        }),
        ColumnType::Integer => integer(value).map(Value::Integer),
        ColumnType::Real => match value {
            Json::Number(n) => n.as_f64().map(Value::Real).ok_or_else(|| format!("not a number: {}", n)),
            Json::String(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Real)
                .map_err(|_| format!("not a number: {:?}", s)),
            other => Err(format!("expected a number, got {}", other)),
        },
        ColumnType::Boolean => match value {
            Json::Bool(b) => Ok(Value::Boolean(*b)),
            Json::Number(n) if n.as_i64() == Some(0) => Ok(Value::Boolean(false)),
            Json::Number(n) if n.as_i64() == Some(1) => Ok(Value::Boolean(true)),
            Json::String(s) if s.eq_ignore_ascii_case("true") => Ok(Value::Boolean(true)),
            Json::String(s) if s.eq_ignore_ascii_case("false") => Ok(Value::Boolean(false)),
            other => Err(format!("expected a boolean, got {}", other)),
        },
        ColumnType::Timestamp => {
            let millis = integer(value)?;
            if unset.contains(&millis) {
                return Ok(Value::Null);
            }
            epoch_millis(millis)
                .map(Value::Timestamp)
                .ok_or_else(|| format!("epoch milliseconds out of range: {}", millis))
        }
    }
}

fn integer(value: &Json) -> std::result::Result<i64, String> {
    match value {
        Json::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Ok(i),
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
            _ => Err(format!("not an integer: {}", n)),
        },
        Json::Bool(b) => Ok(i64::from(*b)),
        Json::String(s) => s.trim().parse::<i64>().map_err(|_| format!("not an integer: {:?}", s)),
        other => Err(format!("expected an integer, got {}", other)),
    }
}

/// Epoch milliseconds to a naive UTC point in time
pub fn epoch_millis(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn col(name: &str, column_type: ColumnType, role: &str) -> ColumnSchema {
        ColumnSchema::new(name, column_type, role)
    }

    fn entries_schema() -> Vec<ColumnSchema> {
        vec![
            col("id", ColumnType::Integer, "id"),
            col("datetime", ColumnType::Timestamp, "timestamp"),
            col("mood", ColumnType::Integer, "category"),
            col("note", ColumnType::Text, ""),
        ]
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ==========================================================================
    // TIMESTAMP FIXING
    // ==========================================================================
    //
    // Daylio stores points in time as epoch milliseconds and uses 0 for
    // "unset". Goals also use -1 for "no end date".
    // ==========================================================================

    #[test]
    fn test_epoch_millis_become_timestamps_with_date() {
        // 2024-01-15 22:30:00 UTC
        let rows = vec![json!({"id": 1, "datetime": 1_705_357_800_000_i64, "mood": 2, "note": "ok"})];
        let table = normalize("dayEntries", &rows, &entries_schema()).unwrap();

        let row = &table.rows[0];
        assert_eq!(
            row["datetime"],
            Value::Timestamp(date(2024, 1, 15).and_hms_opt(22, 30, 0).unwrap())
        );
        assert_eq!(row["date"], Value::Date(date(2024, 1, 15)));
    }

    #[test]
    fn test_zero_timestamp_is_null_not_epoch() {
        let rows = vec![json!({"id": 1, "datetime": 0, "mood": 2})];
        let table = normalize("dayEntries", &rows, &entries_schema()).unwrap();

        assert_eq!(table.rows[0]["datetime"], Value::Null);
        assert_eq!(table.rows[0]["date"], Value::Null);
    }

    #[test]
    fn test_goals_minus_one_is_unset() {
        let schema = vec![
            col("goal_id", ColumnType::Integer, "id"),
            col("created_at", ColumnType::Timestamp, "timestamp"),
            col("end_date", ColumnType::Timestamp, "timestamp"),
        ];
        let rows = vec![json!({"goal_id": 9, "created_at": 1_700_000_000_000_i64, "end_date": -1})];
        let table = normalize(GOALS_TABLE, &rows, &schema).unwrap();

        assert_eq!(table.rows[0]["end_date"], Value::Null);
        assert_eq!(table.rows[0]["date_end"], Value::Null);
        assert_eq!(table.rows[0]["date"], Value::Date(date(2023, 11, 14)));
    }

    #[test]
    fn test_minus_one_is_a_real_instant_outside_goals() {
        let schema = vec![col("end_date", ColumnType::Timestamp, "timestamp")];
        let rows = vec![json!({"end_date": -1})];
        let table = normalize("reminders", &rows, &schema).unwrap();

        assert_eq!(table.rows[0]["date_end"], Value::Date(date(1969, 12, 31)));
    }

    #[test]
    fn test_unrecognized_timestamp_name_derives_nothing() {
        let schema = vec![col("last_edited", ColumnType::Timestamp, "timestamp")];
        let rows = vec![json!({"last_edited": 1_700_000_000_000_i64})];
        let table = normalize("tags", &rows, &schema).unwrap();

        assert!(table.rows[0]["last_edited"].as_timestamp().is_some());
        assert!(!table.rows[0].contains_key("date"));
        assert!(!table.rows[0].contains_key("date_end"));
    }

    #[test]
    fn test_unparseable_timestamp_names_row() {
        let rows = vec![
            json!({"id": 1, "datetime": 1_700_000_000_000_i64}),
            json!({"id": 2, "datetime": "yesterday"}),
        ];
        let err = normalize("dayEntries", &rows, &entries_schema()).unwrap_err();

        match err {
            Error::MalformedValue { table, row, column, .. } => {
                assert_eq!(table, "dayEntries");
                assert_eq!(row, "id=2");
                assert_eq!(column, "datetime");
            }
            other => panic!("expected MalformedValue, got {:?}", other),
        }
    }

    #[test]
    fn test_numeric_string_timestamp_accepted() {
        let rows = vec![json!({"id": 1, "datetime": "1700000000000"})];
        let table = normalize("dayEntries", &rows, &entries_schema()).unwrap();
        assert_eq!(table.rows[0]["date"], Value::Date(date(2023, 11, 14)));
    }

    // ==========================================================================
    // COLUMN SHAPE
    // ==========================================================================

    #[test]
    fn test_missing_fields_become_null_and_extras_are_kept() {
        let rows = vec![json!({"id": 3, "tags": [4, 5], "mood": 1})];
        let table = normalize("dayEntries", &rows, &entries_schema()).unwrap();
        let row = &table.rows[0];

        for name in table.column_names() {
            assert!(row.contains_key(name), "declared column {} missing", name);
        }
        assert_eq!(row["note"], Value::Null);
        assert_eq!(row["tags"], Value::List(vec![Value::Integer(4), Value::Integer(5)]));
    }

    #[test]
    fn test_non_object_record_is_mismatch() {
        let rows = vec![json!([1, 2, 3])];
        assert!(matches!(
            normalize("dayEntries", &rows, &entries_schema()),
            Err(Error::ConfigurationMismatch { .. })
        ));
    }

    #[test]
    fn test_boolean_and_real_coercion() {
        let schema = vec![col("done", ColumnType::Boolean, ""), col("ratio", ColumnType::Real, "")];
        let rows = vec![json!({"done": 1, "ratio": "0.5"}), json!({"done": false, "ratio": 2})];
        let table = normalize("goal_entries", &rows, &schema).unwrap();

        assert_eq!(table.rows[0]["done"], Value::Boolean(true));
        assert_eq!(table.rows[0]["ratio"], Value::Real(0.5));
        assert_eq!(table.rows[1]["done"], Value::Boolean(false));
        assert_eq!(table.rows[1]["ratio"], Value::Real(2.0));
    }

    // ==========================================================================
    // MOOD GROUP ENRICHMENT
    // ==========================================================================
    //
    // Five groups, 1 (rad) through 5 (awful). mood_value inverts the id so
    // better moods score higher; the order-0 mood of groups 2-4 is the
    // neutral representative and gets a readable label.
    // ==========================================================================

    fn mood_schema() -> Vec<ColumnSchema> {
        vec![
            col("id", ColumnType::Integer, "id"),
            col("mood_group_id", ColumnType::Integer, "category"),
            col("mood_group_order", ColumnType::Integer, ""),
        ]
    }

    #[test]
    fn test_mood_value_and_labels() {
        let rows: Vec<Json> = (1..=5)
            .map(|g| json!({"id": g, "mood_group_id": g, "mood_group_order": 0}))
            .chain(std::iter::once(json!({"id": 6, "mood_group_id": 3, "mood_group_order": 1})))
            .collect();
        let table = normalize(MOOD_GROUPS_TABLE, &rows, &mood_schema()).unwrap();

        let values: Vec<_> = table.rows.iter().map(|r| r["mood_value"].clone()).collect();
        assert_eq!(
            values,
            vec![5, 4, 3, 2, 1, 3].into_iter().map(Value::Integer).collect::<Vec<_>>()
        );

        let labels: Vec<_> = table.rows.iter().map(|r| r["custom_name"].to_string()).collect();
        assert_eq!(labels, vec!["", "Good", "Meh", "Bad", "", ""]);
    }

    #[test]
    fn test_reference_groups_drop_other_names() {
        let rows: Vec<Json> = [(1, "Rad"), (2, ""), (5, "Awful")]
            .into_iter()
            .map(|(g, name)| json!({"id": g, "mood_group_id": g, "mood_group_order": 0, "custom_name": name}))
            .collect();
        let table = normalize(MOOD_GROUPS_TABLE, &rows, &mood_schema()).unwrap();

        let labels: Vec<_> = table.rows.iter().map(|r| r["custom_name"].clone()).collect();
        assert_eq!(labels, vec![Value::Null, Value::Text("Good".into()), Value::Null]);
    }

    #[test]
    fn test_custom_moods_keep_user_names() {
        let rows = vec![
            json!({"id": 10, "mood_group_id": 2, "mood_group_order": 0, "custom_name": ""}),
            json!({"id": 11, "mood_group_id": 2, "mood_group_order": 1, "custom_name": "chill"}),
        ];
        let table = normalize(CUSTOM_MOODS_TABLE, &rows, &mood_schema()).unwrap();

        assert_eq!(table.rows[0]["custom_name"], Value::Text("Good".into()));
        assert_eq!(table.rows[1]["custom_name"], Value::Text("chill".into()));
    }

    #[test]
    fn test_mood_enrichment_skipped_without_group_column() {
        let schema = vec![col("id", ColumnType::Integer, "id")];
        let rows = vec![json!({"id": 1, "mood_group_id": 2})];
        let table = normalize(MOOD_GROUPS_TABLE, &rows, &schema).unwrap();

        assert!(!table.rows[0].contains_key("mood_value"));
    }

    #[test]
    fn test_enrichment_dispatch() {
        assert_eq!(Enrichment::for_table("mood_groups"), Enrichment::MoodGroup);
        assert_eq!(Enrichment::for_table("customMoods"), Enrichment::MoodGroup);
        assert_eq!(Enrichment::for_table("dayEntries"), Enrichment::Default);
    }
}

//! Tag expansion: `dayEntries.tags` → `entry_tags`
//!
//! Every entry contributes at least one row. Entries without tags get a single
//! row with tag `0`, so the join table can be outer-joined back to entries
//! without losing any.

use crate::error::{Error, Result};
use crate::table::{row_identity, ColumnSchema, NormalizedTable, Row, Value};
use tracing::{debug, info};

pub const ENTRIES_TABLE: &str = "dayEntries";
pub const ENTRY_TAGS_TABLE: &str = "entry_tags";
pub const TAGS_FIELD: &str = "tags";

/// Tag value for entries that carry no tags
pub const NO_TAG: i64 = 0;

/// Explode the tag array of each entry into `(entry_id, tag)` rows
pub fn expand_tags(entries: &NormalizedTable, schema: &[ColumnSchema]) -> Result<NormalizedTable> {
    if entries.name != ENTRIES_TABLE {
        return Err(Error::mismatch(format!("'{}' table", ENTRIES_TABLE), format!("'{}'", entries.name)));
    }
    if !entries.is_empty() && !entries.rows.iter().any(|r| r.contains_key(TAGS_FIELD)) {
        return Err(Error::mismatch(
            format!("a '{}' array column", TAGS_FIELD),
            format!("'{}' without one", entries.name),
        ));
    }
    info!(entries = entries.len(), "creating {} from {}", ENTRY_TAGS_TABLE, ENTRIES_TABLE);

    let id_column = entries.id_column();
    let mut edges = NormalizedTable::new(ENTRY_TAGS_TABLE, schema.to_vec());

    for (index, entry) in entries.rows.iter().enumerate() {
        let entry_id = entry.get(id_column).cloned().unwrap_or(Value::Null);
        if entry_id.is_null() {
            return Err(Error::malformed(
                ENTRIES_TABLE,
                row_identity(id_column, Some(entry), index),
                id_column,
                "entry has no identifier",
            ));
        }

        let tags: Vec<i64> = match entry.get(TAGS_FIELD) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::List(items)) => items
                .iter()
                .map(|item| {
                    tag_id(item).ok_or_else(|| {
                        Error::malformed(
                            ENTRIES_TABLE,
                            row_identity(id_column, Some(entry), index),
                            TAGS_FIELD,
                            format!("tag is not an integer id: {}", item),
                        )
                    })
                })
                .collect::<Result<_>>()?,
            Some(other) => {
                return Err(Error::malformed(
                    ENTRIES_TABLE,
                    row_identity(id_column, Some(entry), index),
                    TAGS_FIELD,
                    format!("expected a tag list, got {}", other),
                ))
            }
        };

        if tags.is_empty() {
            edges.rows.push(edge(&entry_id, NO_TAG));
        } else {
            edges.rows.extend(tags.into_iter().map(|tag| edge(&entry_id, tag)));
        }
    }

    debug!(edges = edges.len(), "expanded entry tags");
    Ok(edges)
}

fn edge(entry_id: &Value, tag: i64) -> Row {
    Row::from([
        ("entry_id".to_string(), entry_id.clone()),
        ("tag".to_string(), Value::Integer(tag)),
    ])
}

fn tag_id(value: &Value) -> Option<i64> {
    match value {
        Value::Null => Some(NO_TAG),
        Value::Integer(i) => Some(*i),
        Value::Real(f) if f.fract() == 0.0 => Some(*f as i64),
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

//! Run orchestration
//!
//! Reads the inputs named by the configuration, pushes each table through
//! the normalizer (or the sleep classifier) and hands the result to the
//! database. A failing table is logged and recorded; the remaining tables
//! still load.

use crate::config::DashboardConfig;
use crate::daylio::normalize::MOOD_GROUPS_TABLE;
use crate::daylio::tags::{ENTRIES_TABLE, ENTRY_TAGS_TABLE};
use crate::daylio::{expand_tags, normalize, SchemaRegistry};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::fitbit::sleep::{self, SleepSession};
use crate::table::NormalizedTable;
use serde_json::{Map, Value as Json};
use std::path::Path;
use tracing::{error, info, warn};

/// What happened to one table during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Written(usize),
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub tables: Vec<(String, Outcome)>,
}

impl LoadReport {
    fn record(&mut self, table: &str, outcome: Outcome) {
        self.tables.push((table.to_string(), outcome));
    }

    pub fn failures(&self) -> usize {
        self.tables
            .iter()
            .filter(|(_, o)| matches!(o, Outcome::Failed(_)))
            .count()
    }

    pub fn outcome(&self, table: &str) -> Option<&Outcome> {
        self.tables.iter().find(|(name, _)| name == table).map(|(_, o)| o)
    }
}

/// Decoded Daylio backup: a JSON object mapping table name → records
pub fn read_export<P: AsRef<Path>>(path: P) -> Result<Map<String, Json>> {
    let path = path.as_ref();
    info!(path = %path.display(), "reading Daylio export");
    match serde_json::from_str::<Json>(&std::fs::read_to_string(path)?)? {
        Json::Object(tables) => Ok(tables),
        other => Err(Error::mismatch("an object of tables", json_kind(&other))),
    }
}

/// A JSON file holding an array of records
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<Json>> {
    match serde_json::from_str::<Json>(&std::fs::read_to_string(path)?)? {
        Json::Array(rows) => Ok(rows),
        other => Err(Error::mismatch("an array of records", json_kind(&other))),
    }
}

fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}

fn export_rows<'a>(export: &'a Map<String, Json>, table: &str) -> Result<&'a [Json]> {
    let value = export
        .get(table)
        .ok_or_else(|| Error::mismatch(format!("table '{}' in export", table), "no such table"))?;
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| Error::mismatch(format!("records for '{}'", table), json_kind(value)))
}

fn write(db: &Database, table: &NormalizedTable) -> Result<usize> {
    Ok(db.write_table(table)?)
}

fn settle(report: &mut LoadReport, table: &str, result: Result<usize>) {
    match result {
        Ok(rows) => report.record(table, Outcome::Written(rows)),
        Err(e) => {
            error!(table, error = %e, "table failed");
            report.record(table, Outcome::Failed(e.to_string()));
        }
    }
}

/// Normalize and write the configured Daylio tables, `entry_tags` and `mood_groups`
///
/// `on_step` is called with each table name once that table is settled.
pub fn load_daylio(db: &Database, config: &DashboardConfig, mut on_step: impl FnMut(&str)) -> Result<LoadReport> {
    let registry = SchemaRegistry::from_path(config.table_info_path())?;
    let export = read_export(config.daylio_json_path())?;
    let mut report = LoadReport::default();
    let mut entries: Option<NormalizedTable> = None;

    for name in &config.tables {
        let result = registry
            .columns(name)
            .and_then(|columns| normalize(name, export_rows(&export, name)?, columns))
            .and_then(|table| {
                let rows = write(db, &table)?;
                if table.name == ENTRIES_TABLE {
                    entries = Some(table);
                }
                Ok(rows)
            });
        settle(&mut report, name, result);
        on_step(name);
    }

    match &entries {
        Some(entries) => {
            let result = registry
                .columns(ENTRY_TAGS_TABLE)
                .and_then(|columns| expand_tags(entries, columns))
                .and_then(|edges| write(db, &edges));
            settle(&mut report, ENTRY_TAGS_TABLE, result);
        }
        None => {
            warn!("{} not loaded, skipping {}", ENTRIES_TABLE, ENTRY_TAGS_TABLE);
            report.record(ENTRY_TAGS_TABLE, Outcome::Skipped(format!("{} not loaded", ENTRIES_TABLE)));
        }
    }
    on_step(ENTRY_TAGS_TABLE);

    info!("creating {} from reference data", MOOD_GROUPS_TABLE);
    let result = registry.columns(MOOD_GROUPS_TABLE).and_then(|columns| {
        let rows = read_records(config.mood_groups_path())?;
        write(db, &normalize(MOOD_GROUPS_TABLE, &rows, columns)?)
    });
    settle(&mut report, MOOD_GROUPS_TABLE, result);
    on_step(MOOD_GROUPS_TABLE);

    Ok(report)
}

/// Result of the sleep pipeline
#[derive(Debug)]
pub enum SleepLoad {
    Written(Vec<SleepSession>),
    /// Upstream returned nothing; the stored table was left untouched
    Empty,
}

/// Classify the saved Fitbit feed and replace `fitbit_sleep`
pub fn load_sleep(db: &Database, config: &DashboardConfig) -> Result<SleepLoad> {
    let raw = sleep::load_feed(config.sleep_json_path())?;
    let sessions = match sleep::classify_all(&raw) {
        Ok(sessions) => sessions,
        Err(Error::UpstreamEmpty(what)) => {
            warn!("no {} in feed, keeping previous {} table", what, sleep::SLEEP_TABLE);
            return Ok(SleepLoad::Empty);
        }
        Err(e) => return Err(e),
    };
    write(db, &sleep::sessions_table(&sessions))?;
    Ok(SleepLoad::Written(sessions))
}

/// Number of steps `load_daylio` reports through its callback
pub fn daylio_steps(config: &DashboardConfig) -> usize {
    config.tables.len() + 2
}

//! Mood Dashboard - Daylio and Fitbit data into SQLite
//!
//! Turns a decoded Daylio backup and a saved Fitbit sleep feed into typed
//! SQLite tables that a dashboard can query.
//!
//! # Overview
//!
//! Daylio exports are loosely typed: epoch-millisecond timestamps, sentinel
//! zeros standing in for "unset", tag lists packed into a single field. A
//! schema registry (`table_info.json`) declares the type of every column, and
//! each table is coerced against it before being written.
//!
//! # Pipeline
//!
//! 1. **Normalize**: coerce declared columns, derive `date` columns from
//!    timestamps, add mood values and labels to the mood tables.
//!
//! 2. **Expand tags**: one `entry_tags` row per (entry, tag); entries without
//!    tags get a single row with tag `0`.
//!
//! 3. **Classify sleep**: each Fitbit sleep log becomes a nap or a full
//!    night with duration fields and per-stage summaries.
//!
//! 4. **Persist**: every table is replaced wholesale in one transaction.
//!
//! # Quick Start
//!
//! ```no_run
//! use mood_dashboard::{pipeline, Database, DashboardConfig};
//!
//! let config = DashboardConfig::load(None)?;
//! let db = Database::open_at(&config.db_path)?;
//!
//! let report = pipeline::load_daylio(&db, &config, |table| println!("done: {}", table))?;
//! println!("{} table(s) failed", report.failures());
//! # Ok::<(), mood_dashboard::Error>(())
//! ```
//!
//! # Modules
//!
//! - [`daylio`]: schema registry, normalizer and tag expander
//! - [`fitbit`]: sleep session classifier
//! - [`db`]: SQLite persistence, view reads and SQL scripts
//! - [`pipeline`]: end-to-end runs over the configured inputs
//! - [`report`]: sleep report output (JSON, CSV)
//! - [`serve`]: read-only dashboard API

pub mod config;
pub mod daylio;
pub mod db;
pub mod error;
pub mod fitbit;
pub mod pipeline;
pub mod report;
pub mod schema;
pub mod serve;
pub mod table;

pub use config::DashboardConfig;
pub use daylio::{expand_tags, normalize, SchemaRegistry};
pub use db::{Database, DbError, SleepNight, StoredObject, ViewData};
pub use error::{Error, Result};
pub use fitbit::{classify_all, classify_and_enrich, nap_or_full, RawSleepSession, SleepSession, SleepType};
pub use table::{ColumnSchema, ColumnType, NormalizedTable, Row, Value};

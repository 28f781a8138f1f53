//! Sleep report generation
//!
//! Writes classified sleep sessions to disk, picking the format from the
//! file extension:
//!
//! - **JSON**: summary plus every session
//! - **CSV**: one row per session, same columns as the `fitbit_sleep` table
//!
//! ```ignore
//! use mood_dashboard::report;
//!
//! report::generate("sleep.csv", &sessions)?;
//! report::generate("sleep.json", &sessions)?;
//! ```

pub mod csv;
pub mod json;

use crate::fitbit::{SleepSession, SleepType};
use serde::Serialize;
use std::io;
use std::path::Path;

/// Generate a report in the appropriate format based on file extension
pub fn generate<P: AsRef<Path>>(path: P, sessions: &[SleepSession]) -> io::Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::File::create(path)?;

    match ext.as_str() {
        "json" => json::write(&mut file, sessions),
        _ => csv::write(&mut file, sessions),
    }
}

/// Summary statistics for a batch of sessions
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub total: usize,
    pub full: usize,
    pub naps: usize,
    pub avg_full_minutes_asleep: Option<f64>,
}

impl Summary {
    pub fn from_sessions(sessions: &[SleepSession]) -> Self {
        let mut summary = Self {
            total: sessions.len(),
            ..Self::default()
        };
        let mut full_minutes = 0i64;

        for s in sessions {
            match s.sleep_type {
                SleepType::Full => {
                    summary.full += 1;
                    full_minutes += s.minutes_asleep;
                }
                SleepType::Nap => summary.naps += 1,
            }
        }

        if summary.full > 0 {
            summary.avg_full_minutes_asleep = Some(full_minutes as f64 / summary.full as f64);
        }
        summary
    }
}

//! Sleep session classification and enrichment
//!
//! Each raw Fitbit sleep log becomes a [`SleepSession`] with duration fields,
//! a nap/full classification and the date the session is credited to.
//!
//! # Nap or full sleep
//!
//! Classification works on the duration rounded to whole hours and on the
//! start/end timestamps, with a 3 hour nap threshold. The rules are checked in
//! order and the first that holds decides:
//!
//! | # | Condition | Result |
//! |---|-----------|--------|
//! | 1 | starts between 08:00 and 18:59, ≤ 3h | nap |
//! | 2 | same calendar day, ≤ 3h | nap |
//! | 3 | same calendar day, > 3h | full |
//! | 4 | crosses midnight, > 3h | full |
//! | 5 | crosses midnight, ≤ 3h | nap |
//! | 6 | otherwise | full |
//!
//! # Attribution date
//!
//! The session is credited to Fitbit's own `dateOfSleep`, which already
//! accounts for sessions that cross midnight.

use crate::error::{Error, Result};
use crate::table::{ColumnSchema, ColumnType, NormalizedTable, Row, Value, DATE_FORMAT};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

pub const SLEEP_TABLE: &str = "fitbit_sleep";

/// Longest session, in whole hours, that can still count as a nap
pub const NAP_HOURS: i64 = 3;

/// Nap window by start hour: [08:00, 19:00)
const NAP_START_HOURS: std::ops::Range<u32> = 8..19;

const FITBIT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const READABLE_FORMAT: &str = "%Y-%m-%d %H:%M";

const MS_PER_SECOND: f64 = 1_000.0;
const MS_PER_MINUTE: f64 = 60_000.0;
const MS_PER_HOUR: f64 = 3_600_000.0;

// ============================================================================
// Raw feed
// ============================================================================

/// One sleep log as returned by the Fitbit sleep-by-date-range endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSleepSession {
    #[serde(default)]
    pub log_id: Option<i64>,
    pub date_of_sleep: String,
    #[serde(default)]
    pub duration: i64,
    pub start_time: String,
    pub end_time: String,
    pub efficiency: i64,
    pub minutes_asleep: i64,
    pub minutes_awake: i64,
    pub is_main_sleep: bool,
    #[serde(rename = "type", default = "unknown_log_type")]
    pub log_type: String,
    #[serde(default)]
    pub levels: Levels,
}

fn unknown_log_type() -> String {
    "unknown".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Levels {
    #[serde(default)]
    pub summary: BTreeMap<String, StageSummary>,
    #[serde(default)]
    pub data: Vec<LevelEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StageSummary {
    #[serde(default)]
    pub count: Option<i64>,
    #[serde(default)]
    pub minutes: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelEntry {
    #[serde(default)]
    pub date_time: Option<String>,
    pub level: String,
    #[serde(default)]
    pub seconds: Option<i64>,
}

impl Levels {
    fn stage(&self, name: &str) -> Option<&StageSummary> {
        self.summary.get(name)
    }

    fn stage_count(&self, name: &str) -> Option<i64> {
        self.stage(name).and_then(|s| s.count)
    }

    fn stage_minutes(&self, name: &str) -> Option<i64> {
        self.stage(name).and_then(|s| s.minutes)
    }

    /// Number of per-epoch entries recorded at `level`
    fn epochs_at(&self, level: &str) -> i64 {
        self.data.iter().filter(|e| e.level == level).count() as i64
    }
}

/// The API wraps sessions in `{"sleep": [...]}`; saved feeds may be a bare array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SleepFeed {
    Envelope { sleep: Vec<RawSleepSession> },
    Sessions(Vec<RawSleepSession>),
}

pub fn parse_feed(text: &str) -> Result<Vec<RawSleepSession>> {
    let sessions = match serde_json::from_str::<SleepFeed>(text)? {
        SleepFeed::Envelope { sleep } => sleep,
        SleepFeed::Sessions(sessions) => sessions,
    };
    Ok(sessions)
}

pub fn load_feed<P: AsRef<Path>>(path: P) -> Result<Vec<RawSleepSession>> {
    let path = path.as_ref();
    info!(path = %path.display(), "reading sleep feed");
    parse_feed(&std::fs::read_to_string(path)?)
}

// ============================================================================
// Classification
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SleepType {
    Nap,
    Full,
}

impl fmt::Display for SleepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SleepType::Nap => write!(f, "nap"),
            SleepType::Full => write!(f, "full"),
        }
    }
}

/// Classify a session as nap or full sleep
pub fn nap_or_full(duration_hours: i64, start_time: NaiveDateTime, end_time: NaiveDateTime) -> SleepType {
    let same_day = start_time.date() == end_time.date();

    if NAP_START_HOURS.contains(&start_time.hour()) && duration_hours <= NAP_HOURS {
        SleepType::Nap
    } else if same_day && duration_hours <= NAP_HOURS {
        SleepType::Nap
    } else if same_day && duration_hours > NAP_HOURS {
        SleepType::Full
    } else if !same_day && duration_hours > NAP_HOURS {
        SleepType::Full
    } else if !same_day && duration_hours <= NAP_HOURS {
        SleepType::Nap
    } else {
        SleepType::Full
    }
}

/// Classified and enriched sleep session, one row of `fitbit_sleep`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SleepSession {
    pub date: NaiveDate,
    pub date_ymd: String,
    pub duration_milliseconds: i64,
    pub duration_seconds: i64,
    pub duration_minutes: i64,
    pub duration_hours: i64,
    pub duration_hhmmss: String,
    pub sleep_type: SleepType,
    pub night_of_sleep: Option<NaiveDate>,
    pub day_of_nap: Option<NaiveDate>,
    pub start_time: NaiveDateTime,
    pub start_time_ymdhm: String,
    pub end_time: NaiveDateTime,
    pub end_time_ymdhm: String,
    pub efficiency: i64,
    pub minutes_asleep: i64,
    pub minutes_awake: i64,
    pub main_sleep: bool,
    pub deep_sleep_count: Option<i64>,
    pub deep_sleep_minutes: Option<i64>,
    pub light_sleep_count: Option<i64>,
    pub light_sleep_minutes: Option<i64>,
    pub rem_sleep_count: Option<i64>,
    pub rem_sleep_minutes: Option<i64>,
    pub wake_count: Option<i64>,
    pub wake_minutes: Option<i64>,
    pub asleep_count: Option<i64>,
    pub asleep_minutes: Option<i64>,
    pub awake_count: Option<i64>,
    pub awake_minutes: Option<i64>,
    pub restless_count: Option<i64>,
    pub restless_minutes: Option<i64>,
    pub sleep_log_type: String,
}

fn session_identity(raw: &RawSleepSession) -> String {
    match raw.log_id {
        Some(id) => format!("logId={}", id),
        None => format!("dateOfSleep={}", raw.date_of_sleep),
    }
}

fn parse_time(raw: &RawSleepSession, column: &str, value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, FITBIT_TIME_FORMAT).map_err(|e| {
        Error::malformed(SLEEP_TABLE, session_identity(raw), column, format!("{:?}: {}", value, e))
    })
}

/// Millisecond duration as `H:MM:SS`, sub-second part dropped
pub fn format_hhmmss(duration_ms: i64) -> String {
    let total = duration_ms / 1_000;
    format!("{}:{:02}:{:02}", total / 3_600, (total % 3_600) / 60, total % 60)
}

fn rounded(duration_ms: i64, unit_ms: f64) -> i64 {
    (duration_ms as f64 / unit_ms).round_ties_even() as i64
}

pub fn classify_and_enrich(raw: &RawSleepSession) -> Result<SleepSession> {
    if raw.duration < 0 {
        return Err(Error::malformed(
            SLEEP_TABLE,
            session_identity(raw),
            "duration",
            format!("negative duration: {}", raw.duration),
        ));
    }

    let start_time = parse_time(raw, "startTime", &raw.start_time)?;
    let end_time = parse_time(raw, "endTime", &raw.end_time)?;
    let date = NaiveDate::parse_from_str(&raw.date_of_sleep, DATE_FORMAT).map_err(|e| {
        Error::malformed(
            SLEEP_TABLE,
            session_identity(raw),
            "dateOfSleep",
            format!("{:?}: {}", raw.date_of_sleep, e),
        )
    })?;

    let duration_hours = rounded(raw.duration, MS_PER_HOUR);
    let sleep_type = nap_or_full(duration_hours, start_time, end_time);

    let levels = &raw.levels;
    let classic = raw.log_type == "classic";
    let epoch_count = |level: &str| classic.then(|| levels.epochs_at(level));

    debug!(session = %session_identity(raw), %sleep_type, duration_hours, "classified sleep session");

    Ok(SleepSession {
        date,
        date_ymd: date.format(DATE_FORMAT).to_string(),
        duration_milliseconds: raw.duration,
        duration_seconds: rounded(raw.duration, MS_PER_SECOND),
        duration_minutes: rounded(raw.duration, MS_PER_MINUTE),
        duration_hours,
        duration_hhmmss: format_hhmmss(raw.duration),
        sleep_type,
        night_of_sleep: (sleep_type == SleepType::Full).then_some(date),
        day_of_nap: (sleep_type == SleepType::Nap).then_some(date),
        start_time,
        start_time_ymdhm: start_time.format(READABLE_FORMAT).to_string(),
        end_time,
        end_time_ymdhm: end_time.format(READABLE_FORMAT).to_string(),
        efficiency: raw.efficiency,
        minutes_asleep: raw.minutes_asleep,
        minutes_awake: raw.minutes_awake,
        main_sleep: raw.is_main_sleep,
        deep_sleep_count: levels.stage_count("deep"),
        deep_sleep_minutes: levels.stage_minutes("deep"),
        light_sleep_count: levels.stage_count("light"),
        light_sleep_minutes: levels.stage_minutes("light"),
        rem_sleep_count: levels.stage_count("rem"),
        rem_sleep_minutes: levels.stage_minutes("rem"),
        wake_count: levels.stage_count("wake"),
        wake_minutes: levels.stage_minutes("wake"),
        asleep_count: epoch_count("asleep"),
        asleep_minutes: levels.stage_minutes("asleep"),
        awake_count: epoch_count("awake"),
        awake_minutes: levels.stage_minutes("awake"),
        restless_count: epoch_count("restless"),
        restless_minutes: levels.stage_minutes("restless"),
        sleep_log_type: raw.log_type.clone(),
    })
}

/// Classify every session of a feed; an empty feed is [`Error::UpstreamEmpty`]
pub fn classify_all(raw: &[RawSleepSession]) -> Result<Vec<SleepSession>> {
    if raw.is_empty() {
        return Err(Error::UpstreamEmpty("sleep sessions".to_string()));
    }
    let sessions = raw.iter().map(classify_and_enrich).collect::<Result<Vec<_>>>()?;
    let naps = sessions.iter().filter(|s| s.sleep_type == SleepType::Nap).count();
    info!(sessions = sessions.len(), naps, "classified sleep sessions");
    Ok(sessions)
}

// ============================================================================
// Table form
// ============================================================================

/// Columns of `fitbit_sleep`, in persistence order
pub fn columns() -> Vec<ColumnSchema> {
    use ColumnType::*;
    [
        ("date", Text, "date"),
        ("date_ymd", Text, ""),
        ("duration_milliseconds", Integer, "measure"),
        ("duration_seconds", Integer, "measure"),
        ("duration_minutes", Integer, "measure"),
        ("duration_hours", Integer, "measure"),
        ("duration_hhmmss", Text, ""),
        ("sleep_type", Text, "category"),
        ("night_of_sleep", Text, "date"),
        ("day_of_nap", Text, "date"),
        ("start_time", Timestamp, "timestamp"),
        ("start_time_ymdhm", Text, ""),
        ("end_time", Timestamp, "timestamp"),
        ("end_time_ymdhm", Text, ""),
        ("efficiency", Integer, "measure"),
        ("minutes_asleep", Integer, "measure"),
        ("minutes_awake", Integer, "measure"),
        ("main_sleep", Boolean, ""),
        ("deep_sleep_count", Integer, "measure"),
        ("deep_sleep_minutes", Integer, "measure"),
        ("light_sleep_count", Integer, "measure"),
        ("light_sleep_minutes", Integer, "measure"),
        ("rem_sleep_count", Integer, "measure"),
        ("rem_sleep_minutes", Integer, "measure"),
        ("wake_count", Integer, "measure"),
        ("wake_minutes", Integer, "measure"),
        ("asleep_count", Integer, "measure"),
        ("asleep_minutes", Integer, "measure"),
        ("awake_count", Integer, "measure"),
        ("awake_minutes", Integer, "measure"),
        ("restless_count", Integer, "measure"),
        ("restless_minutes", Integer, "measure"),
        ("sleep_log_type", Text, "category"),
    ]
    .into_iter()
    .map(|(name, column_type, role)| ColumnSchema::new(name, column_type, role))
    .collect()
}

impl SleepSession {
    pub fn to_row(&self) -> Row {
        let text = |s: &str| Value::Text(s.to_string());
        Row::from([
            ("date".to_string(), Value::Date(self.date)),
            ("date_ymd".to_string(), text(&self.date_ymd)),
            ("duration_milliseconds".to_string(), Value::Integer(self.duration_milliseconds)),
            ("duration_seconds".to_string(), Value::Integer(self.duration_seconds)),
            ("duration_minutes".to_string(), Value::Integer(self.duration_minutes)),
            ("duration_hours".to_string(), Value::Integer(self.duration_hours)),
            ("duration_hhmmss".to_string(), text(&self.duration_hhmmss)),
            ("sleep_type".to_string(), text(&self.sleep_type.to_string())),
            ("night_of_sleep".to_string(), Value::from(self.night_of_sleep)),
            ("day_of_nap".to_string(), Value::from(self.day_of_nap)),
            ("start_time".to_string(), Value::Timestamp(self.start_time)),
            ("start_time_ymdhm".to_string(), text(&self.start_time_ymdhm)),
            ("end_time".to_string(), Value::Timestamp(self.end_time)),
            ("end_time_ymdhm".to_string(), text(&self.end_time_ymdhm)),
            ("efficiency".to_string(), Value::Integer(self.efficiency)),
            ("minutes_asleep".to_string(), Value::Integer(self.minutes_asleep)),
            ("minutes_awake".to_string(), Value::Integer(self.minutes_awake)),
            ("main_sleep".to_string(), Value::Boolean(self.main_sleep)),
            ("deep_sleep_count".to_string(), Value::from(self.deep_sleep_count)),
            ("deep_sleep_minutes".to_string(), Value::from(self.deep_sleep_minutes)),
            ("light_sleep_count".to_string(), Value::from(self.light_sleep_count)),
            ("light_sleep_minutes".to_string(), Value::from(self.light_sleep_minutes)),
            ("rem_sleep_count".to_string(), Value::from(self.rem_sleep_count)),
            ("rem_sleep_minutes".to_string(), Value::from(self.rem_sleep_minutes)),
            ("wake_count".to_string(), Value::from(self.wake_count)),
            ("wake_minutes".to_string(), Value::from(self.wake_minutes)),
            ("asleep_count".to_string(), Value::from(self.asleep_count)),
            ("asleep_minutes".to_string(), Value::from(self.asleep_minutes)),
            ("awake_count".to_string(), Value::from(self.awake_count)),
            ("awake_minutes".to_string(), Value::from(self.awake_minutes)),
            ("restless_count".to_string(), Value::from(self.restless_count)),
            ("restless_minutes".to_string(), Value::from(self.restless_minutes)),
            ("sleep_log_type".to_string(), text(&self.sleep_log_type)),
        ])
    }
}

pub fn sessions_table(sessions: &[SleepSession]) -> NormalizedTable {
    let mut table = NormalizedTable::new(SLEEP_TABLE, columns());
    table.rows = sessions.iter().map(SleepSession::to_row).collect();
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn raw(value: serde_json::Value) -> RawSleepSession {
        serde_json::from_value(value).unwrap()
    }

    fn classic_session() -> serde_json::Value {
        json!({
            "logId": 101,
            "dateOfSleep": "2024-05-02",
            "duration": 27_000_000,
            "startTime": "2024-05-01T23:15:00.000",
            "endTime": "2024-05-02T06:45:00.000",
            "efficiency": 93,
            "minutesAsleep": 410,
            "minutesAwake": 40,
            "isMainSleep": true,
            "type": "classic",
            "levels": {
                "summary": {
                    "asleep": {"count": 0, "minutes": 410},
                    "awake": {"count": 3, "minutes": 10},
                    "restless": {"count": 9, "minutes": 30}
                },
                "data": [
                    {"dateTime": "2024-05-01T23:15:00.000", "level": "restless", "seconds": 120},
                    {"dateTime": "2024-05-01T23:17:00.000", "level": "asleep", "seconds": 3600},
                    {"dateTime": "2024-05-02T00:17:00.000", "level": "awake", "seconds": 60},
                    {"dateTime": "2024-05-02T00:18:00.000", "level": "asleep", "seconds": 21000}
                ]
            }
        })
    }

    // ==========================================================================
    // NAP OR FULL DECISION TABLE
    // ==========================================================================
    //
    // The rules overlap (rule 1 and rule 2 both catch a short daytime
    // session), so each case below pins which rule actually fires.
    // ==========================================================================

    #[rstest]
    #[case::daytime_short(2, at(1, 10, 0), at(1, 12, 0), SleepType::Nap)]
    #[case::same_day_short_early(1, at(1, 4, 0), at(1, 5, 0), SleepType::Nap)]
    #[case::same_day_long(8, at(1, 0, 30), at(1, 8, 30), SleepType::Full)]
    #[case::overnight_long(8, at(1, 23, 0), at(2, 7, 0), SleepType::Full)]
    #[case::overnight_short(1, at(1, 23, 30), at(2, 0, 30), SleepType::Nap)]
    #[case::daytime_long(4, at(1, 13, 0), at(1, 17, 0), SleepType::Full)]
    #[case::threshold_is_inclusive(3, at(1, 20, 0), at(1, 23, 0), SleepType::Nap)]
    #[case::evening_start_not_daytime(4, at(1, 19, 0), at(1, 23, 0), SleepType::Full)]
    fn test_nap_or_full(
        #[case] hours: i64,
        #[case] start: NaiveDateTime,
        #[case] end: NaiveDateTime,
        #[case] expected: SleepType,
    ) {
        assert_eq!(nap_or_full(hours, start, end), expected);
    }

    // ==========================================================================
    // DERIVED FIELDS
    // ==========================================================================

    #[test]
    fn test_classic_session_enrichment() {
        let session = classify_and_enrich(&raw(classic_session())).unwrap();

        assert_eq!(session.date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        assert_eq!(session.date_ymd, "2024-05-02");
        assert_eq!(session.duration_seconds, 27_000);
        assert_eq!(session.duration_minutes, 450);
        assert_eq!(session.duration_hours, 8); // 7.5h rounds to even
        assert_eq!(session.duration_hhmmss, "7:30:00");
        assert_eq!(session.sleep_type, SleepType::Full);
        assert_eq!(session.night_of_sleep, Some(session.date));
        assert_eq!(session.day_of_nap, None);
        assert_eq!(session.start_time_ymdhm, "2024-05-01 23:15");
        assert_eq!(session.end_time_ymdhm, "2024-05-02 06:45");
        assert_eq!(session.asleep_count, Some(2));
        assert_eq!(session.awake_count, Some(1));
        assert_eq!(session.restless_count, Some(1));
        assert_eq!(session.restless_minutes, Some(30));
        assert_eq!(session.deep_sleep_minutes, None);
        assert!(session.main_sleep);
    }

    #[test]
    fn test_stages_session_has_no_epoch_counts() {
        let session = classify_and_enrich(&raw(json!({
            "dateOfSleep": "2024-05-03",
            "duration": 5_400_000,
            "startTime": "2024-05-03T14:00:00.000",
            "endTime": "2024-05-03T15:30:00.000",
            "efficiency": 88,
            "minutesAsleep": 80,
            "minutesAwake": 10,
            "isMainSleep": false,
            "type": "stages",
            "levels": {
                "summary": {
                    "deep": {"count": 1, "minutes": 20},
                    "light": {"count": 4, "minutes": 50},
                    "rem": {"count": 1, "minutes": 10},
                    "wake": {"count": 2, "minutes": 10}
                },
                "data": [{"dateTime": "2024-05-03T14:00:00.000", "level": "light", "seconds": 600}]
            }
        })))
        .unwrap();

        assert_eq!(session.sleep_type, SleepType::Nap);
        assert_eq!(session.day_of_nap, Some(session.date));
        assert_eq!(session.night_of_sleep, None);
        assert_eq!(session.duration_hours, 2); // 1.5h rounds to even
        assert_eq!((session.asleep_count, session.awake_count, session.restless_count), (None, None, None));
        assert_eq!(session.deep_sleep_count, Some(1));
        assert_eq!(session.light_sleep_minutes, Some(50));
        assert_eq!(session.wake_count, Some(2));
    }

    #[test]
    fn test_missing_type_is_unknown() {
        let mut value = classic_session();
        value.as_object_mut().unwrap().remove("type");
        let session = classify_and_enrich(&raw(value)).unwrap();

        assert_eq!(session.sleep_log_type, "unknown");
        assert_eq!(session.asleep_count, None);
    }

    #[test]
    fn test_attribution_date_comes_from_date_of_sleep() {
        // early-morning full sleep; Fitbit credits it to the wake-up day
        let mut value = classic_session();
        value["startTime"] = json!("2024-05-02T01:00:00.000");
        value["endTime"] = json!("2024-05-02T08:30:00.000");
        let session = classify_and_enrich(&raw(value)).unwrap();

        assert_eq!(session.sleep_type, SleepType::Full);
        assert_eq!(session.night_of_sleep, NaiveDate::from_ymd_opt(2024, 5, 2));
    }

    #[test]
    fn test_bad_start_time_is_malformed() {
        let mut value = classic_session();
        value["startTime"] = json!("last night");
        let err = classify_and_enrich(&raw(value)).unwrap_err();

        assert!(matches!(
            err,
            Error::MalformedValue { ref row, ref column, .. } if row == "logId=101" && column == "startTime"
        ));
    }

    #[test]
    fn test_time_without_fraction_parses() {
        let mut value = classic_session();
        value["startTime"] = json!("2024-05-01T23:15:00");
        assert!(classify_and_enrich(&raw(value)).is_ok());
    }

    #[test]
    fn test_format_hhmmss() {
        assert_eq!(format_hhmmss(0), "0:00:00");
        assert_eq!(format_hhmmss(3_723_999), "1:02:03");
        assert_eq!(format_hhmmss(90_000_000), "25:00:00");
    }

    #[test]
    fn test_empty_feed_is_upstream_empty() {
        assert!(matches!(classify_all(&[]), Err(Error::UpstreamEmpty(_))));
    }

    #[test]
    fn test_feed_envelope_and_bare_array() {
        let session = classic_session();
        let wrapped = json!({"sleep": [session.clone()]}).to_string();
        let bare = json!([session]).to_string();

        assert_eq!(parse_feed(&wrapped).unwrap().len(), 1);
        assert_eq!(parse_feed(&bare).unwrap().len(), 1);
    }

    #[test]
    fn test_row_covers_every_column() {
        let session = classify_and_enrich(&raw(classic_session())).unwrap();
        let table = sessions_table(&[session]);
        let row = &table.rows[0];

        assert_eq!(row.len(), table.columns.len());
        for name in table.column_names() {
            assert!(row.contains_key(name), "row missing {}", name);
        }
        assert_eq!(row["sleep_type"], Value::Text("full".into()));
        assert_eq!(row["day_of_nap"], Value::Null);
    }
}

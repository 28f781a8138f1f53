//! JSON output: generation time, summary and sessions

use crate::fitbit::SleepSession;
use crate::report::Summary;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Serialize)]
struct SleepReport<'a> {
    generated: String,
    summary: Summary,
    sessions: &'a [SleepSession],
}

pub fn write<W: Write>(writer: &mut W, sessions: &[SleepSession]) -> io::Result<()> {
    let report = SleepReport {
        generated: chrono::Local::now().to_rfc3339(),
        summary: Summary::from_sessions(sessions),
        sessions,
    };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::session;

    #[test]
    fn test_json_report_shape() {
        let sessions = vec![session("2024-05-01T23:00:00.000", "2024-05-02T07:00:00.000", 28_800_000, 420)];
        let mut out = Vec::new();
        write(&mut out, &sessions).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["summary"]["full"], 1);
        assert_eq!(value["sessions"][0]["sleep_type"], "full");
        assert_eq!(value["sessions"][0]["night_of_sleep"], "2024-05-02");
        assert_eq!(value["sessions"][0]["day_of_nap"], serde_json::Value::Null);
        assert_eq!(value["sessions"][0]["start_time"], "2024-05-01T23:00:00");
    }
}

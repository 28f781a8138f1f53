//! CSV output, one row per sleep session

use crate::fitbit::sleep::{columns, SleepSession};
use std::io::{self, Write};

pub fn write<W: Write>(writer: &mut W, sessions: &[SleepSession]) -> io::Result<()> {
    let columns = columns();
    let header: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    writeln!(writer, "{}", header.join(","))?;

    for session in sessions {
        let row = session.to_row();
        let fields: Vec<String> = columns
            .iter()
            .map(|c| row.get(&c.name).map(|v| escape(&v.to_string())).unwrap_or_default())
            .collect();
        writeln!(writer, "{}", fields.join(","))?;
    }
    Ok(())
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

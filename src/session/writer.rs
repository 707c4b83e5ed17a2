use std::{
    fs::{self, File},
    io::BufWriter,
    path::Path,
};

use log::debug;
use serde_jsonlines::JsonLinesWriter;

use crate::SignatureError;

use super::{SessionData, SessionRecord};

/// Writes a session as JSON lines: the session header followed by one line per lap.
pub fn write_session(file: &Path, session: &SessionData) -> Result<(), SignatureError> {
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent).map_err(|e| SignatureError::WriterError { source: e })?;
    }
    let session_file = File::create(file).map_err(|e| SignatureError::WriterError { source: e })?;
    let mut session_writer = JsonLinesWriter::new(BufWriter::new(session_file));

    session_writer
        .write(&SessionRecord::Session(session.selector.clone()))
        .map_err(|e| SignatureError::WriterError { source: e })?;
    for lap in session.laps.values().flatten() {
        session_writer
            .write(&SessionRecord::Lap(Box::new(lap.clone())))
            .map_err(|e| SignatureError::WriterError { source: e })?;
    }
    session_writer
        .flush()
        .map_err(|e| SignatureError::WriterError { source: e })?;

    debug!(
        "Wrote {} laps of {} to {:?}",
        session.lap_count(),
        session.selector,
        file
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{LapRecord, SessionSelector, SessionType, TelemetrySample};
    use std::io::{BufRead, BufReader};
    use tempfile::TempDir;

    #[test]
    fn test_header_is_first_line() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("2023").join("bahrain").join("race.jsonl");
        let selector = SessionSelector::new(2023, "Bahrain Grand Prix", SessionType::Race).unwrap();
        let session = SessionData::from_laps(
            selector,
            vec![
                LapRecord {
                    lap_number: 1,
                    driver: "VER".to_string(),
                    lap_time_s: Some(95.2),
                    telemetry: vec![TelemetrySample::default()],
                },
                LapRecord {
                    lap_number: 1,
                    driver: "ALO".to_string(),
                    lap_time_s: Some(96.0),
                    telemetry: vec![],
                },
            ],
        );

        write_session(&path, &session).unwrap();

        let lines: Vec<String> = BufReader::new(File::open(&path).unwrap())
            .lines()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with(r#"{"Session":"#));
        assert!(lines[1].starts_with(r#"{"Lap":"#));
        // laps are written grouped by driver in sorted order
        assert!(lines[1].contains(r#""driver":"ALO""#));
    }
}

//! Write-Ahead Log (WAL) for the training log.
//!
//! Each performed protocol day is appended as one JSON line. A day can be
//! logged once per WAL; the file is rolled into the CSV archive when a new
//! protocol run starts, so day numbers never collide within it.

use crate::{Error, Result, TrainingSession};
use fs2::FileExt;
use serde::Deserialize;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Session sink trait for persisting training sessions
pub trait SessionSink {
    fn append(&mut self, session: &TrainingSession) -> Result<()>;
}

/// Appends sessions to a JSONL training log, one protocol day per line
pub struct JsonlSink {
    path: PathBuf,
}

/// Just enough of a logged line to know which day it recorded
#[derive(Deserialize)]
struct LoggedDay {
    day: u32,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Caller must hold the exclusive lock on `file`
    fn append_locked(&self, file: &File, session: &TrainingSession) -> Result<()> {
        for line in BufReader::new(file).lines() {
            let line = line?;
            // Torn or foreign lines never block a new day
            let Ok(logged) = serde_json::from_str::<LoggedDay>(&line) else {
                continue;
            };
            if logged.day == session.day {
                return Err(Error::State(format!(
                    "day {} is already in the training log {:?}",
                    session.day, self.path
                )));
            }
        }

        let mut writer = BufWriter::new(file);
        let line = serde_json::to_string(session)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

impl SessionSink for JsonlSink {
    fn append(&mut self, session: &TrainingSession) -> Result<()> {
        self.ensure_parent_dir()?;

        // Reads start at 0; writes always land at the end
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;
        let result = self.append_locked(&file, session);
        file.unlock()?;
        result?;

        tracing::debug!("Logged day {} as session {}", session.day, session.id);
        Ok(())
    }
}

/// Read all sessions from a WAL file
///
/// Malformed lines are skipped with a warning.
pub fn read_sessions(path: &Path) -> Result<Vec<TrainingSession>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut sessions = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<TrainingSession>(&line) {
            Ok(session) => sessions.push(session),
            Err(e) => {
                tracing::warn!("Failed to parse session at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} sessions from WAL", sessions.len());
    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{generate_workout, LiftState, PerformedSet};
    use chrono::Utc;

    fn create_test_session(day: u32) -> TrainingSession {
        let lifts = LiftState {
            bench: 60.0,
            squat: 80.0,
            deadlift: 100.0,
            ohp: 40.0,
            pullups_level: 5,
        };
        let workout = generate_workout(day, &lifts).unwrap();
        let performed: Vec<_> = workout
            .exercises
            .iter()
            .map(|e| PerformedSet::from_counts(e.id.clone(), e.sets, e.sets))
            .collect();
        TrainingSession::from_workout(&workout, &performed, None, Utc::now())
    }

    #[test]
    fn test_append_and_read_single_session() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("test.wal");

        let session = create_test_session(1);
        let session_id = session.id;

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&session).unwrap();

        let sessions = read_sessions(&wal_path).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, session_id);
        assert_eq!(sessions[0].performed.len(), session.performed.len());
        assert_eq!(sessions[0].sets_completed, sessions[0].sets_total);
    }

    #[test]
    fn test_append_multiple_sessions() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("test.wal");

        let mut sink = JsonlSink::new(&wal_path);
        for day in 1..=5 {
            sink.append(&create_test_session(day)).unwrap();
        }

        let sessions = read_sessions(&wal_path).unwrap();
        assert_eq!(sessions.len(), 5);
        assert_eq!(sessions[4].day, 5);
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("test.wal");

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&create_test_session(1)).unwrap();

        let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
        writeln!(file, "{{ not a session").unwrap();
        drop(file);

        sink.append(&create_test_session(2)).unwrap();

        let sessions = read_sessions(&wal_path).unwrap();
        assert_eq!(sessions.len(), 2);
    }

    #[test]
    fn test_same_day_logged_once() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("training.wal");

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&create_test_session(1)).unwrap();
        sink.append(&create_test_session(2)).unwrap();

        let again = sink.append(&create_test_session(1));
        assert!(matches!(again, Err(Error::State(_))));

        let days: Vec<u32> = read_sessions(&wal_path)
            .unwrap()
            .iter()
            .map(|s| s.day)
            .collect();
        assert_eq!(days, vec![1, 2]);
    }

    #[test]
    fn test_read_empty_wal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("nonexistent.wal");

        let sessions = read_sessions(&wal_path).unwrap();
        assert!(sessions.is_empty());
    }
}

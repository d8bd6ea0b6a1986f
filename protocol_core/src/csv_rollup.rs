//! CSV rollup functionality for archiving the training log.
//!
//! This module implements atomic WAL-to-CSV conversion with proper error handling
//! to prevent data loss. The CSV keeps one summary row per training day; the
//! per-set detail stays in the archived WAL.

use crate::{Error, LiftStateUpdate, MainLift, Result, TrainingSession};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::Path;
use uuid::Uuid;

/// A row in the CSV archive
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SessionRow {
    id: String,
    day: u32,
    day_label: String,
    main_lift: Option<MainLift>,
    is_deload: bool,
    performed_at: String,
    sets_completed: u32,
    sets_total: u32,
    unlocked_bench: Option<f64>,
    unlocked_squat: Option<f64>,
    unlocked_deadlift: Option<f64>,
    unlocked_ohp: Option<f64>,
    unlocked_pullups_level: Option<u32>,
}

impl From<&TrainingSession> for SessionRow {
    fn from(session: &TrainingSession) -> Self {
        let unlocked = session.unlocked.clone().unwrap_or_default();
        SessionRow {
            id: session.id.to_string(),
            day: session.day,
            day_label: session.day_label.clone(),
            main_lift: session.main_lift,
            is_deload: session.is_deload,
            performed_at: session.performed_at.to_rfc3339(),
            sets_completed: session.sets_completed,
            sets_total: session.sets_total,
            unlocked_bench: unlocked.bench,
            unlocked_squat: unlocked.squat,
            unlocked_deadlift: unlocked.deadlift,
            unlocked_ohp: unlocked.ohp,
            unlocked_pullups_level: unlocked.pullups_level,
        }
    }
}

impl TryFrom<SessionRow> for TrainingSession {
    type Error = Error;

    fn try_from(row: SessionRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| Error::Other(format!("Invalid UUID: {}", e)))?;

        let performed_at = DateTime::parse_from_rfc3339(&row.performed_at)
            .map_err(|e| Error::Other(format!("Invalid date: {}", e)))?
            .with_timezone(&Utc);

        let update = LiftStateUpdate {
            bench: row.unlocked_bench,
            squat: row.unlocked_squat,
            deadlift: row.unlocked_deadlift,
            ohp: row.unlocked_ohp,
            pullups_level: row.unlocked_pullups_level,
        };

        Ok(TrainingSession {
            id,
            day: row.day,
            day_label: row.day_label,
            main_lift: row.main_lift,
            is_deload: row.is_deload,
            performed_at,
            sets_completed: row.sets_completed,
            sets_total: row.sets_total,
            performed: vec![], // Not stored in CSV
            unlocked: (!update.is_empty()).then_some(update),
        })
    }
}

/// Roll up WAL sessions into CSV and archive the WAL atomically
///
/// This function:
/// 1. Reads all sessions from the WAL
/// 2. Appends them to the CSV file (creates with headers if needed)
/// 3. Syncs the CSV to disk
/// 4. Renames the WAL to .processed
/// 5. Returns the number of sessions processed
///
/// The CSV is fsynced before the WAL is renamed, and the WAL is renamed
/// rather than deleted so it can be recovered by hand.
pub fn wal_to_csv_and_archive(wal_path: &Path, csv_path: &Path) -> Result<usize> {
    let sessions = crate::wal::read_sessions(wal_path)?;

    if sessions.is_empty() {
        tracing::info!("No sessions in WAL to roll up");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Only a fresh file gets the header row
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for session in &sessions {
        writer.serialize(SessionRow::from(session))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Wrote {} sessions to CSV", sessions.len());

    let processed_path = wal_path.with_extension("wal.processed");
    std::fs::rename(wal_path, &processed_path)?;

    tracing::info!("Archived WAL to {:?}", processed_path);

    Ok(sessions.len())
}

/// Clean up old processed WAL files
///
/// This removes all .wal.processed files in the given directory.
pub fn cleanup_processed_wals(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.extension().is_some_and(|ext| ext == "processed") {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed processed WAL: {:?}", path);
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed WAL files", count);
    }

    Ok(count)
}

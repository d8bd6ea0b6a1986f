//! Training history loading and progress summaries.
//!
//! This module loads recent sessions from both the WAL and the CSV archive
//! and reduces them to a progress summary for display.

use crate::csv_rollup::SessionRow;
use crate::{Error, Result, TrainingSession};
use chrono::{Duration, Utc};
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::path::Path;

/// Load sessions from the last N days from both WAL and CSV
///
/// Returns sessions sorted by performed_at (newest first).
/// Sessions present in both WAL and CSV are kept once, WAL copy first.
/// A window too large to represent as a date is an error.
pub fn load_recent_sessions(
    wal_path: &Path,
    csv_path: &Path,
    days: i64,
) -> Result<Vec<TrainingSession>> {
    let cutoff = Duration::try_days(days)
        .and_then(|window| Utc::now().checked_sub_signed(window))
        .ok_or_else(|| Error::Other(format!("history window of {} days is out of range", days)))?;
    let mut sessions = Vec::new();
    let mut seen_ids = HashSet::new();

    if wal_path.exists() {
        for session in crate::wal::read_sessions(wal_path)? {
            if session.performed_at >= cutoff && seen_ids.insert(session.id) {
                sessions.push(session);
            }
        }
        tracing::debug!("Loaded {} sessions from WAL", sessions.len());
    }

    if csv_path.exists() {
        let mut csv_count = 0;
        for session in load_sessions_from_csv(csv_path)? {
            if session.performed_at >= cutoff && seen_ids.insert(session.id) {
                sessions.push(session);
                csv_count += 1;
            }
        }
        tracing::debug!("Loaded {} sessions from CSV", csv_count);
    }

    sessions.sort_by(|a, b| b.performed_at.cmp(&a.performed_at));

    tracing::info!(
        "Loaded {} total sessions from last {} days",
        sessions.len(),
        days
    );

    Ok(sessions)
}

/// Load all sessions from a CSV archive
fn load_sessions_from_csv(path: &Path) -> Result<Vec<TrainingSession>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut sessions = Vec::new();
    for result in reader.deserialize::<SessionRow>() {
        match result {
            Ok(row) => match TrainingSession::try_from(row) {
                Ok(session) => sessions.push(session),
                Err(e) => tracing::warn!("Failed to parse CSV row: {}", e),
            },
            Err(e) => tracing::warn!("Failed to deserialize CSV row: {}", e),
        }
    }

    Ok(sessions)
}

/// Aggregate view over a set of logged sessions
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProgressSummary {
    pub workouts: usize,
    pub deload_workouts: usize,
    pub unlocks: usize,
    pub sets_completed: u32,
    pub sets_total: u32,
    /// Highest training day logged
    pub latest_day: Option<u32>,
}

impl ProgressSummary {
    /// Fraction of logged sets that were completed
    pub fn completion_rate(&self) -> Option<f64> {
        if self.sets_total == 0 {
            return None;
        }
        Some(self.sets_completed as f64 / self.sets_total as f64)
    }
}

/// Summarize logged sessions
pub fn summarize(sessions: &[TrainingSession]) -> ProgressSummary {
    sessions
        .iter()
        .fold(ProgressSummary::default(), |mut summary, s| {
            summary.workouts += 1;
            if s.is_deload {
                summary.deload_workouts += 1;
            }
            if s.unlocked.is_some() {
                summary.unlocks += 1;
            }
            summary.sets_completed += s.sets_completed;
            summary.sets_total += s.sets_total;
            summary.latest_day = summary.latest_day.max(Some(s.day));
            summary
        })
}

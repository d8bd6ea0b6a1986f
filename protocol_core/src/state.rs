//! Protocol state persistence with file locking.
//!
//! The engine is stateless; this module is the caller side that keeps the
//! athlete's lift state and day counter on disk between sessions.

use crate::engine::{generate_workout, PROTOCOL_DAYS};
use crate::progression::{evaluate_unlock_with, ProgressionRules};
use crate::{Error, LiftState, LiftStateUpdate, PerformedSet, Result, Workout};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Persisted progress through the protocol
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProtocolState {
    pub lifts: LiftState,
    /// Next training day to perform (1-based)
    pub current_day: u32,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProtocolState {
    /// Start the protocol at day 1 with the given working weights
    pub fn new(lifts: LiftState) -> Result<Self> {
        lifts.validate()?;
        let now = Utc::now();
        Ok(Self {
            lifts,
            current_day: 1,
            started_at: now,
            updated_at: now,
        })
    }

    /// Whether all protocol days have been performed
    pub fn is_complete(&self) -> bool {
        self.current_day > PROTOCOL_DAYS
    }

    /// Workout for the current day
    pub fn todays_workout(&self) -> Result<Workout> {
        generate_workout(self.current_day, &self.lifts)
    }

    /// Record a performed workout and advance to the next day
    ///
    /// Any unlock is merged into the stored lifts and returned.
    pub fn complete_day(
        &mut self,
        workout: &Workout,
        performed: &[PerformedSet],
        rules: &ProgressionRules,
    ) -> Result<Option<LiftStateUpdate>> {
        if workout.day != self.current_day {
            return Err(Error::State(format!(
                "workout is for day {} but the protocol is on day {}",
                workout.day, self.current_day
            )));
        }

        let unlocked = evaluate_unlock_with(performed, &self.lifts, workout, rules);
        if let Some(update) = &unlocked {
            self.lifts = self.lifts.apply(update);
        }

        self.current_day += 1;
        self.updated_at = Utc::now();

        tracing::info!(
            "Completed day {}, next day {}",
            workout.day,
            self.current_day
        );
        Ok(unlocked)
    }

    /// Load state from a file with shared locking
    ///
    /// Returns None if the file doesn't exist. Unlike preferences, a
    /// malformed state file is an error: it holds the athlete's weights.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            tracing::debug!("No protocol state at {:?}", path);
            return Ok(None);
        }

        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        let state: ProtocolState = serde_json::from_str(&contents).map_err(|e| {
            Error::State(format!("Failed to parse protocol state {:?}: {}", path, e))
        })?;

        tracing::debug!("Loaded protocol state from {:?}", path);
        Ok(Some(state))
    }

    /// Save state to a file with exclusive locking
    ///
    /// Atomically writes state by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "state path missing parent")
        })?)?;

        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string_pretty(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved protocol state to {:?}", path);
        Ok(())
    }

    /// Load state, modify it, and save it back
    ///
    /// Fails if no state has been initialized yet.
    pub fn update<F, T>(path: &Path, f: F) -> Result<(Self, T)>
    where
        F: FnOnce(&mut ProtocolState) -> Result<T>,
    {
        let mut state = Self::load(path)?.ok_or_else(|| {
            Error::State(format!("No protocol state at {:?}; run `milprot init` first", path))
        })?;
        let out = f(&mut state)?;
        state.save(path)?;
        Ok((state, out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MainLift;

    fn test_lifts() -> LiftState {
        LiftState {
            bench: 60.0,
            squat: 80.0,
            deadlift: 100.0,
            ohp: 40.0,
            pullups_level: 5,
        }
    }

    fn full_completion(workout: &Workout) -> Vec<PerformedSet> {
        workout
            .exercises
            .iter()
            .map(|e| PerformedSet::from_counts(e.id.clone(), e.sets, e.sets))
            .collect()
    }

    #[test]
    fn test_new_rejects_bad_lifts() {
        let mut lifts = test_lifts();
        lifts.deadlift = -5.0;
        assert!(ProtocolState::new(lifts).is_err());
        assert_eq!(ProtocolState::new(test_lifts()).unwrap().current_day, 1);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state_path = temp_dir.path().join("state.json");

        let mut state = ProtocolState::new(test_lifts()).unwrap();
        state.current_day = 17;
        state.save(&state_path).unwrap();

        let loaded = ProtocolState::load(&state_path).unwrap().unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_load_nonexistent_returns_none() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state_path = temp_dir.path().join("nonexistent.json");

        assert!(ProtocolState::load(&state_path).unwrap().is_none());
    }

    #[test]
    fn test_corrupted_state_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state_path = temp_dir.path().join("corrupted.json");
        std::fs::write(&state_path, "{ invalid json }").unwrap();

        assert!(matches!(
            ProtocolState::load(&state_path),
            Err(Error::State(_))
        ));
    }

    #[test]
    fn test_complete_day_merges_unlock() {
        let mut state = ProtocolState::new(test_lifts()).unwrap();
        let workout = state.todays_workout().unwrap();
        let performed = full_completion(&workout);

        let unlocked = state
            .complete_day(&workout, &performed, &ProgressionRules::default())
            .unwrap();

        assert_eq!(unlocked.unwrap().get(MainLift::Bench), Some(62.5));
        assert_eq!(state.lifts.bench, 62.5);
        assert_eq!(state.lifts.pullups_level, 6);
        assert_eq!(state.lifts.squat, 80.0);
        assert_eq!(state.current_day, 2);
    }

    #[test]
    fn test_complete_day_rejects_wrong_day() {
        let mut state = ProtocolState::new(test_lifts()).unwrap();
        let workout = generate_workout(5, &state.lifts).unwrap();

        let result = state.complete_day(&workout, &[], &ProgressionRules::default());
        assert!(matches!(result, Err(Error::State(_))));
        assert_eq!(state.current_day, 1);
    }

    #[test]
    fn test_full_protocol_run() {
        let mut state = ProtocolState::new(test_lifts()).unwrap();
        let rules = ProgressionRules::default();

        while !state.is_complete() {
            let workout = state.todays_workout().unwrap();
            let performed = full_completion(&workout);
            state.complete_day(&workout, &performed, &rules).unwrap();
        }

        assert_eq!(state.current_day, PROTOCOL_DAYS + 1);
        // Bench trains twice per cycle; 15 cycles minus 3 deload cycles
        assert_eq!(state.lifts.bench, 60.0 + 2.5 * 24.0);
        assert_eq!(state.lifts.pullups_level, 5 + 24);
        assert_eq!(state.lifts.deadlift, 100.0 + 2.5 * 12.0);
    }

    #[test]
    fn test_update_requires_existing_state() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state_path = temp_dir.path().join("state.json");

        let result = ProtocolState::update(&state_path, |_| Ok(()));
        assert!(matches!(result, Err(Error::State(_))));

        ProtocolState::new(test_lifts())
            .unwrap()
            .save(&state_path)
            .unwrap();
        let (state, _) = ProtocolState::update(&state_path, |s| {
            s.current_day = 3;
            Ok(())
        })
        .unwrap();
        assert_eq!(state.current_day, 3);
        assert_eq!(
            ProtocolState::load(&state_path).unwrap().unwrap().current_day,
            3
        );
    }

    #[test]
    fn test_atomic_save() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state_path = temp_dir.path().join("state.json");

        ProtocolState::new(test_lifts())
            .unwrap()
            .save(&state_path)
            .unwrap();

        assert!(state_path.exists());
        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "state.json")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only state.json, found extras: {:?}",
            extras
        );
    }
}

//! Core domain types for the Military Protocol engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Main lifts and the athlete's lift state
//! - Static template definitions (exercises, rep schemes, day templates)
//! - Materialized workouts
//! - Performance records and logged training sessions

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Lift Types
// ============================================================================

/// Primary barbell movement trained on a lift day
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MainLift {
    Bench,
    Squat,
    Deadlift,
    Ohp,
}

impl MainLift {
    pub const ALL: [MainLift; 4] = [
        MainLift::Bench,
        MainLift::Squat,
        MainLift::Deadlift,
        MainLift::Ohp,
    ];

    /// Stable key, also used as the exercise id of the main-lift entry
    pub fn key(&self) -> &'static str {
        match self {
            MainLift::Bench => "bench",
            MainLift::Squat => "squat",
            MainLift::Deadlift => "deadlift",
            MainLift::Ohp => "ohp",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MainLift::Bench => "Barbell Bench Press",
            MainLift::Squat => "Barbell Back Squat",
            MainLift::Deadlift => "Conventional Deadlift",
            MainLift::Ohp => "Standing Overhead Press",
        }
    }

    pub fn target(&self) -> Target {
        match self {
            MainLift::Bench => Target::Chest,
            MainLift::Squat => Target::Quads,
            MainLift::Deadlift => Target::Hamstrings,
            MainLift::Ohp => Target::Shoulders,
        }
    }
}

impl fmt::Display for MainLift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The athlete's current working capacity per main lift
///
/// Weights share one unit (see `DisplayConfig::unit`). The engine never
/// mutates a `LiftState`; progression produces a new value via [`LiftState::apply`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LiftState {
    pub bench: f64,
    pub squat: f64,
    pub deadlift: f64,
    pub ohp: f64,
    pub pullups_level: u32,
}

impl LiftState {
    /// Current working weight for a lift
    pub fn weight(&self, lift: MainLift) -> f64 {
        match lift {
            MainLift::Bench => self.bench,
            MainLift::Squat => self.squat,
            MainLift::Deadlift => self.deadlift,
            MainLift::Ohp => self.ohp,
        }
    }

    /// Return the weight for `lift`, failing if it is not a usable load
    pub fn validate_lift(&self, lift: MainLift) -> Result<f64> {
        let weight = self.weight(lift);
        if !weight.is_finite() || weight <= 0.0 {
            return Err(Error::InvalidLiftState(format!(
                "{} weight must be a positive number, got {}",
                lift, weight
            )));
        }
        Ok(weight)
    }

    /// Check every lift weight
    pub fn validate(&self) -> Result<()> {
        for lift in MainLift::ALL {
            self.validate_lift(lift)?;
        }
        Ok(())
    }

    /// Merge a progression update into a copy of this state
    pub fn apply(&self, update: &LiftStateUpdate) -> LiftState {
        LiftState {
            bench: update.bench.unwrap_or(self.bench),
            squat: update.squat.unwrap_or(self.squat),
            deadlift: update.deadlift.unwrap_or(self.deadlift),
            ohp: update.ohp.unwrap_or(self.ohp),
            pullups_level: update.pullups_level.unwrap_or(self.pullups_level),
        }
    }
}

/// Partial lift state produced by an unlock
///
/// Only the fields that changed are present; absent fields are omitted
/// when serialized rather than written as unchanged values.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct LiftStateUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bench: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub squat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadlift: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ohp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pullups_level: Option<u32>,
}

impl LiftStateUpdate {
    pub fn get(&self, lift: MainLift) -> Option<f64> {
        match lift {
            MainLift::Bench => self.bench,
            MainLift::Squat => self.squat,
            MainLift::Deadlift => self.deadlift,
            MainLift::Ohp => self.ohp,
        }
    }

    pub fn set(&mut self, lift: MainLift, weight: f64) {
        let slot = match lift {
            MainLift::Bench => &mut self.bench,
            MainLift::Squat => &mut self.squat,
            MainLift::Deadlift => &mut self.deadlift,
            MainLift::Ohp => &mut self.ohp,
        };
        *slot = Some(weight);
    }

    pub fn is_empty(&self) -> bool {
        MainLift::ALL.iter().all(|lift| self.get(*lift).is_none()) && self.pullups_level.is_none()
    }
}

impl fmt::Display for LiftStateUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        for lift in MainLift::ALL {
            if let Some(weight) = self.get(lift) {
                parts.push(format!("{}={}", lift, weight));
            }
        }
        if let Some(level) = self.pullups_level {
            parts.push(format!("pullups_level={}", level));
        }
        f.write_str(&parts.join(" "))
    }
}

// ============================================================================
// Template Types
// ============================================================================

/// Which part of a session an exercise belongs to
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Warmup,
    Main,
    Accessory,
}

/// Muscle group or training quality an exercise is aimed at
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Chest,
    Back,
    Shoulders,
    Biceps,
    Triceps,
    Quads,
    Hamstrings,
    Glutes,
    Calves,
    Core,
    Conditioning,
    Mobility,
    FullBody,
}

impl Target {
    pub const ALL: [Target; 13] = [
        Target::Chest,
        Target::Back,
        Target::Shoulders,
        Target::Biceps,
        Target::Triceps,
        Target::Quads,
        Target::Hamstrings,
        Target::Glutes,
        Target::Calves,
        Target::Core,
        Target::Conditioning,
        Target::Mobility,
        Target::FullBody,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Target::Chest => "Chest",
            Target::Back => "Back",
            Target::Shoulders => "Shoulders",
            Target::Biceps => "Biceps",
            Target::Triceps => "Triceps",
            Target::Quads => "Quads",
            Target::Hamstrings => "Hamstrings",
            Target::Glutes => "Glutes",
            Target::Calves => "Calves",
            Target::Core => "Core",
            Target::Conditioning => "Conditioning",
            Target::Mobility => "Mobility",
            Target::FullBody => "Full Body",
        }
    }
}

/// Per-set work prescription
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RepScheme {
    /// Fixed number of reps
    Reps { count: u32 },
    /// Rep range, e.g. 8-12
    Range { min: u32, max: u32 },
    /// Timed work
    Seconds { count: u32 },
    /// Distance work
    Meters { count: u32 },
    /// As many reps as possible
    Max,
}

impl fmt::Display for RepScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepScheme::Reps { count } => write!(f, "{}", count),
            RepScheme::Range { min, max } => write!(f, "{}-{}", min, max),
            RepScheme::Seconds { count } if *count >= 60 && count % 60 == 0 => {
                write!(f, "{}min", count / 60)
            }
            RepScheme::Seconds { count } => write!(f, "{}s", count),
            RepScheme::Meters { count } if *count >= 1000 && count % 1000 == 0 => {
                write!(f, "{}km", count / 1000)
            }
            RepScheme::Meters { count } => write!(f, "{}m", count),
            RepScheme::Max => f.write_str("max"),
        }
    }
}

/// A statically defined exercise inside a template
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExerciseDef {
    pub id: &'static str,
    pub name: &'static str,
    pub block: BlockType,
    pub sets: u32,
    pub reps: RepScheme,
    pub target: Target,
}

/// Main-lift prescription for a template
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MainLiftSpec {
    pub lift: MainLift,
    pub sets: u32,
    pub reps: RepScheme,
}

/// One of the recurring day templates
#[derive(Clone, Copy, Debug)]
pub struct DayTemplate {
    /// Day type, 1-12
    pub day_type: u8,
    /// Short label, e.g. "Bench Day"
    pub name: &'static str,
    pub main: Option<MainLiftSpec>,
    pub warmup: &'static [ExerciseDef; 5],
    pub accessories: &'static [ExerciseDef],
}

impl DayTemplate {
    pub fn main_lift(&self) -> Option<MainLift> {
        self.main.map(|m| m.lift)
    }
}

// ============================================================================
// Workout Types
// ============================================================================

/// A concrete exercise in a generated workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutExercise {
    pub id: String,
    pub name: String,
    pub block_type: BlockType,
    pub sets: u32,
    pub reps: RepScheme,
    pub target: Target,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl WorkoutExercise {
    /// Materialize a template exercise with the given set count
    pub fn from_def(def: &ExerciseDef, sets: u32) -> Self {
        Self {
            id: def.id.to_string(),
            name: def.name.to_string(),
            block_type: def.block,
            sets,
            reps: def.reps,
            target: def.target,
            weight: None,
        }
    }
}

/// Workout materialized for a specific training day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Workout {
    /// Absolute training day (1-based)
    pub day: u32,
    /// 12-day cycle the day falls in (1-based)
    pub cycle: u32,
    /// Day type 1-12
    pub day_index: u8,
    /// Display label, altered during deload
    pub day_type: String,
    pub exercises: Vec<WorkoutExercise>,
    pub main_lift: Option<MainLift>,
    pub is_deload: bool,
    pub note: Option<String>,
}

impl Workout {
    pub fn exercises_in(&self, block: BlockType) -> impl Iterator<Item = &WorkoutExercise> + '_ {
        self.exercises.iter().filter(move |e| e.block_type == block)
    }

    /// The main-lift entry, if this is a lift day
    pub fn main_exercise(&self) -> Option<&WorkoutExercise> {
        self.exercises_in(BlockType::Main).next()
    }

    pub fn total_sets(&self) -> u32 {
        self.exercises.iter().map(|e| e.sets).sum()
    }
}

// ============================================================================
// Performance and Session Types
// ============================================================================

/// Outcome of one performed set
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetResult {
    pub completed: bool,
}

/// What the athlete actually did for one exercise
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PerformedSet {
    pub exercise_id: String,
    pub sets: Vec<SetResult>,
}

impl PerformedSet {
    pub fn new(exercise_id: impl Into<String>, completed: &[bool]) -> Self {
        Self {
            exercise_id: exercise_id.into(),
            sets: completed
                .iter()
                .map(|c| SetResult { completed: *c })
                .collect(),
        }
    }

    /// `completed` finished sets followed by missed ones, `total` sets overall
    pub fn from_counts(exercise_id: impl Into<String>, completed: u32, total: u32) -> Self {
        let flags: Vec<bool> = (0..total).map(|i| i < completed).collect();
        Self::new(exercise_id, &flags)
    }

    pub fn completed_count(&self) -> usize {
        self.sets.iter().filter(|s| s.completed).count()
    }
}

/// A logged training day
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrainingSession {
    pub id: Uuid,
    pub day: u32,
    pub day_label: String,
    pub main_lift: Option<MainLift>,
    pub is_deload: bool,
    pub performed_at: DateTime<Utc>,
    pub sets_completed: u32,
    pub sets_total: u32,
    #[serde(default)]
    pub performed: Vec<PerformedSet>,
    #[serde(default)]
    pub unlocked: Option<LiftStateUpdate>,
}

impl TrainingSession {
    /// Build a log entry for a performed workout
    pub fn from_workout(
        workout: &Workout,
        performed: &[PerformedSet],
        unlocked: Option<LiftStateUpdate>,
        performed_at: DateTime<Utc>,
    ) -> Self {
        let sets_completed = performed.iter().map(|p| p.completed_count() as u32).sum();
        let sets_total = performed.iter().map(|p| p.sets.len() as u32).sum();

        Self {
            id: Uuid::new_v4(),
            day: workout.day,
            day_label: workout.day_type.clone(),
            main_lift: workout.main_lift,
            is_deload: workout.is_deload,
            performed_at,
            sets_completed,
            sets_total,
            performed: performed.to_vec(),
            unlocked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_lifts() -> LiftState {
        LiftState {
            bench: 60.0,
            squat: 80.0,
            deadlift: 100.0,
            ohp: 40.0,
            pullups_level: 5,
        }
    }

    #[test]
    fn test_apply_returns_new_state() {
        let lifts = sample_lifts();
        let update = LiftStateUpdate {
            squat: Some(82.5),
            ..Default::default()
        };

        let next = lifts.apply(&update);
        assert_eq!(next.squat, 82.5);
        assert_eq!(next.bench, 60.0);
        assert_eq!(next.pullups_level, 5);
        // Source is untouched
        assert_eq!(lifts.squat, 80.0);
    }

    #[test]
    fn test_validate_rejects_non_positive_weights() {
        let mut lifts = sample_lifts();
        assert!(lifts.validate().is_ok());

        lifts.ohp = 0.0;
        assert!(matches!(
            lifts.validate_lift(MainLift::Ohp),
            Err(Error::InvalidLiftState(_))
        ));

        lifts.ohp = f64::NAN;
        assert!(lifts.validate().is_err());
    }

    #[test]
    fn test_update_omits_absent_fields() {
        let mut update = LiftStateUpdate::default();
        assert!(update.is_empty());
        update.set(MainLift::Squat, 102.5);

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "squat": 102.5 }));
        assert!(!update.is_empty());
    }

    #[test]
    fn test_rep_scheme_display() {
        assert_eq!(RepScheme::Reps { count: 5 }.to_string(), "5");
        assert_eq!(RepScheme::Range { min: 8, max: 12 }.to_string(), "8-12");
        assert_eq!(RepScheme::Seconds { count: 45 }.to_string(), "45s");
        assert_eq!(RepScheme::Seconds { count: 600 }.to_string(), "10min");
        assert_eq!(RepScheme::Meters { count: 400 }.to_string(), "400m");
        assert_eq!(RepScheme::Meters { count: 5000 }.to_string(), "5km");
        assert_eq!(RepScheme::Max.to_string(), "max");
    }

    #[test]
    fn test_performed_set_from_counts() {
        let performed = PerformedSet::from_counts("bench", 3, 5);
        assert_eq!(performed.sets.len(), 5);
        assert_eq!(performed.completed_count(), 3);
        assert!(performed.sets[0].completed);
        assert!(!performed.sets[4].completed);
    }
}

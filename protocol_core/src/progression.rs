//! Progression logic for unlocking heavier working weights.
//!
//! This module implements the unlock gate evaluated after a workout:
//! - Deload workouts never progress
//! - Only main-lift days can unlock
//! - At least 90% of the performed main-lift sets must be completed
//! - Bench unlocks also raise the pullups level

use crate::{LiftState, LiftStateUpdate, MainLift, PerformedSet, Workout};

/// Default weight added to a lift on unlock
pub const DEFAULT_INCREMENT: f64 = 2.5;

/// Default fraction of sets that must be completed to unlock
pub const DEFAULT_COMPLETION_THRESHOLD: f64 = 0.9;

/// Tunable unlock parameters
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressionRules {
    pub increment: f64,
    pub completion_threshold: f64,
}

impl Default for ProgressionRules {
    fn default() -> Self {
        Self {
            increment: DEFAULT_INCREMENT,
            completion_threshold: DEFAULT_COMPLETION_THRESHOLD,
        }
    }
}

/// Fraction of performed sets that were completed
///
/// Returns None when no sets were recorded.
pub fn completion_ratio(performed: &PerformedSet) -> Option<f64> {
    if performed.sets.is_empty() {
        return None;
    }
    Some(performed.completed_count() as f64 / performed.sets.len() as f64)
}

/// Evaluate an unlock with the default rules
pub fn evaluate_unlock(
    performed: &[PerformedSet],
    lifts: &LiftState,
    workout: &Workout,
) -> Option<LiftStateUpdate> {
    evaluate_unlock_with(performed, lifts, workout, &ProgressionRules::default())
}

/// Decide whether performance on `workout` earns a progression
///
/// Returns only the fields that change: the incremented main lift and,
/// on bench days, the next pullups level.
pub fn evaluate_unlock_with(
    performed: &[PerformedSet],
    lifts: &LiftState,
    workout: &Workout,
    rules: &ProgressionRules,
) -> Option<LiftStateUpdate> {
    if workout.is_deload {
        tracing::debug!("Day {} is a deload day, no progression", workout.day);
        return None;
    }

    let Some(lift) = workout.main_lift else {
        tracing::debug!("Day {} has no main lift, no progression", workout.day);
        return None;
    };

    let Some(record) = performed.iter().find(|p| p.exercise_id == lift.key()) else {
        tracing::debug!("No performance recorded for {} on day {}", lift, workout.day);
        return None;
    };

    let ratio = completion_ratio(record)?;
    if ratio < rules.completion_threshold {
        tracing::info!(
            "{} completion {:.0}% below {:.0}% threshold, holding weight",
            lift,
            ratio * 100.0,
            rules.completion_threshold * 100.0
        );
        return None;
    }

    let mut update = LiftStateUpdate::default();
    update.set(lift, lifts.weight(lift) + rules.increment);

    if lift == MainLift::Bench {
        update.pullups_level = Some(lifts.pullups_level + 1);
    }

    tracing::info!("Unlocked progression on day {}: {}", workout.day, update);
    Some(update)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::generate_workout;

    fn test_lifts() -> LiftState {
        LiftState {
            bench: 60.0,
            squat: 80.0,
            deadlift: 100.0,
            ohp: 40.0,
            pullups_level: 5,
        }
    }

    #[test]
    fn test_full_bench_completion_unlocks_bench_and_pullups() {
        let lifts = test_lifts();
        let workout = generate_workout(1, &lifts).unwrap();
        let performed = vec![PerformedSet::from_counts("bench", 5, 5)];

        let update = evaluate_unlock(&performed, &lifts, &workout).unwrap();
        assert_eq!(
            update,
            LiftStateUpdate {
                bench: Some(62.5),
                pullups_level: Some(6),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_squat_unlock_leaves_pullups_out() {
        let lifts = test_lifts();
        let workout = generate_workout(2, &lifts).unwrap();
        let performed = vec![PerformedSet::from_counts("squat", 5, 5)];

        let update = evaluate_unlock(&performed, &lifts, &workout).unwrap();
        assert_eq!(update.squat, Some(82.5));
        assert_eq!(update.pullups_level, None);
        assert_eq!(update.bench, None);

        let json = serde_json::to_value(&update).unwrap();
        assert!(json.get("pullups_level").is_none());
    }

    #[test]
    fn test_deload_never_unlocks() {
        let lifts = test_lifts();
        let workout = generate_workout(37, &lifts).unwrap();
        let sets = workout.main_exercise().unwrap().sets;
        let performed = vec![PerformedSet::from_counts("bench", sets, sets)];

        assert!(evaluate_unlock(&performed, &lifts, &workout).is_none());
    }

    #[test]
    fn test_low_completion_holds() {
        let lifts = test_lifts();
        let workout = generate_workout(1, &lifts).unwrap();
        let performed = vec![PerformedSet::from_counts("bench", 2, 5)];

        assert!(evaluate_unlock(&performed, &lifts, &workout).is_none());
    }

    #[test]
    fn test_threshold_boundary() {
        let lifts = test_lifts();
        let workout = generate_workout(1, &lifts).unwrap();

        let nine_of_ten = vec![PerformedSet::from_counts("bench", 9, 10)];
        assert!(evaluate_unlock(&nine_of_ten, &lifts, &workout).is_some());

        let four_of_five = vec![PerformedSet::from_counts("bench", 4, 5)];
        assert!(evaluate_unlock(&four_of_five, &lifts, &workout).is_none());
    }

    #[test]
    fn test_non_lift_day_never_unlocks() {
        let lifts = test_lifts();
        let workout = generate_workout(3, &lifts).unwrap();
        let performed = vec![PerformedSet::from_counts("kettlebell_swings", 5, 5)];

        assert!(evaluate_unlock(&performed, &lifts, &workout).is_none());
    }

    #[test]
    fn test_missing_or_empty_record_holds() {
        let lifts = test_lifts();
        let workout = generate_workout(1, &lifts).unwrap();

        let unrelated = vec![PerformedSet::from_counts("pullups", 4, 4)];
        assert!(evaluate_unlock(&unrelated, &lifts, &workout).is_none());

        let empty = vec![PerformedSet::new("bench", &[])];
        assert!(evaluate_unlock(&empty, &lifts, &workout).is_none());
        assert_eq!(completion_ratio(&empty[0]), None);
    }

    #[test]
    fn test_custom_rules() {
        let lifts = test_lifts();
        let workout = generate_workout(5, &lifts).unwrap();
        let rules = ProgressionRules {
            increment: 5.0,
            completion_threshold: 0.6,
        };
        let performed = vec![PerformedSet::from_counts("deadlift", 2, 3)];

        let update = evaluate_unlock_with(&performed, &lifts, &workout, &rules).unwrap();
        assert_eq!(update.deadlift, Some(105.0));
        assert_eq!(update.pullups_level, None);
    }

    #[test]
    fn test_input_state_untouched() {
        let lifts = test_lifts();
        let workout = generate_workout(1, &lifts).unwrap();
        let performed = vec![PerformedSet::from_counts("bench", 5, 5)];

        let _ = evaluate_unlock(&performed, &lifts, &workout);
        assert_eq!(lifts, test_lifts());
    }
}

//! Workout generation for the 180-day protocol.
//!
//! Day counters map onto 12 recurring day types; every 4th 12-day cycle is
//! a deload. Generation picks the template for the day, reads the main-lift
//! weight from the lift state and derates set counts during deload.

use crate::templates::{
    day_label, template_for, DELOAD_RECOVERY_LABEL, DELOAD_RECOVERY_TEMPLATE, RECOVERY_DAY_TYPE,
};
use crate::{BlockType, DayTemplate, Error, LiftState, Result, Workout, WorkoutExercise};

/// Days in one cycle of day types
pub const DAYS_PER_CYCLE: u32 = 12;

/// Every n-th cycle is a deload
pub const DELOAD_EVERY: u32 = 4;

/// Length of the full protocol (15 cycles)
pub const PROTOCOL_DAYS: u32 = 180;

/// Day type (1-12) for an absolute training day
pub fn day_type(day: u32) -> Result<u8> {
    if day == 0 {
        return Err(Error::InvalidDay(day));
    }
    Ok(((day - 1) % DAYS_PER_CYCLE + 1) as u8)
}

/// 1-based cycle index for an absolute training day
pub fn cycle_index(day: u32) -> Result<u32> {
    if day == 0 {
        return Err(Error::InvalidDay(day));
    }
    Ok((day - 1) / DAYS_PER_CYCLE + 1)
}

/// Whether a cycle is a deload cycle (4, 8, 12, ...)
pub fn is_deload(cycle: u32) -> bool {
    cycle != 0 && cycle % DELOAD_EVERY == 0
}

/// Deload set count: 60% of normal rounded down, never below one set
pub fn deload_sets(normal: u32) -> u32 {
    (normal * 3 / 5).max(1)
}

/// Template for a day type, with the day-12 recovery swap during deload
fn select_template(day_index: u8, deload: bool) -> Result<&'static DayTemplate> {
    if deload && day_index == RECOVERY_DAY_TYPE {
        return Ok(&DELOAD_RECOVERY_TEMPLATE);
    }
    template_for(day_index)
}

/// Generate the workout for an absolute training day
///
/// The main-lift weight is read from `lifts` as-is; a non-positive or
/// non-finite weight for the lift the template needs is rejected.
pub fn generate_workout(day: u32, lifts: &LiftState) -> Result<Workout> {
    let day_index = day_type(day)?;
    let cycle = cycle_index(day)?;
    let deload = is_deload(cycle);

    let template = select_template(day_index, deload)?;
    let recovery_swap = deload && day_index == RECOVERY_DAY_TYPE;

    let label = if recovery_swap {
        DELOAD_RECOVERY_LABEL.to_string()
    } else if deload {
        format!("{} (Deload)", day_label(day_index)?)
    } else {
        day_label(day_index)?.to_string()
    };

    let mut exercises =
        Vec::with_capacity(template.warmup.len() + template.accessories.len() + 1);

    exercises.extend(
        template
            .warmup
            .iter()
            .map(|def| WorkoutExercise::from_def(def, def.sets)),
    );

    if let Some(main) = template.main {
        let weight = lifts.validate_lift(main.lift)?;
        let sets = if deload {
            deload_sets(main.sets)
        } else {
            main.sets
        };

        exercises.push(WorkoutExercise {
            id: main.lift.key().to_string(),
            name: main.lift.display_name().to_string(),
            block_type: BlockType::Main,
            sets,
            reps: main.reps,
            target: main.lift.target(),
            weight: Some(weight),
        });
    }

    // The recovery template is already low volume and is used as written
    let derate = deload && !recovery_swap;
    exercises.extend(template.accessories.iter().map(|def| {
        let sets = if derate { deload_sets(def.sets) } else { def.sets };
        WorkoutExercise::from_def(def, sets)
    }));

    let note = if recovery_swap {
        Some(
            "DELOAD cycle: recovery session replaces the endurance day. Move easy, no progression this cycle."
                .to_string(),
        )
    } else if deload {
        Some(
            "DELOAD cycle: sets reduced to about 60%, keep the same loads. No progression this cycle."
                .to_string(),
        )
    } else {
        None
    };

    tracing::debug!(
        "Generated day {} (type {}, cycle {}, deload: {}): {}",
        day,
        day_index,
        cycle,
        deload,
        label
    );

    Ok(Workout {
        day,
        cycle,
        day_index,
        day_type: label,
        exercises,
        main_lift: template.main_lift(),
        is_deload: deload,
        note,
    })
}

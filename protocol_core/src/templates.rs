//! Static template table for the 12 recurring day types.
//!
//! Templates are plain data: a shared five-entry warmup, an optional main
//! lift and a list of individually named accessories per day type. The
//! deload variant of day 12 is its own template rather than a transform.

use crate::types::*;
use crate::{Error, Result};
use std::collections::HashSet;

/// Day type whose deload variant swaps content instead of reducing sets
pub const RECOVERY_DAY_TYPE: u8 = 12;

/// Label used for the day-12 deload variant
pub const DELOAD_RECOVERY_LABEL: &str = "Deload Recovery: Mobility & Easy Walk";

const fn warmup(
    id: &'static str,
    name: &'static str,
    reps: RepScheme,
    target: Target,
) -> ExerciseDef {
    ExerciseDef {
        id,
        name,
        block: BlockType::Warmup,
        sets: 1,
        reps,
        target,
    }
}

const fn accessory(
    id: &'static str,
    name: &'static str,
    sets: u32,
    reps: RepScheme,
    target: Target,
) -> ExerciseDef {
    ExerciseDef {
        id,
        name,
        block: BlockType::Accessory,
        sets,
        reps,
        target,
    }
}

const fn reps(count: u32) -> RepScheme {
    RepScheme::Reps { count }
}

const fn range(min: u32, max: u32) -> RepScheme {
    RepScheme::Range { min, max }
}

const fn seconds(count: u32) -> RepScheme {
    RepScheme::Seconds { count }
}

const fn meters(count: u32) -> RepScheme {
    RepScheme::Meters { count }
}

const fn main_lift(lift: MainLift, sets: u32, count: u32) -> Option<MainLiftSpec> {
    Some(MainLiftSpec {
        lift,
        sets,
        reps: RepScheme::Reps { count },
    })
}

/// Warmup shared by every day type
pub static WARMUP: [ExerciseDef; 5] = [
    warmup("jumping_jacks", "Jumping Jacks", seconds(60), Target::FullBody),
    warmup("arm_circles", "Arm Circles", reps(20), Target::Shoulders),
    warmup("bodyweight_squats", "Bodyweight Squats", reps(15), Target::Quads),
    warmup("walking_lunges", "Walking Lunges", reps(10), Target::Glutes),
    warmup("inchworms", "Inchworms", reps(8), Target::Mobility),
];

/// Human-readable name per day type, index 0 is day type 1
pub static DAY_LABELS: [&str; 12] = [
    "Bench Day: Heavy Press",
    "Squat Day: Heavy Legs",
    "Metcon Day: Conditioning Circuit",
    "Shoulders & Arms Day: Hypertrophy",
    "Deadlift Day: Posterior Chain",
    "Ruck & Core Day: Loaded March",
    "Overhead Press Day: Strict Press",
    "Back Day: Pulling Volume",
    "Bench Volume Day: Press Volume",
    "Squat Volume Day: Leg Volume",
    "Interval Day: Speed Work",
    "Endurance Day: Long Effort",
];

/// The 12 day templates, index 0 is day type 1
pub static DAY_TEMPLATES: [DayTemplate; 12] = [
    DayTemplate {
        day_type: 1,
        name: "Bench Day",
        main: main_lift(MainLift::Bench, 5, 5),
        warmup: &WARMUP,
        accessories: &[
            accessory("incline_db_press", "Incline Dumbbell Press", 3, range(8, 12), Target::Chest),
            accessory("weighted_dips", "Weighted Dips", 3, range(6, 10), Target::Triceps),
            accessory("pullups", "Pull-ups", 4, RepScheme::Max, Target::Back),
            accessory("face_pulls", "Face Pulls", 3, reps(15), Target::Shoulders),
        ],
    },
    DayTemplate {
        day_type: 2,
        name: "Squat Day",
        main: main_lift(MainLift::Squat, 5, 5),
        warmup: &WARMUP,
        accessories: &[
            accessory(
                "romanian_deadlift",
                "Romanian Deadlift",
                3,
                range(8, 10),
                Target::Hamstrings,
            ),
            accessory(
                "bulgarian_split_squat",
                "Bulgarian Split Squat",
                3,
                range(8, 10),
                Target::Quads,
            ),
            accessory("hanging_leg_raises", "Hanging Leg Raises", 3, range(10, 15), Target::Core),
            accessory(
                "standing_calf_raises",
                "Standing Calf Raises",
                4,
                range(12, 15),
                Target::Calves,
            ),
        ],
    },
    DayTemplate {
        day_type: 3,
        name: "Metcon Day",
        main: None,
        warmup: &WARMUP,
        accessories: &[
            accessory("kettlebell_swings", "Kettlebell Swings", 5, reps(20), Target::Conditioning),
            accessory("burpees", "Burpees", 5, reps(15), Target::Conditioning),
            accessory("rowing_sprint", "Rowing Sprint", 5, meters(250), Target::Conditioning),
            accessory("farmers_carry", "Farmer's Carry", 4, meters(40), Target::FullBody),
            accessory("plank", "Plank", 3, seconds(60), Target::Core),
        ],
    },
    DayTemplate {
        day_type: 4,
        name: "Shoulders & Arms Day",
        main: None,
        warmup: &WARMUP,
        accessories: &[
            accessory(
                "db_shoulder_press",
                "Dumbbell Shoulder Press",
                4,
                range(8, 12),
                Target::Shoulders,
            ),
            accessory("lateral_raises", "Lateral Raises", 3, range(12, 15), Target::Shoulders),
            accessory("barbell_curl", "Barbell Curl", 3, range(8, 12), Target::Biceps),
            accessory(
                "triceps_rope_pushdown",
                "Triceps Rope Pushdown",
                3,
                range(10, 15),
                Target::Triceps,
            ),
        ],
    },
    DayTemplate {
        day_type: 5,
        name: "Deadlift Day",
        main: main_lift(MainLift::Deadlift, 3, 5),
        warmup: &WARMUP,
        accessories: &[
            accessory("barbell_row", "Barbell Row", 4, range(6, 10), Target::Back),
            accessory("good_mornings", "Good Mornings", 3, range(8, 10), Target::Hamstrings),
            accessory("back_extensions", "Back Extensions", 3, range(12, 15), Target::Glutes),
            accessory("ab_wheel_rollout", "Ab Wheel Rollout", 3, range(8, 12), Target::Core),
        ],
    },
    DayTemplate {
        day_type: 6,
        name: "Ruck & Core Day",
        main: None,
        warmup: &WARMUP,
        accessories: &[
            accessory("ruck_march", "Ruck March", 1, meters(5000), Target::Conditioning),
            accessory("weighted_situps", "Weighted Sit-ups", 3, range(15, 20), Target::Core),
            accessory("side_plank", "Side Plank", 3, seconds(45), Target::Core),
            accessory("bird_dog", "Bird Dog", 3, reps(10), Target::Core),
        ],
    },
    DayTemplate {
        day_type: 7,
        name: "Overhead Press Day",
        main: main_lift(MainLift::Ohp, 5, 5),
        warmup: &WARMUP,
        accessories: &[
            accessory(
                "close_grip_bench",
                "Close-Grip Bench Press",
                3,
                range(8, 10),
                Target::Triceps,
            ),
            accessory("chinups", "Chin-ups", 4, RepScheme::Max, Target::Back),
            accessory("rear_delt_flyes", "Rear Delt Flyes", 3, range(12, 15), Target::Shoulders),
            accessory("hammer_curls", "Hammer Curls", 3, range(10, 12), Target::Biceps),
        ],
    },
    DayTemplate {
        day_type: 8,
        name: "Back Day",
        main: None,
        warmup: &WARMUP,
        accessories: &[
            accessory("pendlay_row", "Pendlay Row", 4, range(6, 8), Target::Back),
            accessory("lat_pulldown", "Lat Pulldown", 3, range(10, 12), Target::Back),
            accessory(
                "single_arm_db_row",
                "Single-Arm Dumbbell Row",
                3,
                range(8, 12),
                Target::Back,
            ),
            accessory("barbell_shrugs", "Barbell Shrugs", 3, range(12, 15), Target::Back),
            accessory("dead_hang", "Dead Hang", 3, seconds(45), Target::Back),
        ],
    },
    DayTemplate {
        day_type: 9,
        name: "Bench Volume Day",
        main: main_lift(MainLift::Bench, 4, 8),
        warmup: &WARMUP,
        accessories: &[
            accessory("db_flyes", "Dumbbell Flyes", 3, range(10, 12), Target::Chest),
            accessory("pushups", "Push-ups", 3, RepScheme::Max, Target::Chest),
            accessory("skull_crushers", "Skull Crushers", 3, range(10, 12), Target::Triceps),
            accessory("inverted_rows", "Inverted Rows", 3, range(10, 15), Target::Back),
        ],
    },
    DayTemplate {
        day_type: 10,
        name: "Squat Volume Day",
        main: main_lift(MainLift::Squat, 4, 8),
        warmup: &WARMUP,
        accessories: &[
            accessory("leg_press", "Leg Press", 3, range(10, 12), Target::Quads),
            accessory("glute_bridge", "Barbell Glute Bridge", 3, range(12, 15), Target::Glutes),
            accessory("nordic_curl", "Nordic Hamstring Curl", 3, range(5, 8), Target::Hamstrings),
            accessory("pallof_press", "Pallof Press", 3, range(10, 12), Target::Core),
        ],
    },
    DayTemplate {
        day_type: 11,
        name: "Interval Day",
        main: None,
        warmup: &WARMUP,
        accessories: &[
            accessory("run_400m_repeats", "400m Run Repeats", 6, meters(400), Target::Conditioning),
            accessory("box_jumps", "Box Jumps", 4, range(8, 10), Target::Quads),
            accessory("battle_ropes", "Battle Ropes", 4, seconds(30), Target::Conditioning),
            accessory("mountain_climbers", "Mountain Climbers", 3, seconds(45), Target::Core),
        ],
    },
    DayTemplate {
        day_type: 12,
        name: "Endurance Day",
        main: None,
        warmup: &WARMUP,
        accessories: &[
            accessory("long_run", "Long Run", 1, meters(8000), Target::Conditioning),
            accessory("pushups_volume", "Push-ups", 5, reps(20), Target::Chest),
            accessory("air_squats", "Air Squats", 5, reps(30), Target::Quads),
            accessory("situps", "Sit-ups", 5, reps(25), Target::Core),
        ],
    },
];

/// Day-12 replacement used during deload cycles
pub static DELOAD_RECOVERY_TEMPLATE: DayTemplate = DayTemplate {
    day_type: RECOVERY_DAY_TYPE,
    name: "Deload Recovery",
    main: None,
    warmup: &WARMUP,
    accessories: &[
        accessory("easy_walk", "Easy Walk", 1, meters(3000), Target::Conditioning),
        accessory("foam_rolling", "Foam Rolling", 1, seconds(600), Target::Mobility),
        accessory("hip_flexor_stretch", "Hip Flexor Stretch", 2, seconds(60), Target::Mobility),
        accessory("thoracic_rotations", "Thoracic Spine Rotations", 2, reps(10), Target::Mobility),
        accessory("dead_bug", "Dead Bug", 2, reps(10), Target::Core),
    ],
};

/// Look up the template for a day type (1-12)
pub fn template_for(day_type: u8) -> Result<&'static DayTemplate> {
    day_type
        .checked_sub(1)
        .and_then(|idx| DAY_TEMPLATES.get(idx as usize))
        .ok_or_else(|| Error::TemplateValidation(format!("no template for day type {}", day_type)))
}

/// Look up the display label for a day type (1-12)
pub fn day_label(day_type: u8) -> Result<&'static str> {
    day_type
        .checked_sub(1)
        .and_then(|idx| DAY_LABELS.get(idx as usize))
        .copied()
        .ok_or_else(|| Error::TemplateValidation(format!("no label for day type {}", day_type)))
}

/// Names that lump several body parts or movements into one entry
fn is_generic_name(name: &str) -> bool {
    if name.contains('+') || name.contains('&') || name.contains('/') {
        return true;
    }
    let lower = name.to_lowercase();
    if lower.ends_with(" work") || lower.ends_with(" accessories") || lower == "accessories" {
        return true;
    }
    Target::ALL
        .iter()
        .any(|t| t.label().eq_ignore_ascii_case(name.trim()))
}

fn validate_template(template: &DayTemplate, errors: &mut Vec<String>) {
    let day = template.day_type;

    if template.name.trim().is_empty() {
        errors.push(format!("Day type {} has an empty name", day));
    }

    if template.warmup.iter().any(|w| w.block != BlockType::Warmup) {
        errors.push(format!("Day type {}: warmup entry not tagged as warmup", day));
    }

    if let Some(main) = template.main {
        if main.sets < 2 {
            errors.push(format!(
                "Day type {}: main lift needs at least 2 sets so deload can reduce them",
                day
            ));
        }
    }

    if template.accessories.is_empty() {
        errors.push(format!("Day type {} has no accessories", day));
    }

    let mut seen = HashSet::new();
    if let Some(lift) = template.main_lift() {
        seen.insert(lift.key());
    }

    for def in template.warmup.iter().chain(template.accessories.iter()) {
        if def.id.is_empty() || def.name.trim().is_empty() {
            errors.push(format!("Day type {}: exercise with empty id or name", day));
        }
        if def.sets == 0 {
            errors.push(format!("Day type {}: '{}' prescribes zero sets", day, def.id));
        }
        if MainLift::ALL.iter().any(|l| l.key() == def.id) {
            errors.push(format!(
                "Day type {}: '{}' shadows a main-lift exercise id",
                day, def.id
            ));
        }
        if !seen.insert(def.id) {
            errors.push(format!("Day type {}: duplicate exercise id '{}'", day, def.id));
        }
        if let RepScheme::Range { min, max } = def.reps {
            if min > max {
                errors.push(format!(
                    "Day type {}: '{}' rep range {}-{} is inverted",
                    day, def.id, min, max
                ));
            }
        }
    }

    for def in template.accessories {
        if def.block != BlockType::Accessory {
            errors.push(format!("Day type {}: '{}' not tagged as accessory", day, def.id));
        }
        if is_generic_name(def.name) {
            errors.push(format!(
                "Day type {}: accessory '{}' is a generic placeholder, list exercises individually",
                day, def.name
            ));
        }
    }
}

/// Validate the template table for consistency and completeness
///
/// Returns a list of validation errors, or empty Vec if valid.
pub fn validate_templates() -> Vec<String> {
    let mut errors = Vec::new();

    if DAY_TEMPLATES.len() != DAY_LABELS.len() {
        errors.push("Template and label tables differ in length".to_string());
    }

    for (idx, template) in DAY_TEMPLATES.iter().enumerate() {
        let expected = idx as u8 + 1;
        if template.day_type != expected {
            errors.push(format!(
                "Template at position {} declares day type {}",
                expected, template.day_type
            ));
        }

        match DAY_LABELS.get(idx) {
            Some(label) if label.starts_with(template.name) => {}
            Some(label) => errors.push(format!(
                "Day type {}: label '{}' does not match template '{}'",
                expected, label, template.name
            )),
            None => errors.push(format!("Day type {} has no label", expected)),
        }

        validate_template(template, &mut errors);
    }

    validate_template(&DELOAD_RECOVERY_TEMPLATE, &mut errors);
    if DELOAD_RECOVERY_TEMPLATE.main.is_some() {
        errors.push("Deload recovery template must not carry a main lift".to_string());
    }

    errors
}

use clap::{Parser, Subcommand};
use protocol_core::csv_rollup::{cleanup_processed_wals, wal_to_csv_and_archive};
use protocol_core::engine::DAYS_PER_CYCLE;
use protocol_core::*;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "milprot")]
#[command(about = "180-day Military Protocol workout planner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Show debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the protocol with current working weights
    Init {
        #[arg(long)]
        bench: f64,

        #[arg(long)]
        squat: f64,

        #[arg(long)]
        deadlift: f64,

        /// Overhead press working weight
        #[arg(long)]
        ohp: f64,

        #[arg(long, default_value_t = 0)]
        pullups_level: u32,

        /// Overwrite an existing protocol
        #[arg(long)]
        force: bool,
    },

    /// Show the workout for the current day (default)
    Today {
        /// Preview a specific day instead of the current one
        #[arg(long)]
        day: Option<u32>,
    },

    /// Record the current day's workout and advance
    Log {
        /// Mark every set as completed without prompting
        #[arg(long)]
        auto_complete: bool,

        /// Completed main-lift sets; other exercises count as completed
        #[arg(long)]
        main_sets_completed: Option<u32>,
    },

    /// Show lifts and protocol progress
    Status,

    /// Show recent training sessions
    History {
        /// How many days back to look
        #[arg(long, default_value_t = 30)]
        days: i64,
    },

    /// Roll up the training log to CSV
    Rollup {
        /// Clean up processed WAL files after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

struct Paths {
    state: PathBuf,
    wal_dir: PathBuf,
    wal: PathBuf,
    csv: PathBuf,
}

impl Paths {
    fn new(data_dir: &Path) -> Self {
        let wal_dir = data_dir.join("wal");
        Self {
            state: data_dir.join("state.json"),
            wal: wal_dir.join("training.wal"),
            wal_dir,
            csv: data_dir.join("training.csv"),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    protocol_core::logging::init_with_level(if cli.verbose { "debug" } else { "warn" });

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);

    let errors = validate_templates();
    if !errors.is_empty() {
        eprintln!("Template validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::TemplateValidation("Invalid template table".into()));
    }

    let paths = Paths::new(&data_dir);

    match cli.command {
        Some(Commands::Init {
            bench,
            squat,
            deadlift,
            ohp,
            pullups_level,
            force,
        }) => {
            let lifts = LiftState {
                bench,
                squat,
                deadlift,
                ohp,
                pullups_level,
            };
            cmd_init(&paths, lifts, force, &config)
        }
        Some(Commands::Today { day }) => cmd_today(&paths, day, &config),
        Some(Commands::Log {
            auto_complete,
            main_sets_completed,
        }) => cmd_log(&paths, auto_complete, main_sets_completed, &config),
        Some(Commands::Status) => cmd_status(&paths, &config),
        Some(Commands::History { days }) => cmd_history(&paths, days),
        Some(Commands::Rollup { cleanup }) => cmd_rollup(&paths, cleanup),
        None => cmd_today(&paths, None, &config),
    }
}

fn require_state(paths: &Paths) -> Result<ProtocolState> {
    ProtocolState::load(&paths.state)?.ok_or_else(|| {
        Error::State("No protocol started yet. Run `milprot init` first.".into())
    })
}

fn cmd_init(paths: &Paths, lifts: LiftState, force: bool, config: &Config) -> Result<()> {
    if !force && ProtocolState::load(&paths.state)?.is_some() {
        return Err(Error::State(
            "A protocol is already in progress. Use --force to start over.".into(),
        ));
    }

    let state = ProtocolState::new(lifts)?;

    // Day numbers restart, so archive the previous run's log first
    if paths.wal.exists() {
        let archived = wal_to_csv_and_archive(&paths.wal, &paths.csv)?;
        tracing::info!("Archived {} sessions from the previous protocol", archived);
    }
    state.save(&paths.state)?;

    println!("✓ Protocol started at day 1 of {}", PROTOCOL_DAYS);
    print_lifts(&state.lifts, &config.display.unit);
    Ok(())
}

fn cmd_today(paths: &Paths, day: Option<u32>, config: &Config) -> Result<()> {
    let state = require_state(paths)?;

    let workout = match day {
        Some(day) => generate_workout(day, &state.lifts)?,
        None if state.is_complete() => {
            println!("✓ Protocol complete! All {} days done.", PROTOCOL_DAYS);
            return Ok(());
        }
        None => state.todays_workout()?,
    };

    display_workout(&workout, &config.display.unit);
    Ok(())
}

fn cmd_log(
    paths: &Paths,
    auto_complete: bool,
    main_sets_completed: Option<u32>,
    config: &Config,
) -> Result<()> {
    let mut state = require_state(paths)?;

    if state.is_complete() {
        println!("✓ Protocol complete! Nothing left to log.");
        return Ok(());
    }

    let workout = state.todays_workout()?;
    display_workout(&workout, &config.display.unit);

    let performed = collect_performance(&workout, auto_complete, main_sets_completed)?;
    let unlocked = state.complete_day(&workout, &performed, &config.progression.rules())?;

    // State first: a failed append loses a log line, never replays a day
    state.save(&paths.state)?;

    let session =
        TrainingSession::from_workout(&workout, &performed, unlocked.clone(), chrono::Utc::now());
    let mut sink = JsonlSink::new(&paths.wal);
    sink.append(&session)?;

    println!(
        "\n✓ Day {} logged ({}/{} sets)",
        workout.day, session.sets_completed, session.sets_total
    );

    match unlocked {
        Some(update) => {
            println!("  ▲ Unlocked: {}", update);
        }
        None if workout.main_lift.is_some() && !workout.is_deload => {
            println!(
                "  Weight held, complete {:.0}% of main sets to progress.",
                config.progression.completion_threshold * 100.0
            );
        }
        None => {}
    }

    if state.is_complete() {
        println!("✓ Protocol complete! All {} days done.", PROTOCOL_DAYS);
    } else {
        println!("  Next: day {}", state.current_day);
    }

    Ok(())
}

fn cmd_status(paths: &Paths, config: &Config) -> Result<()> {
    let state = require_state(paths)?;
    let done = state.current_day.saturating_sub(1).min(PROTOCOL_DAYS);

    println!("Military Protocol");
    println!(
        "  Progress: {}/{} days ({:.0}%)",
        done,
        PROTOCOL_DAYS,
        done as f64 * 100.0 / PROTOCOL_DAYS as f64
    );

    if state.is_complete() {
        println!("  ✓ Complete");
    } else {
        let cycle = cycle_index(state.current_day)?;
        println!(
            "  Current: day {} (type {}, cycle {} of {}){}",
            state.current_day,
            day_type(state.current_day)?,
            cycle,
            PROTOCOL_DAYS / DAYS_PER_CYCLE,
            if is_deload(cycle) { " DELOAD" } else { "" }
        );
    }

    println!("  Started: {}", state.started_at.format("%Y-%m-%d"));
    println!();
    print_lifts(&state.lifts, &config.display.unit);
    Ok(())
}

fn cmd_history(paths: &Paths, days: i64) -> Result<()> {
    let sessions = load_recent_sessions(&paths.wal, &paths.csv, days)?;

    if sessions.is_empty() {
        println!("No sessions in the last {} days.", days);
        return Ok(());
    }

    for session in &sessions {
        let unlocked = session
            .unlocked
            .as_ref()
            .map(|u| format!("  ▲ {}", u))
            .unwrap_or_default();
        println!(
            "{}  day {:>3}  {:<40} {:>3}/{:<3} sets{}",
            session.performed_at.format("%Y-%m-%d"),
            session.day,
            session.day_label,
            session.sets_completed,
            session.sets_total,
            unlocked
        );
    }

    let summary = summarize(&sessions);
    println!();
    println!(
        "{} workouts ({} deload), {} unlocks",
        summary.workouts, summary.deload_workouts, summary.unlocks
    );
    if let Some(rate) = summary.completion_rate() {
        println!("Set completion: {:.0}%", rate * 100.0);
    }

    Ok(())
}

fn cmd_rollup(paths: &Paths, cleanup: bool) -> Result<()> {
    if !paths.wal.exists() {
        println!("No WAL file found - nothing to roll up.");
        return Ok(());
    }

    let count = wal_to_csv_and_archive(&paths.wal, &paths.csv)?;

    println!("✓ Rolled up {} sessions to CSV", count);
    println!("  CSV: {}", paths.csv.display());

    if cleanup {
        let cleaned = cleanup_processed_wals(&paths.wal_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed WAL files", cleaned);
        }
    }

    Ok(())
}

fn print_lifts(lifts: &LiftState, unit: &str) {
    for lift in MainLift::ALL {
        println!(
            "  {:<24} {} {}",
            lift.display_name(),
            lifts.weight(lift),
            unit
        );
    }
    println!("  {:<24} {}", "Pull-up level", lifts.pullups_level);
}

fn display_workout(workout: &Workout, unit: &str) {
    println!("\n╭─────────────────────────────────────────╮");
    println!(
        "│  DAY {} · CYCLE {}{}",
        workout.day,
        workout.cycle,
        if workout.is_deload { " · DELOAD" } else { "" }
    );
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}", workout.day_type);

    for (block, heading) in [
        (BlockType::Warmup, "Warmup"),
        (BlockType::Main, "Main lift"),
        (BlockType::Accessory, "Accessories"),
    ] {
        let mut exercises = workout.exercises_in(block).peekable();
        if exercises.peek().is_none() {
            continue;
        }

        println!();
        println!("  {}", heading);
        for exercise in exercises {
            let load = exercise
                .weight
                .map(|w| format!(" @ {} {}", w, unit))
                .unwrap_or_default();
            println!(
                "  → {:<28} {} x {}{}",
                exercise.name, exercise.sets, exercise.reps, load
            );
        }
    }

    if let Some(ref note) = workout.note {
        println!();
        println!("  ⚠ {}", note);
    }

    println!();
}

fn collect_performance(
    workout: &Workout,
    auto_complete: bool,
    main_sets_completed: Option<u32>,
) -> Result<Vec<PerformedSet>> {
    let interactive = !auto_complete && main_sets_completed.is_none();
    if interactive {
        println!("─────────────────────────────────────────");
        println!("Enter completed sets per exercise (Enter = all)");
    }

    let mut performed = Vec::with_capacity(workout.exercises.len());
    for exercise in &workout.exercises {
        let completed = match (exercise.block_type, main_sets_completed) {
            (BlockType::Main, Some(n)) => n.min(exercise.sets),
            _ if !interactive => exercise.sets,
            _ => prompt_sets_completed(exercise)?,
        };
        performed.push(PerformedSet::from_counts(
            exercise.id.clone(),
            completed,
            exercise.sets,
        ));
    }

    Ok(performed)
}

fn prompt_sets_completed(exercise: &WorkoutExercise) -> Result<u32> {
    loop {
        print!("  {} [{}/{}]> ", exercise.name, exercise.sets, exercise.sets);
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Err(Error::Other(format!(
                "input closed before sets for {} were recorded; nothing logged",
                exercise.name
            )));
        }

        let input = input.trim();
        if input.is_empty() {
            return Ok(exercise.sets);
        }

        match input.parse::<u32>() {
            Ok(n) if n <= exercise.sets => return Ok(n),
            _ => println!("  Enter a number from 0 to {}", exercise.sets),
        }
    }
}

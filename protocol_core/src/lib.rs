#![forbid(unsafe_code)]

//! Core domain model and business logic for the Military Protocol.
//!
//! This crate provides:
//! - Domain types (lifts, templates, workouts, performance records)
//! - The static 12-day template table
//! - Workout generation and progression (unlock) evaluation
//! - Persistence (protocol state, training log WAL, CSV archive)
//! - History and progress summaries

pub mod types;
pub mod error;
pub mod templates;
pub mod config;
pub mod logging;
pub mod engine;
pub mod progression;
pub mod state;
pub mod wal;
pub mod csv_rollup;
pub mod history;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use templates::{day_label, template_for, validate_templates, DAY_LABELS, DAY_TEMPLATES};
pub use config::Config;
pub use engine::{cycle_index, day_type, deload_sets, generate_workout, is_deload, PROTOCOL_DAYS};
pub use progression::{completion_ratio, evaluate_unlock, evaluate_unlock_with, ProgressionRules};
pub use state::ProtocolState;
pub use wal::{JsonlSink, SessionSink};
pub use history::{load_recent_sessions, summarize, ProgressSummary};

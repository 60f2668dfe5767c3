//! Orchestration for the Pitchside league simulator.
//!
//! The scheduler lays out each season's double round-robin calendar;
//! the orchestrator owns the only write path into the world and drives
//! `advance` one matchday at a time. Determinism contract: for a given
//! `(seed, log prefix)`, `advance` appends identical event sequences
//! across runs, regardless of worker completion order.

pub mod error;
pub mod orchestrator;
pub mod scheduler;

pub use error::CoreError;
pub use orchestrator::{genesis_date, AdvanceStatus, AdvanceSummary, Orchestrator};
pub use scheduler::{classify_importance, schedule_season};

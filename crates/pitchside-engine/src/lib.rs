//! Deterministic match-simulation engine for Pitchside.
//!
//! The engine is a pure function from `(team snapshots, derived seed)`
//! to an ordered event sequence ending in exactly one `MatchEnded`. It
//! performs no I/O, touches no shared state, and draws every random
//! number from a stream derived from `(world seed, match id)` -- so a
//! matchday's matches can simulate in parallel and still produce the
//! same history on every run.
//!
//! # Modules
//!
//! - [`rng`] -- derived deterministic random streams
//! - [`constants`] -- the tunable numbers of the match model
//! - [`snapshot`] -- immutable engine inputs
//! - [`lineup`] -- starting-eleven selection
//! - [`sim`] -- the minute-tick simulator
//! - [`ratings`] -- post-match player ratings
//! - [`commentary`] -- human-readable event lines

pub mod commentary;
pub mod constants;
pub mod error;
pub mod lineup;
pub mod ratings;
pub mod rng;
pub mod sim;
pub mod snapshot;

pub use error::EngineError;
pub use lineup::{select_starting_eleven, Lineup};
pub use rng::DerivedRng;
pub use sim::{simulate, SimulatedMatch};
pub use snapshot::{MatchInput, PlayerSnapshot, TeamSnapshot};

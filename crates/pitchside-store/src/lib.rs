//! Durable event log for the Pitchside league simulator.
//!
//! The log is the source of truth for the world's history: every state
//! change is appended here, and the in-memory world is rebuilt by
//! replay. This crate owns the SQLite persistence, the record codec,
//! and snapshot storage.

pub mod codec;
pub mod error;
pub mod event_store;
pub mod snapshot_store;

pub use error::StoreError;
pub use event_store::{EventStore, SequencedEvent};
pub use snapshot_store::Snapshot;

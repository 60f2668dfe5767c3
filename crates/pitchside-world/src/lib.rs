//! World aggregate for the Pitchside league simulator.
//!
//! Owns the complete in-memory world, the single mutating pathway
//! `World::apply(event)`, deterministic genesis, and the read-only
//! projections the query layer serves.

pub mod error;
pub mod genesis;
pub mod projections;
pub mod world;

pub use error::WorldError;
pub use genesis::create_world;
pub use world::World;

//! CONQUEST Core - Rules engine for the territory-conquest game
//!
//! This crate provides the authoritative game semantics:
//! - Static territory catalog (adjacency + continent groupings)
//! - Session state (territories, players, phase, reinforcement pools)
//! - Deterministic, seed-driven initial assignment
//! - Pure action validation and execution
//! - Turn/phase state machine
//!
//! Everything here is synchronous and I/O-free; the server crate owns
//! sessions, persistence and broadcast.

pub mod catalog;
pub mod state;
pub mod setup;
pub mod action;
pub mod turns;

// Re-exports for convenient access
pub use catalog::{Continent, TerritoryDef, TERRITORIES, TERRITORY_COUNT, territory, adjacent, continent_of, territories_in};
pub use state::{Player, Phase, TerritoryState, SessionState};
pub use setup::{initialize, SetupError, STARTING_ARMIES};
pub use action::{Action, ActionKind, Rejection, ChangeDescription, TerritoryChange, PhaseTransition, apply};

//! Deterministic initial assignment
//!
//! The same player list and seed always produce the same layout, no matter
//! which process computes it. Clients that know the seed can recompute the
//! starting position instead of being sent the full territory list.

use crate::catalog;
use crate::state::{Phase, Player, SessionState, TerritoryState};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Starting army totals for 2..=6 players
pub const STARTING_ARMIES: [u32; 5] = [40, 35, 30, 25, 20];

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetupError {
    #[error("need between {MIN_PLAYERS} and {MAX_PLAYERS} players, got {0}")]
    PlayerCount(usize),

    #[error("duplicate player name: {0}")]
    DuplicateName(String),

    #[error("player name must not be empty")]
    EmptyName,
}

/// Build the starting state for `players` from `seed`.
///
/// A seeded Fisher-Yates shuffle of the catalog id list drives round-robin
/// assignment in player order; every owned territory starts with 1 army and
/// the rest of each player's allotment goes to their placement pool.
pub fn initialize(players: Vec<Player>, seed: u64) -> Result<SessionState, SetupError> {
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&players.len()) {
        return Err(SetupError::PlayerCount(players.len()));
    }
    for (i, p) in players.iter().enumerate() {
        if p.name.is_empty() {
            return Err(SetupError::EmptyName);
        }
        if players[..i].iter().any(|q| q.name == p.name) {
            return Err(SetupError::DuplicateName(p.name.clone()));
        }
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut ids: Vec<&'static str> = catalog::territory_ids().collect();
    ids.shuffle(&mut rng);

    let mut territories: FxHashMap<String, TerritoryState> = FxHashMap::default();
    for (i, id) in ids.iter().enumerate() {
        let owner = &players[i % players.len()];
        territories.insert(
            id.to_string(),
            TerritoryState { owner: Some(owner.name.clone()), armies: 1 },
        );
    }

    let total = STARTING_ARMIES[players.len() - MIN_PLAYERS];
    let pools: FxHashMap<String, u32> = players
        .iter()
        .map(|p| {
            let owned = territories
                .values()
                .filter(|t| t.owner.as_deref() == Some(p.name.as_str()))
                .count() as u32;
            (p.name.clone(), total - owned)
        })
        .collect();

    Ok(SessionState {
        players,
        territories,
        phase: Phase::Placement,
        current_player: 0,
        turn: 1,
        pools,
        seed,
    })
}

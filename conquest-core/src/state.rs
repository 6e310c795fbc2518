//! Session state: the canonical representation of one game

use crate::catalog::{self, Continent};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A player in rotation order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub color: String,
}

/// Turn phase
///
/// Initial territory assignment happens atomically inside the initializer;
/// the first observable phase is `Placement`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Placement,
    Reinforce,
    Attack,
    Fortify,
}

/// One territory's mutable state
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritoryState {
    pub owner: Option<String>,
    pub armies: u32,
}

/// Canonical state of one session (clone to mutate)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Ordered player list; order defines turn rotation
    pub players: Vec<Player>,

    /// Territory id -> current owner and army count
    pub territories: FxHashMap<String, TerritoryState>,

    /// Current phase
    pub phase: Phase,

    /// Index into `players` of the active player
    pub current_player: usize,

    /// Turn number; increments once per full rotation
    pub turn: u32,

    /// Per-player remaining reinforcement pool
    pub pools: FxHashMap<String, u32>,

    /// Seed the initial layout was generated from
    pub seed: u64,
}

impl SessionState {
    /// Name of the active player
    pub fn current_player_name(&self) -> &str {
        &self.players[self.current_player].name
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    /// Remaining reinforcement pool for a player
    pub fn pool(&self, name: &str) -> u32 {
        self.pools.get(name).copied().unwrap_or(0)
    }

    /// Number of territories a player owns
    pub fn owned_count(&self, name: &str) -> usize {
        self.territories
            .values()
            .filter(|t| t.owner.as_deref() == Some(name))
            .count()
    }

    /// Whether a player owns every territory of a continent
    pub fn controls_continent(&self, name: &str, continent: Continent) -> bool {
        catalog::territories_in(continent).all(|def| {
            self.territories
                .get(def.id)
                .map(|t| t.owner.as_deref() == Some(name))
                .unwrap_or(false)
        })
    }

    /// Armies owed when entering the reinforce phase:
    /// `max(3, owned / 3)` plus continent bonuses.
    pub fn reinforcement_due(&self, name: &str) -> u32 {
        let territorial = (self.owned_count(name) as u32 / 3).max(3);
        let bonus: u32 = Continent::ALL
            .iter()
            .filter(|&&c| self.controls_continent(name, c))
            .map(|c| c.bonus())
            .sum();
        territorial + bonus
    }

    /// Sum of all placed armies plus all pending pools. Conserved across
    /// every action except reinforcement grants and combat losses.
    pub fn total_armies(&self) -> u64 {
        let placed: u64 = self.territories.values().map(|t| u64::from(t.armies)).sum();
        let pooled: u64 = self.pools.values().map(|&p| u64::from(p)).sum();
        placed + pooled
    }

    /// Whether `from` and `to` are connected through a contiguous chain of
    /// territories owned by `name` (fortify rule). Both endpoints must be
    /// owned by the player.
    pub fn connected_through_owned(&self, name: &str, from: &str, to: &str) -> bool {
        let owned = |id: &str| {
            self.territories
                .get(id)
                .map(|t| t.owner.as_deref() == Some(name))
                .unwrap_or(false)
        };
        if !owned(from) || !owned(to) {
            return false;
        }
        if from == to {
            return true;
        }

        let mut visited: Vec<&str> = vec![from];
        let mut queue: VecDeque<&str> = VecDeque::from([from]);
        while let Some(id) = queue.pop_front() {
            let Some(def) = catalog::territory(id) else { continue };
            for &n in def.neighbors {
                if n == to && owned(n) {
                    return true;
                }
                if owned(n) && !visited.contains(&n) {
                    visited.push(n);
                    queue.push_back(n);
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::initialize;

    pub(crate) fn two_players() -> Vec<Player> {
        vec![
            Player { name: "alice".into(), color: "red".into() },
            Player { name: "bob".into(), color: "blue".into() },
        ]
    }

    #[test]
    fn test_reinforcement_floor() {
        let state = initialize(two_players(), 7).unwrap();
        // 21 territories each -> 21/3 = 7, above the floor of 3
        assert_eq!(state.reinforcement_due("alice"), 7);
    }

    #[test]
    fn test_continent_bonus_counts() {
        let mut state = initialize(two_players(), 7).unwrap();
        // Hand all of Australia to alice
        for def in catalog::territories_in(Continent::Australia) {
            state.territories.get_mut(def.id).unwrap().owner = Some("alice".into());
        }
        assert!(state.controls_continent("alice", Continent::Australia));
        let due = state.reinforcement_due("alice");
        let territorial = (state.owned_count("alice") as u32 / 3).max(3);
        assert_eq!(due, territorial + 2);
    }

    #[test]
    fn test_connected_through_owned() {
        let mut state = initialize(two_players(), 7).unwrap();
        for t in state.territories.values_mut() {
            t.owner = Some("alice".into());
        }
        assert!(state.connected_through_owned("alice", "alaska", "eastern_australia"));

        // Cut the chain: everything except alaska belongs to bob
        for (id, t) in state.territories.iter_mut() {
            if id != "alaska" {
                t.owner = Some("bob".into());
            }
        }
        assert!(!state.connected_through_owned("alice", "alaska", "alberta"));
        assert!(state.connected_through_owned("alice", "alaska", "alaska"));
    }
}

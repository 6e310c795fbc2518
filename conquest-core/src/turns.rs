//! Turn and phase progression
//!
//! Placement runs one action at a time in rotation until every pool is
//! empty; the regular cycle is reinforce -> attack -> fortify per player,
//! with the turn counter incrementing when rotation wraps.

use crate::action::{PhaseTransition, Rejection};
use crate::state::{Phase, SessionState};

/// Index of the next player in rotation who still owns at least one
/// territory. Players conquered out of the game are skipped.
pub fn next_in_rotation(state: &SessionState) -> usize {
    let len = state.players.len();
    for step in 1..=len {
        let idx = (state.current_player + step) % len;
        if state.owned_count(&state.players[idx].name) > 0 {
            return idx;
        }
    }
    state.current_player
}

/// Index of the next player (strictly after the current one) with armies
/// left to place, if any. Placement rotation skips exhausted pools.
pub fn next_with_pool(state: &SessionState) -> Option<usize> {
    let len = state.players.len();
    (1..=len)
        .map(|step| (state.current_player + step) % len)
        .find(|&idx| state.pool(&state.players[idx].name) > 0)
}

/// Add the reinforce-phase grant to a player's pool.
pub fn grant_reinforcements(state: &mut SessionState, player_idx: usize) {
    let name = state.players[player_idx].name.clone();
    let due = state.reinforcement_due(&name);
    *state.pools.entry(name).or_insert(0) += due;
}

/// Rotate placement after a deploy, or finish placement when every pool is
/// empty. Returns the transition into the regular cycle when it happens.
pub fn rotate_placement(state: &mut SessionState) -> Option<PhaseTransition> {
    if let Some(next) = next_with_pool(state) {
        state.current_player = next;
        return None;
    }

    // Every pool is exhausted: the first player opens the regular cycle.
    let from = state.phase;
    state.phase = Phase::Reinforce;
    state.current_player = 0;
    grant_reinforcements(state, 0);
    Some(PhaseTransition {
        from,
        to: Phase::Reinforce,
        current_player: state.current_player_name().to_string(),
    })
}

/// Advance out of the current phase, enforcing completion requirements.
pub fn advance(state: &mut SessionState) -> Result<PhaseTransition, Rejection> {
    let from = state.phase;
    match from {
        // Placement completes through deployment, never by request.
        Phase::Placement => Err(Rejection::InvalidPhaseTransition { from }),

        Phase::Reinforce => {
            let pool = state.pool(state.current_player_name());
            if pool > 0 {
                return Err(Rejection::PhaseRequirementUnmet(format!(
                    "reinforcement pool must be fully deployed ({pool} remaining)"
                )));
            }
            state.phase = Phase::Attack;
            Ok(PhaseTransition {
                from,
                to: Phase::Attack,
                current_player: state.current_player_name().to_string(),
            })
        }

        Phase::Attack => {
            if let Some(id) = unoccupied_conquest(state) {
                return Err(Rejection::PhaseRequirementUnmet(format!(
                    "conquered territory {id} must be occupied before advancing"
                )));
            }
            state.phase = Phase::Fortify;
            Ok(PhaseTransition {
                from,
                to: Phase::Fortify,
                current_player: state.current_player_name().to_string(),
            })
        }

        Phase::Fortify => {
            let next = next_in_rotation(state);
            if next <= state.current_player {
                state.turn += 1;
            }
            state.current_player = next;
            state.phase = Phase::Reinforce;
            grant_reinforcements(state, next);
            Ok(PhaseTransition {
                from,
                to: Phase::Reinforce,
                current_player: state.current_player_name().to_string(),
            })
        }
    }
}

/// An owned territory sitting at 0 armies (conquered but not yet occupied).
fn unoccupied_conquest(state: &SessionState) -> Option<&str> {
    state
        .territories
        .iter()
        .find(|(_, t)| t.owner.is_some() && t.armies == 0)
        .map(|(id, _)| id.as_str())
}

//! Wire protocol: typed inbound requests and outbound events
//!
//! Everything crossing the transport boundary is one of these two enums,
//! JSON-encoded with a `type` tag and camelCase field names.

use conquest_core::{Action, ChangeDescription, Phase, Rejection, SessionState};
use serde::{Deserialize, Serialize};

/// Client -> server
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientRequest {
    /// Create the session and run the deterministic initializer with a
    /// server-generated seed.
    #[serde(rename_all = "camelCase")]
    Initialize {
        session_code: String,
        players: Vec<String>,
        colors: Vec<String>,
    },
    /// (Re)declare which players this connection acts for; rebuilds the
    /// client binding and subscribes the connection to the session.
    #[serde(rename_all = "camelCase")]
    Announce {
        session_code: String,
        players: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    Deploy {
        session_code: String,
        player_name: String,
        territory_id: String,
        army_count: u32,
    },
    #[serde(rename_all = "camelCase")]
    Attack {
        session_code: String,
        player_name: String,
        source_territory_id: String,
        target_territory_id: String,
        attacker_armies_after: u32,
        defender_armies_after: u32,
    },
    #[serde(rename_all = "camelCase")]
    Fortify {
        session_code: String,
        player_name: String,
        source_territory_id: String,
        target_territory_id: String,
        army_count: u32,
    },
    #[serde(rename_all = "camelCase")]
    AdvancePhase {
        session_code: String,
        player_name: String,
    },
    /// Full-state resend to this connection only; idempotent and
    /// side-effect-free.
    #[serde(rename_all = "camelCase")]
    Resync { session_code: String },
}

impl ClientRequest {
    pub fn session_code(&self) -> &str {
        match self {
            ClientRequest::Initialize { session_code, .. }
            | ClientRequest::Announce { session_code, .. }
            | ClientRequest::Deploy { session_code, .. }
            | ClientRequest::Attack { session_code, .. }
            | ClientRequest::Fortify { session_code, .. }
            | ClientRequest::AdvancePhase { session_code, .. }
            | ClientRequest::Resync { session_code } => session_code,
        }
    }

    /// Actor and game action for the mutating requests.
    pub fn to_action(&self) -> Option<(&str, Action)> {
        match self {
            ClientRequest::Deploy { player_name, territory_id, army_count, .. } => Some((
                player_name,
                Action::Deploy { territory: territory_id.clone(), armies: *army_count },
            )),
            ClientRequest::Attack {
                player_name,
                source_territory_id,
                target_territory_id,
                attacker_armies_after,
                defender_armies_after,
                ..
            } => Some((
                player_name,
                Action::Attack {
                    from: source_territory_id.clone(),
                    to: target_territory_id.clone(),
                    attacker_after: *attacker_armies_after,
                    defender_after: *defender_armies_after,
                },
            )),
            ClientRequest::Fortify {
                player_name,
                source_territory_id,
                target_territory_id,
                army_count,
                ..
            } => Some((
                player_name,
                Action::Fortify {
                    from: source_territory_id.clone(),
                    to: target_territory_id.clone(),
                    armies: *army_count,
                },
            )),
            ClientRequest::AdvancePhase { player_name, .. } => {
                Some((player_name, Action::AdvancePhase))
            }
            _ => None,
        }
    }
}

/// Server -> client(s)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    #[serde(rename_all = "camelCase")]
    Initialized { state: SessionState, seed: u64 },
    #[serde(rename_all = "camelCase")]
    StateUpdate {
        state: SessionState,
        change: ChangeDescription,
        seq: u64,
    },
    #[serde(rename_all = "camelCase")]
    PhaseChanged {
        old_phase: Phase,
        new_phase: Phase,
        current_player: String,
    },
    /// Sent only to the submitting connection, never broadcast.
    #[serde(rename_all = "camelCase")]
    ActionRejected { reason_code: String, message: String },
    #[serde(rename_all = "camelCase")]
    Resync { state: SessionState },
}

impl ServerEvent {
    pub fn rejected(rejection: &Rejection) -> Self {
        ServerEvent::ActionRejected {
            reason_code: rejection.reason_code().to_string(),
            message: rejection.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let json = r#"{
            "type": "deploy",
            "sessionCode": "game-1",
            "playerName": "alice",
            "territoryId": "alaska",
            "armyCount": 3
        }"#;
        let req: ClientRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.session_code(), "game-1");
        let (player, action) = req.to_action().unwrap();
        assert_eq!(player, "alice");
        assert_eq!(action, Action::Deploy { territory: "alaska".into(), armies: 3 });
    }

    #[test]
    fn test_attack_wire_format() {
        let json = r#"{
            "type": "attack",
            "sessionCode": "game-1",
            "playerName": "alice",
            "sourceTerritoryId": "alaska",
            "targetTerritoryId": "kamchatka",
            "attackerArmiesAfter": 4,
            "defenderArmiesAfter": 0
        }"#;
        let req: ClientRequest = serde_json::from_str(json).unwrap();
        let (_, action) = req.to_action().unwrap();
        assert_eq!(
            action,
            Action::Attack {
                from: "alaska".into(),
                to: "kamchatka".into(),
                attacker_after: 4,
                defender_after: 0
            }
        );
    }

    #[test]
    fn test_rejection_event() {
        let event = ServerEvent::rejected(&Rejection::NotYourTurn("bob".into()));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "actionRejected");
        assert_eq!(json["reasonCode"], "NOT_YOUR_TURN");
    }

    #[test]
    fn test_announce_has_no_action() {
        let req = ClientRequest::Announce {
            session_code: "game-1".into(),
            players: vec!["alice".into()],
        };
        assert!(req.to_action().is_none());
    }
}

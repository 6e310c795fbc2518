//! Session registry and the action pipeline
//!
//! The registry owns every live session and serializes all writes to one
//! session behind its mutex: actions arrive from independently-connected
//! clients but are applied strictly one at a time, which is what keeps N
//! clients convergent. Different sessions proceed in parallel.
//!
//! Pipeline for a mutating request: resolve session -> authorize the
//! connection -> pure apply -> snapshot -> commit -> broadcast. A rejection
//! at any step goes only to the submitting connection.

use crate::broadcast::{BroadcastGateway, ConnectionId};
use crate::persistence::{now_ms, PersistencePolicy, SessionSnapshot, SnapshotStore, StoreError};
use crate::protocol::{ClientRequest, ServerEvent};
use conquest_core::{apply, initialize, Player, Rejection, SessionState};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

/// One live session: canonical state plus connection authorizations
pub struct Session {
    pub code: String,
    pub state: SessionState,
    /// Connection -> player names it may act for; rebuilt on every announce
    pub bindings: HashMap<ConnectionId, HashSet<String>>,
    /// Monotonic accepted-action counter
    pub seq: u64,
}

impl Session {
    fn authorized(&self, conn: ConnectionId, player: &str) -> bool {
        self.bindings
            .get(&conn)
            .map(|players| players.contains(player))
            .unwrap_or(false)
    }
}

pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
    store: Arc<dyn SnapshotStore>,
    policy: PersistencePolicy,
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn SnapshotStore>, policy: PersistencePolicy) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            store,
            policy,
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().unwrap().len()
    }

    /// Look up a session, restoring it from the snapshot store if it is not
    /// resident (process restart, eviction).
    pub fn resolve(&self, code: &str) -> Result<Option<Arc<Mutex<Session>>>, StoreError> {
        if let Some(session) = self.sessions.read().unwrap().get(code) {
            return Ok(Some(session.clone()));
        }

        let Some(snapshot) = self.store.get(code)? else {
            return Ok(None);
        };
        tracing::info!("restoring session {code} from snapshot (seq {})", snapshot.seq);
        let restored = Arc::new(Mutex::new(Session {
            code: code.to_string(),
            state: snapshot.state,
            bindings: HashMap::new(),
            seq: snapshot.seq,
        }));
        let mut sessions = self.sessions.write().unwrap();
        Ok(Some(sessions.entry(code.to_string()).or_insert(restored).clone()))
    }

    /// Drop the in-memory instance but keep the durable snapshot.
    pub fn evict(&self, code: &str) {
        self.sessions.write().unwrap().remove(code);
    }

    /// Tear a session down everywhere.
    pub fn remove(&self, code: &str) -> Result<(), StoreError> {
        self.sessions.write().unwrap().remove(code);
        self.store.remove(code)
    }

    /// Forget a closed connection's bindings in every session.
    pub fn unbind_connection(&self, conn: ConnectionId) {
        let sessions: Vec<Arc<Mutex<Session>>> =
            self.sessions.read().unwrap().values().cloned().collect();
        for session in sessions {
            session.lock().unwrap().bindings.remove(&conn);
        }
    }

    /// Entry point for everything a connection sends.
    pub fn dispatch(&self, gateway: &BroadcastGateway, conn: ConnectionId, request: ClientRequest) {
        match request {
            ClientRequest::Initialize { session_code, players, colors } => {
                self.handle_initialize(gateway, conn, session_code, players, colors)
            }
            ClientRequest::Announce { session_code, players } => {
                self.handle_announce(gateway, conn, session_code, players)
            }
            ClientRequest::Resync { session_code } => {
                self.handle_resync(gateway, conn, session_code)
            }
            other => self.handle_action(gateway, conn, other),
        }
    }

    fn handle_initialize(
        &self,
        gateway: &BroadcastGateway,
        conn: ConnectionId,
        code: String,
        players: Vec<String>,
        colors: Vec<String>,
    ) {
        match self.resolve(&code) {
            // Re-initialize never re-rolls a running game: hand the current
            // layout back to the requester.
            Ok(Some(session)) => {
                let session = session.lock().unwrap();
                gateway.subscribe(&code, conn);
                gateway.send(
                    conn,
                    &ServerEvent::Initialized {
                        state: session.state.clone(),
                        seed: session.state.seed,
                    },
                );
                return;
            }
            Ok(None) => {}
            Err(e) => {
                self.reject(gateway, conn, &Rejection::PersistenceUnavailable(e.to_string()));
                return;
            }
        }

        let roster: Vec<Player> = players
            .iter()
            .enumerate()
            .map(|(i, name)| Player {
                name: name.clone(),
                color: colors.get(i).cloned().unwrap_or_else(|| "gray".to_string()),
            })
            .collect();

        let seed = now_ms();
        let state = match initialize(roster, seed) {
            Ok(state) => state,
            Err(e) => {
                gateway.send(
                    conn,
                    &ServerEvent::ActionRejected {
                        reason_code: "SETUP_INVALID".to_string(),
                        message: e.to_string(),
                    },
                );
                return;
            }
        };

        let snapshot = SessionSnapshot { state: state.clone(), seq: 0, saved_at_ms: now_ms() };
        if let Err(e) = self.store.put(&code, &snapshot) {
            match self.policy {
                PersistencePolicy::FailAction => {
                    self.reject(gateway, conn, &Rejection::PersistenceUnavailable(e.to_string()));
                    return;
                }
                PersistencePolicy::ContinueInMemory => {
                    tracing::warn!("snapshot of new session {code} failed, continuing in memory: {e}");
                }
            }
        }

        tracing::info!("session {code} initialized with seed {seed}");
        let event = ServerEvent::Initialized { state: state.clone(), seed };
        let session = Arc::new(Mutex::new(Session {
            code: code.clone(),
            state,
            bindings: HashMap::new(),
            seq: 0,
        }));
        self.sessions.write().unwrap().insert(code.clone(), session);

        gateway.subscribe(&code, conn);
        gateway.broadcast(&code, &event);
    }

    fn handle_announce(
        &self,
        gateway: &BroadcastGateway,
        conn: ConnectionId,
        code: String,
        players: Vec<String>,
    ) {
        let session = match self.resolve(&code) {
            Ok(Some(session)) => session,
            Ok(None) => {
                self.reject(gateway, conn, &Rejection::SessionNotFound(code));
                return;
            }
            Err(e) => {
                self.reject(gateway, conn, &Rejection::PersistenceUnavailable(e.to_string()));
                return;
            }
        };

        let mut session = session.lock().unwrap();
        session.bindings.insert(conn, players.into_iter().collect());
        gateway.subscribe(&code, conn);
        gateway.send(conn, &ServerEvent::Resync { state: session.state.clone() });
    }

    fn handle_resync(&self, gateway: &BroadcastGateway, conn: ConnectionId, code: String) {
        match self.resolve(&code) {
            Ok(Some(session)) => {
                let session = session.lock().unwrap();
                gateway.send(conn, &ServerEvent::Resync { state: session.state.clone() });
            }
            Ok(None) => self.reject(gateway, conn, &Rejection::SessionNotFound(code)),
            Err(e) => {
                self.reject(gateway, conn, &Rejection::PersistenceUnavailable(e.to_string()))
            }
        }
    }

    fn handle_action(&self, gateway: &BroadcastGateway, conn: ConnectionId, request: ClientRequest) {
        let code = request.session_code().to_string();
        let Some((player, action)) = request.to_action() else {
            return;
        };

        let session = match self.resolve(&code) {
            Ok(Some(session)) => session,
            Ok(None) => {
                self.reject(gateway, conn, &Rejection::SessionNotFound(code));
                return;
            }
            Err(e) => {
                self.reject(gateway, conn, &Rejection::PersistenceUnavailable(e.to_string()));
                return;
            }
        };

        // Single writer per session from here on.
        let mut session = session.lock().unwrap();

        if !session.authorized(conn, player) {
            self.reject(gateway, conn, &Rejection::UnauthorizedClient(player.to_string()));
            return;
        }

        let (next_state, change) = match apply(&session.state, player, &action) {
            Ok(result) => result,
            Err(rejection) => {
                tracing::debug!(
                    "session {code}: rejected {:?} by {player}: {}",
                    action.kind(),
                    rejection.reason_code()
                );
                self.reject(gateway, conn, &rejection);
                return;
            }
        };

        // Durable before visible: clients never see an update the store
        // does not hold, modulo the explicit in-memory policy.
        let seq = session.seq + 1;
        let snapshot = SessionSnapshot {
            state: next_state.clone(),
            seq,
            saved_at_ms: now_ms(),
        };
        if let Err(e) = self.store.put(&code, &snapshot) {
            match self.policy {
                PersistencePolicy::FailAction => {
                    self.reject(gateway, conn, &Rejection::PersistenceUnavailable(e.to_string()));
                    return;
                }
                PersistencePolicy::ContinueInMemory => {
                    tracing::warn!("snapshot of {code} seq {seq} failed, continuing in memory: {e}");
                }
            }
        }

        session.state = next_state;
        session.seq = seq;
        tracing::debug!(
            "session {}: {:?} by {player} accepted (seq {seq})",
            session.code,
            action.kind()
        );

        gateway.broadcast(
            &code,
            &ServerEvent::StateUpdate {
                state: session.state.clone(),
                change: change.clone(),
                seq,
            },
        );
        if let Some(transition) = &change.transition {
            gateway.broadcast(
                &code,
                &ServerEvent::PhaseChanged {
                    old_phase: transition.from,
                    new_phase: transition.to,
                    current_player: transition.current_player.clone(),
                },
            );
        }
    }

    fn reject(&self, gateway: &BroadcastGateway, conn: ConnectionId, rejection: &Rejection) {
        gateway.send(conn, &ServerEvent::rejected(rejection));
    }
}

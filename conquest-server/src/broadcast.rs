//! Broadcast gateway
//!
//! In-process pub/sub between the dispatch pipeline and connected clients.
//! Each connection registers an unbounded channel; the WebSocket layer
//! forwards the receiving end to the socket. Events for a session go to
//! exactly the connections subscribed to that session.

use crate::protocol::ServerEvent;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use tokio::sync::mpsc;

/// Opaque per-connection identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

#[derive(Default)]
pub struct BroadcastGateway {
    next_id: AtomicU64,
    connections: RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>>,
    /// Session code -> subscribed connections
    subscribers: RwLock<HashMap<String, HashSet<ConnectionId>>>,
}

impl BroadcastGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection; the caller owns the receiving end.
    pub fn register(&self) -> (ConnectionId, mpsc::UnboundedReceiver<ServerEvent>) {
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections.write().unwrap().insert(id, tx);
        (id, rx)
    }

    /// Drop a connection and every subscription it held.
    pub fn unregister(&self, conn: ConnectionId) {
        self.connections.write().unwrap().remove(&conn);
        let mut subscribers = self.subscribers.write().unwrap();
        for set in subscribers.values_mut() {
            set.remove(&conn);
        }
        subscribers.retain(|_, set| !set.is_empty());
    }

    /// Subscribe a connection to one session's broadcasts.
    pub fn subscribe(&self, code: &str, conn: ConnectionId) {
        self.subscribers
            .write()
            .unwrap()
            .entry(code.to_string())
            .or_default()
            .insert(conn);
    }

    /// Deliver an event to a single connection.
    pub fn send(&self, conn: ConnectionId, event: &ServerEvent) {
        if let Some(tx) = self.connections.read().unwrap().get(&conn) {
            if tx.send(event.clone()).is_err() {
                tracing::debug!("dropping event for closed connection {conn:?}");
            }
        }
    }

    /// Deliver an event to every connection subscribed to `code`.
    pub fn broadcast(&self, code: &str, event: &ServerEvent) {
        let targets: Vec<ConnectionId> = self
            .subscribers
            .read()
            .unwrap()
            .get(code)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        for conn in targets {
            self.send(conn, event);
        }
    }

    pub fn subscriber_count(&self, code: &str) -> usize {
        self.subscribers
            .read()
            .unwrap()
            .get(code)
            .map(HashSet::len)
            .unwrap_or(0)
    }
}

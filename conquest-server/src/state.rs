//! Server-wide shared state

use crate::broadcast::BroadcastGateway;
use crate::persistence::{PersistencePolicy, SnapshotStore};
use crate::registry::SessionRegistry;
use std::sync::Arc;

pub struct ServerState {
    pub registry: SessionRegistry,
    pub gateway: BroadcastGateway,
}

impl ServerState {
    pub fn new(store: Arc<dyn SnapshotStore>, policy: PersistencePolicy) -> Self {
        Self {
            registry: SessionRegistry::new(store, policy),
            gateway: BroadcastGateway::new(),
        }
    }
}

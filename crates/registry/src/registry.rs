//! Registry mapping datapath ids to switches, with a connection reverse map.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use sluice_bus::{Connection, ConnectionId};
use sluice_openflow::DatapathId;
use tracing::debug;

use crate::{Switch, SwitchEvent, SwitchEventEmitter};

/// Concurrency-safe switch registry.
///
/// Handlers get `Arc<Switch>` once, then mutate through per-switch locks
/// with no global contention. Lock order is switches before the reverse
/// map, everywhere.
#[derive(Debug)]
pub struct SwitchRegistry {
    switches: RwLock<HashMap<DatapathId, Arc<Switch>>>,
    by_connection: RwLock<HashMap<ConnectionId, DatapathId>>,
    events: SwitchEventEmitter,
}

impl Default for SwitchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SwitchRegistry {
    pub fn new() -> Self {
        Self {
            switches: RwLock::new(HashMap::new()),
            by_connection: RwLock::new(HashMap::new()),
            events: SwitchEventEmitter::default(),
        }
    }

    /// Get or create the switch for a datapath id, binding (or rebinding)
    /// its connection. Atomic with respect to concurrent handshakes from
    /// the same datapath id.
    pub fn get_or_create(&self, datapath_id: DatapathId, connection: &Connection) -> Arc<Switch> {
        // Fast path: known switch on the same connection.
        {
            let switches = self.switches.read();
            if let Some(switch) = switches.get(&datapath_id) {
                if switch.connection().id() == connection.id() {
                    return Arc::clone(switch);
                }
            }
        }

        // Slow path: write lock, double-checked.
        let mut switches = self.switches.write();
        let mut by_connection = self.by_connection.write();

        if let Some(switch) = switches.get(&datapath_id) {
            let old = switch.connection();
            if old.id() != connection.id() {
                by_connection.remove(&old.id());
                switch.rebind_connection(connection.clone());
                by_connection.insert(connection.id(), datapath_id);
                debug!(%datapath_id, old = %old.id(), new = %connection.id(), "switch reconnected");
                self.events.connection_rebound(datapath_id, connection.id());
            }
            return Arc::clone(switch);
        }

        let switch = Arc::new(Switch::new(
            datapath_id,
            connection.clone(),
            self.events.clone(),
        ));
        switches.insert(datapath_id, Arc::clone(&switch));
        by_connection.insert(connection.id(), datapath_id);

        debug!(%datapath_id, connection = %connection.id(), "new switch registered");
        self.events.discovered(datapath_id);

        switch
    }

    pub fn get(&self, datapath_id: &DatapathId) -> Option<Arc<Switch>> {
        self.switches.read().get(datapath_id).map(Arc::clone)
    }

    /// Resolve the switch currently bound to a connection, if any.
    pub fn by_connection(&self, connection: &Connection) -> Option<Arc<Switch>> {
        let datapath_id = *self.by_connection.read().get(&connection.id())?;
        self.get(&datapath_id)
    }

    /// Snapshot of every registered switch, for the stats poller.
    pub fn switches(&self) -> Vec<Arc<Switch>> {
        self.switches.read().values().map(Arc::clone).collect()
    }

    pub fn len(&self) -> usize {
        self.switches.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<SwitchEvent> {
        self.events.subscribe()
    }

    pub fn events(&self) -> &SwitchEventEmitter {
        &self.events
    }
}

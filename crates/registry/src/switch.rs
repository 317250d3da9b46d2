//! Per-switch shared state.

use std::collections::HashMap;

use parking_lot::RwLock;
use sluice_bus::Connection;
use sluice_openflow::{DatapathId, SwitchFeatures};

use crate::{FlowEntry, Interface, SwitchEventEmitter};

/// One remote device.
///
/// Shared across the features-reply and stats-reply handlers; every mutable
/// field sits behind its own lock so an interface upsert and a flow-list
/// replacement never interleave into a torn read.
#[derive(Debug)]
pub struct Switch {
    datapath_id: DatapathId,
    connection: RwLock<Connection>,
    interfaces: RwLock<HashMap<u16, Interface>>,
    features: RwLock<Option<SwitchFeatures>>,
    flows: RwLock<Vec<FlowEntry>>,
    events: SwitchEventEmitter,
}

impl Switch {
    pub(crate) fn new(
        datapath_id: DatapathId,
        connection: Connection,
        events: SwitchEventEmitter,
    ) -> Self {
        Self {
            datapath_id,
            connection: RwLock::new(connection),
            interfaces: RwLock::new(HashMap::new()),
            features: RwLock::new(None),
            flows: RwLock::new(Vec::new()),
            events,
        }
    }

    pub fn datapath_id(&self) -> DatapathId {
        self.datapath_id
    }

    /// The current transport link to this switch.
    pub fn connection(&self) -> Connection {
        self.connection.read().clone()
    }

    pub(crate) fn rebind_connection(&self, connection: Connection) {
        *self.connection.write() = connection;
    }

    /// Insert or update a port record, keyed by its port number.
    pub fn update_interface(&self, interface: Interface) {
        self.interfaces
            .write()
            .insert(interface.port_number, interface);
    }

    pub fn interface(&self, port_number: u16) -> Option<Interface> {
        self.interfaces.read().get(&port_number).cloned()
    }

    pub fn interfaces(&self) -> Vec<Interface> {
        self.interfaces.read().values().cloned().collect()
    }

    pub fn interface_count(&self) -> usize {
        self.interfaces.read().len()
    }

    /// Store the last-known capability descriptor.
    pub fn update_features(&self, features: SwitchFeatures) {
        let ports = features.ports.len();
        *self.features.write() = Some(features);
        self.events.features_updated(self.datapath_id, ports);
    }

    pub fn features(&self) -> Option<SwitchFeatures> {
        self.features.read().clone()
    }

    /// Replace the flow list wholesale: readers see either the previous
    /// scrape or the new one, never a mix.
    pub fn replace_flows(&self, flows: Vec<FlowEntry>) {
        let count = flows.len();
        *self.flows.write() = flows;
        self.events.flows_updated(self.datapath_id, count);
    }

    pub fn flows(&self) -> Vec<FlowEntry> {
        self.flows.read().clone()
    }
}

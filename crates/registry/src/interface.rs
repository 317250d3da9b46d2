//! Switch port records.

use std::sync::{Arc, Weak};

use sluice_openflow::{MacAddr, PhyPort};

use crate::Switch;

/// One port of a switch.
///
/// Upserted into the owning switch keyed by `port_number`; re-delivery of
/// the same port number updates the record in place.
#[derive(Debug, Clone)]
pub struct Interface {
    pub name: String,
    pub hw_addr: MacAddr,
    pub port_number: u16,
    /// Port state bitmask as reported by the switch.
    pub state: u32,
    /// Current feature bitmap as reported by the switch.
    pub features: u32,
    switch: Weak<Switch>,
}

impl Interface {
    /// Build a port record from its wire description and owning switch.
    pub fn from_port(port: &PhyPort, switch: &Arc<Switch>) -> Self {
        Self {
            name: port.name.clone(),
            hw_addr: port.hw_addr,
            port_number: port.port_no,
            state: port.state,
            features: port.curr,
            switch: Arc::downgrade(switch),
        }
    }

    /// The owning switch, if it is still registered.
    pub fn switch(&self) -> Option<Arc<Switch>> {
        self.switch.upgrade()
    }
}

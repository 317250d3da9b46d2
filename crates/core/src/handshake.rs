//! Connection handshake: hello exchange, version gate, features exchange.
//!
//! The flow per connection is hello out → hello in (version gate) →
//! features request → features reply, at which point the switch is
//! registered and the channel is usable. State lives in the event flow
//! itself; there is no per-connection state cell to get stale.

use std::sync::Arc;

use sluice_bus::{Connection, Direction, Event, EventBus};
use sluice_openflow::{
    ErrorMsg, FeaturesRequest, Hello, HelloFailedCode, Message, SwitchFeatures,
};
use sluice_registry::{Interface, SwitchRegistry};
use tracing::{debug, info, warn};

/// Lowest hello version accepted.
///
/// Version selection via hello bitmaps is deliberately not implemented;
/// anything at or above this value is taken as negotiable.
pub const MIN_SUPPORTED_VERSION: u8 = 1;

pub struct HandshakeHandler {
    bus: EventBus,
    registry: Arc<SwitchRegistry>,
}

impl HandshakeHandler {
    pub fn new(bus: EventBus, registry: Arc<SwitchRegistry>) -> Self {
        Self { bus, registry }
    }

    /// A new transport connection: greet it.
    pub fn handle_connection_new(&self, source: &Connection) {
        debug!(connection = %source.id(), "greeting new connection");
        self.bus.publish(Event::MessageOut {
            message: Message::Hello(Hello::new()),
            destination: source.clone(),
        });
    }

    /// The remote side's hello: gate on its declared version.
    pub fn handle_hello(&self, hello: &Hello, source: &Connection) {
        if hello.version >= MIN_SUPPORTED_VERSION {
            self.bus.publish(Event::NegotiationComplete {
                destination: source.clone(),
            });
        } else {
            warn!(
                connection = %source.id(),
                version = hello.version,
                "incompatible hello version"
            );
            let message = ErrorMsg::hello_failed(hello.xid, HelloFailedCode::Incompatible);
            self.bus.publish(Event::HelloFailed {
                direction: Direction::Outbound,
                message,
                source: source.clone(),
                destination: source.clone(),
            });
        }
    }

    /// Versions agree: ask the switch what it can do.
    pub fn handle_negotiation_complete(&self, destination: &Connection) {
        debug!(connection = %destination.id(), "negotiation complete, requesting features");
        self.bus.publish(Event::MessageOut {
            message: Message::FeaturesRequest(FeaturesRequest::new()),
            destination: destination.clone(),
        });
    }

    /// The features reply completes the handshake: register the switch and
    /// record its ports and capabilities. Nothing is sent back.
    pub fn handle_features_reply(&self, features: SwitchFeatures, source: &Connection) {
        let switch = self.registry.get_or_create(features.datapath_id, source);

        for port in &features.ports {
            switch.update_interface(Interface::from_port(port, &switch));
        }

        info!(
            datapath_id = %features.datapath_id,
            ports = features.ports.len(),
            "handshake complete"
        );
        switch.update_features(features);
    }
}

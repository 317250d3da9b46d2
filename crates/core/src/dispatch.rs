//! Inbound frame dispatch.
//!
//! The transport publishes framed messages with a parsed header; this
//! handler decodes the body for the declared kind and republishes the typed
//! message on its per-kind topic.

use sluice_bus::{Connection, Direction, Event, EventBus};
use sluice_openflow::{Header, Message};
use tracing::{trace, warn};

pub struct Dispatcher {
    bus: EventBus,
}

impl Dispatcher {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }

    pub fn handle_raw(&self, header: &Header, body: &[u8], source: &Connection) {
        match Message::decode(header, body) {
            // a hello-failed notice from the remote side goes straight to
            // the teardown topic
            Ok(Message::Error(error)) if error.is_hello_failed() => {
                warn!(
                    connection = %source.id(),
                    code = error.code,
                    "remote reported failed negotiation"
                );
                self.bus.publish(Event::HelloFailed {
                    direction: Direction::Inbound,
                    message: error,
                    source: source.clone(),
                    destination: source.clone(),
                });
            }
            Ok(message) => {
                trace!(connection = %source.id(), kind = ?message.kind(), "inbound message");
                self.bus.publish(Event::MessageIn {
                    message,
                    source: source.clone(),
                });
            }
            // decode failures stay at the codec boundary
            Err(err) => {
                warn!(connection = %source.id(), %err, "dropping undecodable frame");
            }
        }
    }
}

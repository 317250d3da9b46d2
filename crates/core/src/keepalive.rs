//! Liveness probe responder.

use sluice_bus::{Connection, Event, EventBus};
use sluice_openflow::{Echo, FeaturesRequest, Message};
use tracing::{debug, trace};

pub struct KeepaliveHandler {
    bus: EventBus,
    /// Piggyback a capability refresh on answered probes.
    refresh_features: bool,
}

impl KeepaliveHandler {
    pub fn new(bus: EventBus, refresh_features: bool) -> Self {
        Self {
            bus,
            refresh_features,
        }
    }

    /// Answer a probe: same xid, payload echoed back.
    pub fn handle_echo_request(&self, echo: &Echo, source: &Connection) {
        trace!(connection = %source.id(), xid = echo.xid, "answering echo probe");
        self.bus.publish(Event::MessageOut {
            message: Message::EchoReply(echo.reply()),
            destination: source.clone(),
        });
    }

    /// An echo reply just went out; optionally refresh the switch's
    /// capabilities while the channel is known to be live.
    pub fn handle_echo_reply_sent(&self, destination: &Connection) {
        if self.refresh_features {
            debug!(connection = %destination.id(), "refreshing features after echo");
            self.bus.publish(Event::MessageOut {
                message: Message::FeaturesRequest(FeaturesRequest::new()),
                destination: destination.clone(),
            });
        }
    }
}

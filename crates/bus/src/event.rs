//! Event payloads and their topic mapping.

use bytes::Bytes;
use sluice_openflow::{ErrorMsg, Header, Message, MessageKind};

use crate::Connection;

/// Which side of the link an event originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Inbound,
    Outbound,
}

/// Routing key for bus subscriptions.
///
/// Topics exist only at the bus edge: an event's topic is derived from its
/// payload, and handlers match on the typed payload rather than on any
/// topic name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// A new transport connection was accepted.
    ConnectionNew,
    /// A framed message arrived and awaits body decoding.
    RawIn,
    /// A decoded inbound message, one topic per kind.
    MessageIn(MessageKind),
    /// An outbound message for the transport to write, one topic per kind.
    MessageOut(MessageKind),
    /// Version negotiation succeeded for a connection.
    NegotiationComplete,
    /// Version negotiation failed; the connection must be torn down.
    HelloFailed(Direction),
}

/// A bus event with its typed payload.
#[derive(Debug, Clone)]
pub enum Event {
    ConnectionNew {
        source: Connection,
    },
    RawIn {
        header: Header,
        body: Bytes,
        source: Connection,
    },
    MessageIn {
        message: Message,
        source: Connection,
    },
    MessageOut {
        message: Message,
        destination: Connection,
    },
    NegotiationComplete {
        destination: Connection,
    },
    HelloFailed {
        direction: Direction,
        message: ErrorMsg,
        source: Connection,
        destination: Connection,
    },
}

impl Event {
    /// The topic this event is delivered on.
    pub fn topic(&self) -> Topic {
        match self {
            Self::ConnectionNew { .. } => Topic::ConnectionNew,
            Self::RawIn { .. } => Topic::RawIn,
            Self::MessageIn { message, .. } => Topic::MessageIn(message.kind()),
            Self::MessageOut { message, .. } => Topic::MessageOut(message.kind()),
            Self::NegotiationComplete { .. } => Topic::NegotiationComplete,
            Self::HelloFailed { direction, .. } => Topic::HelloFailed(*direction),
        }
    }
}

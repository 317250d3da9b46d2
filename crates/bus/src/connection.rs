//! Transport connection handles.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tracing::debug;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one transport-level link, unique for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
struct Inner {
    id: ConnectionId,
    closed: AtomicBool,
}

/// Cheap-clone handle to one transport link.
///
/// The transport layer owns the socket; this handle is the routing key for
/// outbound events and the identity key for inbound ones. Closing is
/// idempotent: both negotiation-failure topics may fire for the same
/// handshake, in either order, and the second close must be a no-op.
/// Sends addressed to a closed connection are dropped by the transport.
#[derive(Debug, Clone)]
pub struct Connection(Arc<Inner>);

impl Connection {
    pub fn new() -> Self {
        let id = ConnectionId(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        Self(Arc::new(Inner {
            id,
            closed: AtomicBool::new(false),
        }))
    }

    pub fn id(&self) -> ConnectionId {
        self.0.id
    }

    /// Close the link. Returns true only for the call that actually
    /// transitioned the connection to closed.
    pub fn close(&self) -> bool {
        let newly_closed = !self.0.closed.swap(true, Ordering::AcqRel);
        if newly_closed {
            debug!(connection = %self.0.id, "connection closed");
        }
        newly_closed
    }

    pub fn is_closed(&self) -> bool {
        self.0.closed.load(Ordering::Acquire)
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Connection {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Connection {}

impl std::hash::Hash for Connection {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

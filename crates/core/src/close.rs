//! Connection teardown on negotiation failure.

use sluice_bus::Connection;
use tracing::{debug, trace};

/// Closes connections whose negotiation failed.
///
/// Subscribed to both failure directions: the remote's own failure notice
/// and the locally detected mismatch can both fire for one handshake, in
/// either order or concurrently. Close is idempotent, so handling both is
/// harmless; an outbound error racing the close is the transport's problem
/// (sends to a closing connection are dropped, never an error here).
pub struct CloseHandler;

impl CloseHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_hello_failed(&self, destination: &Connection) {
        if destination.close() {
            debug!(connection = %destination.id(), "closed after failed negotiation");
        } else {
            trace!(connection = %destination.id(), "already closed");
        }
    }
}

impl Default for CloseHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closes_connection() {
        let handler = CloseHandler::new();
        let conn = Connection::new();

        handler.handle_hello_failed(&conn);
        assert!(conn.is_closed());
    }

    #[test]
    fn test_double_delivery_is_noop() {
        let handler = CloseHandler::new();
        let conn = Connection::new();

        // both failure topics delivering for the same handshake
        handler.handle_hello_failed(&conn);
        handler.handle_hello_failed(&conn);
        assert!(conn.is_closed());
    }

    #[test]
    fn test_concurrent_delivery_is_safe() {
        let conn = Connection::new();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let conn = conn.clone();
                scope.spawn(move || CloseHandler::new().handle_hello_failed(&conn));
            }
        });

        assert!(conn.is_closed());
    }
}

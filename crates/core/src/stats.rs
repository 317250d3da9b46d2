//! Periodic flow-stats polling.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use sluice_bus::{Connection, Event, EventBus};
use sluice_openflow::{Message, StatsBody, StatsReply, StatsRequest};
use sluice_registry::{FlowEntry, SwitchRegistry};
use tracing::{debug, trace};

/// Polls every known switch for flow statistics on a fixed period and
/// ingests the replies.
///
/// Ticks are independent: a tick never waits for the previous tick's
/// replies, and replies may interleave with later requests freely.
pub struct StatsPoller {
    bus: EventBus,
    registry: Arc<SwitchRegistry>,
    interval: Duration,
    next_xid: AtomicU32,
}

impl StatsPoller {
    pub fn new(bus: EventBus, registry: Arc<SwitchRegistry>, interval: Duration) -> Self {
        Self {
            bus,
            registry,
            interval,
            next_xid: AtomicU32::new(1),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// One tick: request flow stats (all tables, no port filter) from every
    /// registered switch. Returns how many requests went out.
    pub fn poll_all(&self) -> usize {
        let switches = self.registry.switches();
        for switch in &switches {
            let xid = self.next_xid.fetch_add(1, Ordering::Relaxed);
            trace!(datapath_id = %switch.datapath_id(), xid, "requesting flow stats");
            self.bus.publish(Event::MessageOut {
                message: Message::StatsRequest(StatsRequest::flows(xid)),
                destination: switch.connection(),
            });
        }
        switches.len()
    }

    /// Ingest a stats reply: a flow-kind body replaces the owning switch's
    /// flow list wholesale. Anything else is ignored, as are replies from
    /// connections no switch is bound to (they can race a disconnect).
    pub fn handle_stats_reply(&self, reply: &StatsReply, source: &Connection) {
        let StatsBody::Flow(entries) = &reply.body else {
            debug!(connection = %source.id(), kind = ?reply.kind(), "ignoring non-flow stats reply");
            return;
        };

        let Some(switch) = self.registry.by_connection(source) else {
            debug!(connection = %source.id(), "stats reply from unknown connection");
            return;
        };

        let flows: Vec<FlowEntry> = entries.iter().map(FlowEntry::from_stats).collect();
        trace!(datapath_id = %switch.datapath_id(), flows = flows.len(), "flow list updated");
        switch.replace_flows(flows);
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use bytes::Bytes;
    use sluice_bus::Topic;
    use sluice_openflow::{
        DatapathId, FlowStats, Match, MessageKind, StatsKind, StatsRequestBody,
    };
    use tokio::sync::broadcast::error::TryRecvError;

    use super::*;

    const INTERVAL: Duration = Duration::from_secs(30);

    fn poller() -> (StatsPoller, EventBus, Arc<SwitchRegistry>) {
        let bus = EventBus::default();
        let registry = Arc::new(SwitchRegistry::new());
        (
            StatsPoller::new(bus.clone(), Arc::clone(&registry), INTERVAL),
            bus,
            registry,
        )
    }

    fn sample_flow(cookie: u64) -> FlowStats {
        FlowStats {
            table_id: 0,
            flow_match: Match::wildcard_all(),
            duration_sec: 1,
            duration_nsec: 0,
            priority: 0,
            idle_timeout: 0,
            hard_timeout: 0,
            cookie,
            packet_count: 0,
            byte_count: 0,
        }
    }

    #[tokio::test]
    async fn test_tick_polls_every_switch() {
        let (poller, bus, registry) = poller();
        let mut rx = bus.subscribe(Topic::MessageOut(MessageKind::StatsRequest));

        let conn_a = Connection::new();
        let conn_b = Connection::new();
        registry.get_or_create(DatapathId(1), &conn_a);
        registry.get_or_create(DatapathId(2), &conn_b);

        assert_eq!(poller.poll_all(), 2);

        let mut destinations = Vec::new();
        for _ in 0..2 {
            match rx.recv().await.unwrap() {
                Event::MessageOut {
                    message: Message::StatsRequest(request),
                    destination,
                } => {
                    assert_matches!(request.body, StatsRequestBody::Flow(_));
                    destinations.push(destination);
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert!(destinations.contains(&conn_a));
        assert!(destinations.contains(&conn_b));
        assert_matches!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn test_ticks_use_fresh_xids() {
        let (poller, bus, registry) = poller();
        let mut rx = bus.subscribe(Topic::MessageOut(MessageKind::StatsRequest));

        registry.get_or_create(DatapathId(1), &Connection::new());
        poller.poll_all();
        poller.poll_all();

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        match (first, second) {
            (
                Event::MessageOut {
                    message: Message::StatsRequest(a),
                    ..
                },
                Event::MessageOut {
                    message: Message::StatsRequest(b),
                    ..
                },
            ) => assert_ne!(a.xid, b.xid),
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[test]
    fn test_empty_registry_polls_nothing() {
        let (poller, _, _) = poller();
        assert_eq!(poller.poll_all(), 0);
    }

    #[test]
    fn test_flow_reply_replaces_snapshot() {
        let (poller, _, registry) = poller();
        let conn = Connection::new();
        let switch = registry.get_or_create(DatapathId(7), &conn);

        switch.replace_flows(vec![
            FlowEntry::from_stats(&sample_flow(0xa)),
            FlowEntry::from_stats(&sample_flow(0xb)),
        ]);

        poller.handle_stats_reply(&StatsReply::flows(1, vec![sample_flow(0xc)]), &conn);

        let flows = switch.flows();
        assert_eq!(flows.len(), 1);
        assert_eq!(flows.first().map(|f| f.cookie), Some(0xc));
    }

    #[test]
    fn test_non_flow_reply_ignored() {
        let (poller, _, registry) = poller();
        let conn = Connection::new();
        let switch = registry.get_or_create(DatapathId(7), &conn);
        switch.replace_flows(vec![FlowEntry::from_stats(&sample_flow(0xa))]);

        let reply = StatsReply {
            xid: 1,
            flags: 0,
            body: StatsBody::Other {
                kind: StatsKind::Port.as_u16(),
                data: Bytes::new(),
            },
        };
        poller.handle_stats_reply(&reply, &conn);

        assert_eq!(switch.flows().len(), 1);
    }

    #[test]
    fn test_reply_from_unknown_connection_ignored() {
        let (poller, _, _) = poller();
        // must not panic; reply races a disconnect
        poller.handle_stats_reply(
            &StatsReply::flows(1, vec![sample_flow(1)]),
            &Connection::new(),
        );
    }
}

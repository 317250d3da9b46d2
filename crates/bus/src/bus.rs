//! Broadcast-backed publish/subscribe bus.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::trace;

use crate::{Event, Topic};

const DEFAULT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug)]
struct Shared {
    channels: RwLock<HashMap<Topic, broadcast::Sender<Event>>>,
    capacity: usize,
}

/// Per-topic broadcast bus.
///
/// Each topic is one broadcast channel: publishes on a topic reach every
/// subscriber of that topic in publish order. Subscribers on different
/// topics run independently; nothing orders one topic against another.
/// Publishing to a topic nobody subscribes to drops the event.
#[derive(Debug, Clone)]
pub struct EventBus(Arc<Shared>);

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        Self(Arc::new(Shared {
            channels: RwLock::new(HashMap::new()),
            capacity,
        }))
    }

    fn sender(&self, topic: Topic) -> broadcast::Sender<Event> {
        // Fast path: read lock
        {
            let channels = self.0.channels.read();
            if let Some(tx) = channels.get(&topic) {
                return tx.clone();
            }
        }

        // Slow path: write lock, double-checked
        let mut channels = self.0.channels.write();
        channels
            .entry(topic)
            .or_insert_with(|| broadcast::channel(self.0.capacity).0)
            .clone()
    }

    /// Publish an event on its topic. Returns the number of subscribers
    /// that will observe it.
    pub fn publish(&self, event: Event) -> usize {
        let topic = event.topic();
        let delivered = self.sender(topic).send(event).unwrap_or(0);
        trace!(?topic, delivered, "event published");
        delivered
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.0
            .channels
            .read()
            .get(&topic)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use sluice_openflow::{Hello, Message};

    use super::*;
    use crate::Connection;

    #[tokio::test]
    async fn test_publish_subscribe() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe(Topic::ConnectionNew);

        let conn = Connection::new();
        let delivered = bus.publish(Event::ConnectionNew {
            source: conn.clone(),
        });
        assert_eq!(delivered, 1);

        let event = rx.recv().await.unwrap();
        assert_matches!(event, Event::ConnectionNew { source } if source == conn);
    }

    #[test]
    fn test_publish_without_subscribers_is_dropped() {
        let bus = EventBus::default();
        let delivered = bus.publish(Event::ConnectionNew {
            source: Connection::new(),
        });
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_topics_are_isolated() {
        let bus = EventBus::default();
        let mut hello_rx = bus.subscribe(Topic::MessageIn(sluice_openflow::MessageKind::Hello));
        let mut new_rx = bus.subscribe(Topic::ConnectionNew);

        bus.publish(Event::MessageIn {
            message: Message::Hello(Hello::new()),
            source: Connection::new(),
        });

        assert_matches!(hello_rx.recv().await, Ok(Event::MessageIn { .. }));
        assert_matches!(
            new_rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        );
    }

    #[tokio::test]
    async fn test_same_topic_preserves_publish_order() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe(Topic::ConnectionNew);

        let first = Connection::new();
        let second = Connection::new();
        bus.publish(Event::ConnectionNew {
            source: first.clone(),
        });
        bus.publish(Event::ConnectionNew {
            source: second.clone(),
        });

        assert_matches!(rx.recv().await, Ok(Event::ConnectionNew { source }) if source == first);
        assert_matches!(rx.recv().await, Ok(Event::ConnectionNew { source }) if source == second);
    }

    #[tokio::test]
    async fn test_two_subscribers_both_receive() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe(Topic::NegotiationComplete);
        let mut rx2 = bus.subscribe(Topic::NegotiationComplete);

        let conn = Connection::new();
        bus.publish(Event::NegotiationComplete {
            destination: conn.clone(),
        });

        assert_matches!(rx1.recv().await, Ok(Event::NegotiationComplete { destination }) if destination == conn);
        assert_matches!(rx2.recv().await, Ok(Event::NegotiationComplete { destination }) if destination == conn);
    }
}

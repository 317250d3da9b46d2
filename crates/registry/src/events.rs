//! Registry events and non-blocking broadcast emitter.

use sluice_bus::ConnectionId;
use sluice_openflow::DatapathId;
use tokio::sync::broadcast;

/// Registry lifecycle events.
#[derive(Debug, Clone)]
pub enum SwitchEvent {
    Discovered {
        datapath_id: DatapathId,
    },
    ConnectionRebound {
        datapath_id: DatapathId,
        connection: ConnectionId,
    },
    FeaturesUpdated {
        datapath_id: DatapathId,
        ports: usize,
    },
    FlowsUpdated {
        datapath_id: DatapathId,
        flows: usize,
    },
}

impl SwitchEvent {
    pub fn datapath_id(&self) -> DatapathId {
        match self {
            Self::Discovered { datapath_id }
            | Self::ConnectionRebound { datapath_id, .. }
            | Self::FeaturesUpdated { datapath_id, .. }
            | Self::FlowsUpdated { datapath_id, .. } => *datapath_id,
        }
    }
}

const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Non-blocking broadcast emitter. Slow subscribers drop events independently.
#[derive(Debug, Clone)]
pub struct SwitchEventEmitter {
    tx: broadcast::Sender<SwitchEvent>,
}

impl Default for SwitchEventEmitter {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl SwitchEventEmitter {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn emit(&self, event: SwitchEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SwitchEvent> {
        self.tx.subscribe()
    }

    pub(crate) fn discovered(&self, datapath_id: DatapathId) {
        self.emit(SwitchEvent::Discovered { datapath_id });
    }

    pub(crate) fn connection_rebound(&self, datapath_id: DatapathId, connection: ConnectionId) {
        self.emit(SwitchEvent::ConnectionRebound {
            datapath_id,
            connection,
        });
    }

    pub(crate) fn features_updated(&self, datapath_id: DatapathId, ports: usize) {
        self.emit(SwitchEvent::FeaturesUpdated { datapath_id, ports });
    }

    pub(crate) fn flows_updated(&self, datapath_id: DatapathId, flows: usize) {
        self.emit(SwitchEvent::FlowsUpdated { datapath_id, flows });
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn test_emitter_basic() {
        let emitter = SwitchEventEmitter::default();
        let mut rx = emitter.subscribe();

        emitter.discovered(DatapathId(1));

        let event = rx.recv().await.unwrap();
        assert_matches!(event, SwitchEvent::Discovered { datapath_id } if datapath_id == DatapathId(1));
        assert_eq!(event.datapath_id(), DatapathId(1));
    }

    #[test]
    fn test_emitter_no_subscribers() {
        let emitter = SwitchEventEmitter::default();
        emitter.discovered(DatapathId(1));
        emitter.flows_updated(DatapathId(1), 3);
    }
}

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use sluice_bus::{Connection, Event, EventBus, Topic};
use sluice_core::{CoreConfig, Service};
use sluice_openflow::{
    DatapathId, HEADER_LEN, Header, Hello, MacAddr, Message, MessageKind, PhyPort, SwitchFeatures,
};
use sluice_registry::{SwitchEvent, SwitchRegistry};
use tokio::sync::broadcast;
use tokio::time::timeout;

fn frame(message: &Message) -> (Header, Bytes) {
    let encoded = message.encode();
    let (head, body) = encoded.split_at(HEADER_LEN);
    (
        Header::decode(head).unwrap(),
        Bytes::copy_from_slice(body),
    )
}

async fn recv(rx: &mut broadcast::Receiver<Event>) -> Event {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("bus closed")
}

fn port(no: u16, name: &str) -> PhyPort {
    PhyPort {
        port_no: no,
        hw_addr: MacAddr([0, 0, 0, 0, 0, no as u8]),
        name: name.to_string(),
        config: 0,
        state: 0,
        curr: 0,
        advertised: 0,
        supported: 0,
        peer: 0,
    }
}

#[tokio::test]
async fn handshake_success() {
    tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .init();

    let bus = EventBus::default();
    let registry = Arc::new(SwitchRegistry::new());
    let service = Service::new(bus.clone(), Arc::clone(&registry), CoreConfig::default());

    let mut hello_out = bus.subscribe(Topic::MessageOut(MessageKind::Hello));
    let mut features_out = bus.subscribe(Topic::MessageOut(MessageKind::FeaturesRequest));
    let mut registry_events = registry.subscribe();

    let handle = service.spawn();

    // the transport layer accepts a connection
    let conn = Connection::new();
    bus.publish(Event::ConnectionNew {
        source: conn.clone(),
    });

    // the controller greets it
    match recv(&mut hello_out).await {
        Event::MessageOut {
            message: Message::Hello(_),
            destination,
        } => assert_eq!(destination, conn),
        other => panic!("expected outbound hello, got {other:?}"),
    }

    // the switch's own hello arrives through the raw path
    let (header, body) = frame(&Message::Hello(Hello { version: 1, xid: 1 }));
    bus.publish(Event::RawIn {
        header,
        body,
        source: conn.clone(),
    });

    // negotiation completes and a features request goes out
    match recv(&mut features_out).await {
        Event::MessageOut {
            message: Message::FeaturesRequest(_),
            destination,
        } => assert_eq!(destination, conn),
        other => panic!("expected features request, got {other:?}"),
    }

    // the switch answers with its features
    let (header, body) = frame(&Message::FeaturesReply(SwitchFeatures {
        xid: 2,
        datapath_id: DatapathId(7),
        n_buffers: 256,
        n_tables: 1,
        capabilities: 0,
        actions: 0,
        ports: vec![port(1, "eth0"), port(2, "eth1")],
    }));
    bus.publish(Event::RawIn {
        header,
        body,
        source: conn.clone(),
    });

    // the registry converges
    loop {
        match timeout(Duration::from_secs(5), registry_events.recv())
            .await
            .expect("timed out waiting for registry event")
            .expect("registry events closed")
        {
            SwitchEvent::FeaturesUpdated { datapath_id, ports } => {
                assert_eq!(datapath_id, DatapathId(7));
                assert_eq!(ports, 2);
                break;
            }
            _ => continue,
        }
    }

    let switch = registry.get(&DatapathId(7)).expect("switch registered");
    assert_eq!(switch.connection(), conn);
    assert_eq!(switch.interface(1).map(|i| i.name), Some("eth0".into()));
    assert_eq!(switch.interface(2).map(|i| i.name), Some("eth1".into()));
    assert!(switch.features().is_some());
    assert!(!conn.is_closed());

    handle.shutdown().await;
}

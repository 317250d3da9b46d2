use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use sluice_bus::{Connection, Direction, Event, EventBus, Topic};
use sluice_core::{CoreConfig, Service};
use sluice_openflow::{
    ErrorMsg, HEADER_LEN, Header, Hello, HelloFailedCode, Message,
};
use sluice_registry::SwitchRegistry;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::time::timeout;

fn frame(message: &Message) -> (Header, Bytes) {
    let encoded = message.encode();
    let (head, body) = encoded.split_at(HEADER_LEN);
    (
        Header::decode(head).unwrap(),
        Bytes::copy_from_slice(body),
    )
}

fn spawn_service(bus: &EventBus) -> sluice_core::ServiceHandle {
    let registry = Arc::new(SwitchRegistry::new());
    Service::new(bus.clone(), registry, CoreConfig::default()).spawn()
}

async fn wait_closed(conn: &Connection) {
    timeout(Duration::from_secs(5), async {
        while !conn.is_closed() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("connection never closed");
}

#[tokio::test]
async fn handshake_failure_incompatible_version() {
    tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .init();

    let bus = EventBus::default();
    let mut failed_out = bus.subscribe(Topic::HelloFailed(Direction::Outbound));
    let handle = spawn_service(&bus);

    // a hello below the supported version arrives
    let conn = Connection::new();
    let (header, body) = frame(&Message::Hello(Hello { version: 0, xid: 7 }));
    bus.publish(Event::RawIn {
        header,
        body,
        source: conn.clone(),
    });

    // exactly one failure notice, carrying the inbound xid
    let event = timeout(Duration::from_secs(5), failed_out.recv())
        .await
        .expect("timed out waiting for failure")
        .expect("bus closed");
    match event {
        Event::HelloFailed {
            direction: Direction::Outbound,
            message,
            destination,
            ..
        } => {
            assert!(message.is_hello_failed());
            assert_eq!(message.code, HelloFailedCode::Incompatible as u16);
            assert_eq!(message.xid, 7);
            assert_eq!(destination, conn);
        }
        other => panic!("expected failure event, got {other:?}"),
    }
    assert!(matches!(failed_out.try_recv(), Err(TryRecvError::Empty)));

    // and the connection goes down
    wait_closed(&conn).await;

    handle.shutdown().await;
}

#[tokio::test]
async fn double_failure_closes_exactly_once() {
    let bus = EventBus::default();
    let handle = spawn_service(&bus);

    // the remote's own failure notice and the locally detected one race;
    // the bus guarantees nothing about their relative order
    let conn = Connection::new();
    let message = ErrorMsg::hello_failed(3, HelloFailedCode::Incompatible);
    bus.publish(Event::HelloFailed {
        direction: Direction::Inbound,
        message: message.clone(),
        source: conn.clone(),
        destination: conn.clone(),
    });
    bus.publish(Event::HelloFailed {
        direction: Direction::Outbound,
        message,
        source: conn.clone(),
        destination: conn.clone(),
    });

    wait_closed(&conn).await;

    handle.shutdown().await;
}

#[tokio::test]
async fn remote_failure_notice_closes_connection() {
    let bus = EventBus::default();
    let handle = spawn_service(&bus);

    // the remote side rejected our hello; its error arrives on the wire
    let conn = Connection::new();
    let (header, body) = frame(&Message::Error(ErrorMsg::hello_failed(
        1,
        HelloFailedCode::Incompatible,
    )));
    bus.publish(Event::RawIn {
        header,
        body,
        source: conn.clone(),
    });

    wait_closed(&conn).await;

    handle.shutdown().await;
}

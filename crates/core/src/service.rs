//! Service wiring: subscribes every handler and runs them to completion.

use std::sync::Arc;

use sluice_bus::{Direction, Event, EventBus, Topic};
use sluice_openflow::{Message, MessageKind};
use sluice_registry::SwitchRegistry;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace, warn};

use crate::{
    CloseHandler, CoreConfig, Dispatcher, HandshakeHandler, KeepaliveHandler, StatsPoller,
};

/// Owns the core components and wires them onto the bus.
pub struct Service {
    bus: EventBus,
    registry: Arc<SwitchRegistry>,
    config: CoreConfig,
}

impl Service {
    pub fn new(bus: EventBus, registry: Arc<SwitchRegistry>, config: CoreConfig) -> Self {
        Self {
            bus,
            registry,
            config,
        }
    }

    /// Subscribe every handler to its topics and spawn one task per
    /// subscription, plus the poller tick task.
    pub fn spawn(self) -> ServiceHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut tasks = Vec::new();

        // inbound dispatch
        let dispatcher = Dispatcher::new(self.bus.clone());
        tasks.push(spawn_handler(
            "dispatch",
            self.bus.subscribe(Topic::RawIn),
            shutdown_rx.clone(),
            move |event| {
                if let Event::RawIn {
                    header,
                    body,
                    source,
                } = event
                {
                    dispatcher.handle_raw(&header, &body, &source);
                }
            },
        ));

        // handshake
        let handshake = Arc::new(HandshakeHandler::new(
            self.bus.clone(),
            Arc::clone(&self.registry),
        ));
        {
            let handshake = Arc::clone(&handshake);
            tasks.push(spawn_handler(
                "connection-new",
                self.bus.subscribe(Topic::ConnectionNew),
                shutdown_rx.clone(),
                move |event| {
                    if let Event::ConnectionNew { source } = event {
                        handshake.handle_connection_new(&source);
                    }
                },
            ));
        }
        {
            let handshake = Arc::clone(&handshake);
            tasks.push(spawn_handler(
                "hello-in",
                self.bus.subscribe(Topic::MessageIn(MessageKind::Hello)),
                shutdown_rx.clone(),
                move |event| {
                    if let Event::MessageIn {
                        message: Message::Hello(hello),
                        source,
                    } = event
                    {
                        handshake.handle_hello(&hello, &source);
                    }
                },
            ));
        }
        {
            let handshake = Arc::clone(&handshake);
            tasks.push(spawn_handler(
                "negotiation-complete",
                self.bus.subscribe(Topic::NegotiationComplete),
                shutdown_rx.clone(),
                move |event| {
                    if let Event::NegotiationComplete { destination } = event {
                        handshake.handle_negotiation_complete(&destination);
                    }
                },
            ));
        }
        {
            let handshake = Arc::clone(&handshake);
            tasks.push(spawn_handler(
                "features-reply",
                self.bus
                    .subscribe(Topic::MessageIn(MessageKind::FeaturesReply)),
                shutdown_rx.clone(),
                move |event| {
                    if let Event::MessageIn {
                        message: Message::FeaturesReply(features),
                        source,
                    } = event
                    {
                        handshake.handle_features_reply(features, &source);
                    }
                },
            ));
        }

        // keepalive
        let keepalive = Arc::new(KeepaliveHandler::new(
            self.bus.clone(),
            self.config.refresh_features_on_echo,
        ));
        {
            let keepalive = Arc::clone(&keepalive);
            tasks.push(spawn_handler(
                "echo-request",
                self.bus.subscribe(Topic::MessageIn(MessageKind::EchoRequest)),
                shutdown_rx.clone(),
                move |event| {
                    if let Event::MessageIn {
                        message: Message::EchoRequest(echo),
                        source,
                    } = event
                    {
                        keepalive.handle_echo_request(&echo, &source);
                    }
                },
            ));
        }
        {
            let keepalive = Arc::clone(&keepalive);
            tasks.push(spawn_handler(
                "echo-reply-out",
                self.bus.subscribe(Topic::MessageOut(MessageKind::EchoReply)),
                shutdown_rx.clone(),
                move |event| {
                    if let Event::MessageOut { destination, .. } = event {
                        keepalive.handle_echo_reply_sent(&destination);
                    }
                },
            ));
        }

        // teardown, fed from both failure directions
        let close = Arc::new(CloseHandler::new());
        for direction in [Direction::Inbound, Direction::Outbound] {
            let close = Arc::clone(&close);
            tasks.push(spawn_handler(
                "hello-failed",
                self.bus.subscribe(Topic::HelloFailed(direction)),
                shutdown_rx.clone(),
                move |event| {
                    if let Event::HelloFailed { destination, .. } = event {
                        close.handle_hello_failed(&destination);
                    }
                },
            ));
        }

        // stats polling
        let poller = Arc::new(StatsPoller::new(
            self.bus.clone(),
            Arc::clone(&self.registry),
            self.config.stats_interval(),
        ));
        {
            let poller = Arc::clone(&poller);
            tasks.push(spawn_handler(
                "stats-reply",
                self.bus.subscribe(Topic::MessageIn(MessageKind::StatsReply)),
                shutdown_rx.clone(),
                move |event| {
                    if let Event::MessageIn {
                        message: Message::StatsReply(reply),
                        source,
                    } = event
                    {
                        poller.handle_stats_reply(&reply, &source);
                    }
                },
            ));
        }
        {
            let mut shutdown = shutdown_rx;
            tasks.push(tokio::spawn(async move {
                let mut ticker = tokio::time::interval(poller.interval());
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    tokio::select! {
                        _ = shutdown.changed() => break,
                        _ = ticker.tick() => {
                            let polled = poller.poll_all();
                            trace!(switches = polled, "stats poll tick");
                        }
                    }
                }
                debug!("stats poller stopped");
            }));
        }

        ServiceHandle {
            shutdown: shutdown_tx,
            tasks,
        }
    }
}

/// Handle to a spawned service. Dropping it stops the tasks; prefer
/// [`ServiceHandle::shutdown`] for an orderly stop.
pub struct ServiceHandle {
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl ServiceHandle {
    /// Stop issuing new work and wait for the handler tasks to finish.
    /// In-flight requests are not cancelled.
    pub async fn shutdown(self) {
        debug!("shutting down");
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            let _ = task.await;
        }
    }
}

fn spawn_handler<F>(
    name: &'static str,
    mut rx: broadcast::Receiver<Event>,
    mut shutdown: watch::Receiver<bool>,
    mut handle: F,
) -> JoinHandle<()>
where
    F: FnMut(Event) + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                event = rx.recv() => match event {
                    Ok(event) => handle(event),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(handler = name, missed, "handler lagged, events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
    })
}

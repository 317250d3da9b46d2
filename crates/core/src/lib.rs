//! Control-channel core for OpenFlow switches.
//!
//! Four components drive the lifecycle of every switch connection, wired
//! together only through the event bus:
//!
//! - [`HandshakeHandler`]: hello/features exchange per connection
//! - [`CloseHandler`]: tears a connection down on negotiation failure
//! - [`KeepaliveHandler`]: answers liveness probes
//! - [`StatsPoller`]: periodically scrapes flow statistics
//!
//! plus the [`Dispatcher`] feeding decoded inbound messages onto the
//! per-kind topics. [`Service`] subscribes and spawns them all.

mod close;
mod config;
mod dispatch;
mod handshake;
mod keepalive;
mod service;
mod stats;

pub use close::CloseHandler;
pub use config::{CoreConfig, DEFAULT_STATS_INTERVAL_SECS};
pub use dispatch::Dispatcher;
pub use handshake::{HandshakeHandler, MIN_SUPPORTED_VERSION};
pub use keepalive::KeepaliveHandler;
pub use service::{Service, ServiceHandle};
pub use stats::StatsPoller;

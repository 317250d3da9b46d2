//! Typed event bus boundary and connection handles.
//!
//! The core components never call each other directly: they publish
//! [`Event`]s and subscribe to [`Topic`]s. Delivery on one topic reaches
//! each subscriber in publish order; nothing is guaranteed across topics.

mod bus;
mod connection;
mod event;

pub use bus::EventBus;
pub use connection::{Connection, ConnectionId};
pub use event::{Direction, Event, Topic};

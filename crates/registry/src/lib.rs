//! In-memory switch registry.
//!
//! One [`Switch`] record per datapath id, shared `Arc`-per-switch so
//! concurrent handlers mutate through per-switch locks instead of a global
//! one. The registry's get-or-create is atomic with respect to concurrent
//! handshakes from the same datapath id reconnecting.

mod events;
mod flow;
mod interface;
mod registry;
mod switch;

pub use events::{SwitchEvent, SwitchEventEmitter};
pub use flow::FlowEntry;
pub use interface::Interface;
pub use registry::SwitchRegistry;
pub use switch::Switch;

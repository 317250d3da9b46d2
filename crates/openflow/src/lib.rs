//! OpenFlow v1.0 message types and wire codec.
//!
//! The transport layer frames messages with the fixed 8-byte header; this
//! crate parses that header into a typed envelope, decodes the remaining
//! bytes into a typed body given the header's declared kind, and encodes
//! outbound messages back into bytes.

mod error;
mod features;
mod header;
mod message;
mod stats;
mod types;

pub use error::CodecError;
pub use features::{PhyPort, SwitchFeatures, capabilities};
pub use header::{HEADER_LEN, Header, MessageKind, OFP_VERSION};
pub use message::{Echo, ErrorMsg, ErrorType, FeaturesRequest, Hello, HelloFailedCode, Message};
pub use stats::{
    FlowStats, FlowStatsRequest, Match, PORT_NONE, StatsBody, StatsKind, StatsReply, StatsRequest,
    StatsRequestBody, TABLE_ALL,
};
pub use types::{DatapathId, MacAddr};

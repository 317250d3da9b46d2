//! Statistics request/reply bodies.
//!
//! Only flow statistics are decoded in full; other stats kinds are carried
//! opaque so a future reader can still inspect them.

use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::CodecError;

/// Wildcard-all flow match: request statistics for every flow.
const WILDCARD_ALL: u32 = (1 << 22) - 1;

/// Request statistics from all tables.
pub const TABLE_ALL: u8 = 0xff;

/// No output-port filter.
pub const PORT_NONE: u16 = 0xffff;

const MATCH_LEN: usize = 40;

/// Minimum wire size of one flow-stats record (without actions).
const FLOW_STATS_MIN_LEN: usize = 88;

/// Statistics body kinds (`ofp_stats_types`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatsKind {
    Description,
    Flow,
    Aggregate,
    Table,
    Port,
    Queue,
    Vendor,
    Other(u16),
}

impl StatsKind {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => Self::Description,
            1 => Self::Flow,
            2 => Self::Aggregate,
            3 => Self::Table,
            4 => Self::Port,
            5 => Self::Queue,
            0xffff => Self::Vendor,
            other => Self::Other(other),
        }
    }

    pub fn as_u16(self) -> u16 {
        match self {
            Self::Description => 0,
            Self::Flow => 1,
            Self::Aggregate => 2,
            Self::Table => 3,
            Self::Port => 4,
            Self::Queue => 5,
            Self::Vendor => 0xffff,
            Self::Other(other) => other,
        }
    }
}

/// Opaque 40-byte flow match structure.
///
/// Match semantics are out of scope for this controller core; the bytes are
/// carried verbatim so replies can be stored and re-encoded losslessly.
#[derive(Clone, PartialEq, Eq)]
pub struct Match([u8; MATCH_LEN]);

impl Match {
    /// A match with every wildcard bit set: matches all flows.
    pub fn wildcard_all() -> Self {
        let mut bytes = [0u8; MATCH_LEN];
        let (wildcards, _) = bytes.split_at_mut(4);
        wildcards.copy_from_slice(&WILDCARD_ALL.to_be_bytes());
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; MATCH_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; MATCH_LEN] {
        &self.0
    }

    fn wildcards(&self) -> u32 {
        let mut buf: &[u8] = &self.0;
        buf.get_u32()
    }

    fn decode(buf: &mut &[u8]) -> Result<Self, CodecError> {
        if buf.remaining() < MATCH_LEN {
            return Err(CodecError::Truncated("flow match"));
        }
        let mut bytes = [0u8; MATCH_LEN];
        buf.copy_to_slice(&mut bytes);
        Ok(Self(bytes))
    }
}

impl fmt::Debug for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Match(wildcards={:#x})", self.wildcards())
    }
}

/// Body of a flow-stats request: which flows, which tables, which out port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowStatsRequest {
    pub flow_match: Match,
    pub table_id: u8,
    pub out_port: u16,
}

impl FlowStatsRequest {
    /// All flows, all tables, no port filter.
    pub fn all() -> Self {
        Self {
            flow_match: Match::wildcard_all(),
            table_id: TABLE_ALL,
            out_port: PORT_NONE,
        }
    }

    fn decode(buf: &mut &[u8]) -> Result<Self, CodecError> {
        let flow_match = Match::decode(buf)?;
        if buf.remaining() < 4 {
            return Err(CodecError::Truncated("flow stats request"));
        }
        let table_id = buf.get_u8();
        buf.advance(1);
        let out_port = buf.get_u16();
        Ok(Self {
            flow_match,
            table_id,
            out_port,
        })
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_slice(self.flow_match.as_bytes());
        dst.put_u8(self.table_id);
        dst.put_u8(0);
        dst.put_u16(self.out_port);
    }
}

/// Typed stats-request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsRequestBody {
    Flow(FlowStatsRequest),
    Other { kind: u16, data: Bytes },
}

/// A statistics request message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsRequest {
    pub xid: u32,
    pub flags: u16,
    pub body: StatsRequestBody,
}

impl StatsRequest {
    /// The poller's request: flow statistics, all tables, no port filter.
    pub fn flows(xid: u32) -> Self {
        Self {
            xid,
            flags: 0,
            body: StatsRequestBody::Flow(FlowStatsRequest::all()),
        }
    }

    pub fn kind(&self) -> StatsKind {
        match &self.body {
            StatsRequestBody::Flow(_) => StatsKind::Flow,
            StatsRequestBody::Other { kind, .. } => StatsKind::from_u16(*kind),
        }
    }

    pub(crate) fn decode(xid: u32, buf: &mut &[u8]) -> Result<Self, CodecError> {
        if buf.remaining() < 4 {
            return Err(CodecError::Truncated("stats request"));
        }
        let kind = buf.get_u16();
        let flags = buf.get_u16();
        let body = match StatsKind::from_u16(kind) {
            StatsKind::Flow => StatsRequestBody::Flow(FlowStatsRequest::decode(buf)?),
            _ => StatsRequestBody::Other {
                kind,
                data: Bytes::copy_from_slice(buf),
            },
        };
        Ok(Self { xid, flags, body })
    }

    pub(crate) fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_u16(self.kind().as_u16());
        dst.put_u16(self.flags);
        match &self.body {
            StatsRequestBody::Flow(request) => request.encode(dst),
            StatsRequestBody::Other { data, .. } => dst.put_slice(data),
        }
    }
}

/// One decoded flow-stats record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowStats {
    pub table_id: u8,
    pub flow_match: Match,
    pub duration_sec: u32,
    pub duration_nsec: u32,
    pub priority: u16,
    pub idle_timeout: u16,
    pub hard_timeout: u16,
    pub cookie: u64,
    pub packet_count: u64,
    pub byte_count: u64,
}

impl FlowStats {
    fn decode(buf: &mut &[u8]) -> Result<Self, CodecError> {
        if buf.remaining() < 2 {
            return Err(CodecError::Truncated("flow stats entry"));
        }
        let length = buf.get_u16();
        if (length as usize) < FLOW_STATS_MIN_LEN {
            return Err(CodecError::BadLength {
                context: "flow stats entry",
                length,
            });
        }
        if buf.remaining() < length as usize - 2 {
            return Err(CodecError::Truncated("flow stats entry"));
        }
        let table_id = buf.get_u8();
        buf.advance(1);
        let flow_match = Match::decode(buf)?;
        let duration_sec = buf.get_u32();
        let duration_nsec = buf.get_u32();
        let priority = buf.get_u16();
        let idle_timeout = buf.get_u16();
        let hard_timeout = buf.get_u16();
        buf.advance(6);
        let cookie = buf.get_u64();
        let packet_count = buf.get_u64();
        let byte_count = buf.get_u64();
        // actions are not modelled; skip to the next record
        buf.advance(length as usize - FLOW_STATS_MIN_LEN);
        Ok(Self {
            table_id,
            flow_match,
            duration_sec,
            duration_nsec,
            priority,
            idle_timeout,
            hard_timeout,
            cookie,
            packet_count,
            byte_count,
        })
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_u16(FLOW_STATS_MIN_LEN as u16);
        dst.put_u8(self.table_id);
        dst.put_u8(0);
        dst.put_slice(self.flow_match.as_bytes());
        dst.put_u32(self.duration_sec);
        dst.put_u32(self.duration_nsec);
        dst.put_u16(self.priority);
        dst.put_u16(self.idle_timeout);
        dst.put_u16(self.hard_timeout);
        dst.put_bytes(0, 6);
        dst.put_u64(self.cookie);
        dst.put_u64(self.packet_count);
        dst.put_u64(self.byte_count);
    }
}

/// Typed stats-reply body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsBody {
    Flow(Vec<FlowStats>),
    Other { kind: u16, data: Bytes },
}

/// A statistics reply message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsReply {
    pub xid: u32,
    pub flags: u16,
    pub body: StatsBody,
}

impl StatsReply {
    pub fn flows(xid: u32, entries: Vec<FlowStats>) -> Self {
        Self {
            xid,
            flags: 0,
            body: StatsBody::Flow(entries),
        }
    }

    pub fn kind(&self) -> StatsKind {
        match &self.body {
            StatsBody::Flow(_) => StatsKind::Flow,
            StatsBody::Other { kind, .. } => StatsKind::from_u16(*kind),
        }
    }

    pub(crate) fn decode(xid: u32, buf: &mut &[u8]) -> Result<Self, CodecError> {
        if buf.remaining() < 4 {
            return Err(CodecError::Truncated("stats reply"));
        }
        let kind = buf.get_u16();
        let flags = buf.get_u16();
        let body = match StatsKind::from_u16(kind) {
            StatsKind::Flow => {
                let mut entries = Vec::new();
                while buf.has_remaining() {
                    entries.push(FlowStats::decode(buf)?);
                }
                StatsBody::Flow(entries)
            }
            _ => StatsBody::Other {
                kind,
                data: Bytes::copy_from_slice(buf),
            },
        };
        Ok(Self { xid, flags, body })
    }

    pub(crate) fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_u16(self.kind().as_u16());
        dst.put_u16(self.flags);
        match &self.body {
            StatsBody::Flow(entries) => {
                for entry in entries {
                    entry.encode(dst);
                }
            }
            StatsBody::Other { data, .. } => dst.put_slice(data),
        }
    }
}

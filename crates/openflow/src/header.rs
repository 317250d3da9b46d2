//! The fixed 8-byte header shared by every OpenFlow message.

use bytes::{Buf, BufMut, BytesMut};

use crate::CodecError;

/// The protocol version this codec speaks (OpenFlow 1.0).
pub const OFP_VERSION: u8 = 0x01;

/// Wire size of the fixed header.
pub const HEADER_LEN: usize = 8;

/// Message kinds understood by the codec.
///
/// Discriminants are the OpenFlow 1.0 `ofp_type` codes. Types the core has
/// no use for (vendor, packet-in, flow-mod, ...) are rejected at decode
/// time as [`CodecError::UnknownKind`]; the core never observes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageKind {
    Hello = 0,
    Error = 1,
    EchoRequest = 2,
    EchoReply = 3,
    FeaturesRequest = 5,
    FeaturesReply = 6,
    StatsRequest = 16,
    StatsReply = 17,
}

impl MessageKind {
    /// Map a wire type code to a kind.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Hello),
            1 => Some(Self::Error),
            2 => Some(Self::EchoRequest),
            3 => Some(Self::EchoReply),
            5 => Some(Self::FeaturesRequest),
            6 => Some(Self::FeaturesReply),
            16 => Some(Self::StatsRequest),
            17 => Some(Self::StatsReply),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Decoded fixed header: version, kind, total length, transaction id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u8,
    pub kind: MessageKind,
    /// Total message length including the header itself.
    pub length: u16,
    pub xid: u32,
}

impl Header {
    pub fn new(version: u8, kind: MessageKind, length: u16, xid: u32) -> Self {
        Self {
            version,
            kind,
            length,
            xid,
        }
    }

    /// Parse the fixed header from the first [`HEADER_LEN`] bytes of a frame.
    pub fn decode(mut buf: &[u8]) -> Result<Self, CodecError> {
        if buf.remaining() < HEADER_LEN {
            return Err(CodecError::Truncated("header"));
        }
        let version = buf.get_u8();
        let raw_kind = buf.get_u8();
        let kind = MessageKind::from_u8(raw_kind).ok_or(CodecError::UnknownKind(raw_kind))?;
        let length = buf.get_u16();
        if (length as usize) < HEADER_LEN {
            return Err(CodecError::BadLength {
                context: "header",
                length,
            });
        }
        let xid = buf.get_u32();
        Ok(Self {
            version,
            kind,
            length,
            xid,
        })
    }

    pub fn encode(&self, dst: &mut BytesMut) {
        dst.put_u8(self.version);
        dst.put_u8(self.kind.as_u8());
        dst.put_u16(self.length);
        dst.put_u32(self.xid);
    }

    /// Number of body bytes following the header.
    pub fn body_len(&self) -> usize {
        (self.length as usize).saturating_sub(HEADER_LEN)
    }
}

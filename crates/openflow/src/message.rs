//! The tagged message envelope and the simple symmetric bodies.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{
    CodecError, HEADER_LEN, Header, MessageKind, OFP_VERSION, StatsReply, StatsRequest,
    SwitchFeatures,
};

/// Version negotiation greeting. Carries no body; the interesting part is
/// the version byte in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hello {
    pub version: u8,
    pub xid: u32,
}

impl Hello {
    pub fn new() -> Self {
        Self {
            version: OFP_VERSION,
            xid: 0,
        }
    }
}

impl Default for Hello {
    fn default() -> Self {
        Self::new()
    }
}

/// Liveness probe body, shared by request and reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Echo {
    pub xid: u32,
    /// Arbitrary payload; a reply carries the request's payload back.
    pub data: Bytes,
}

impl Echo {
    pub fn new(xid: u32) -> Self {
        Self {
            xid,
            data: Bytes::new(),
        }
    }

    /// Build the reply answering this probe: same xid, payload echoed.
    pub fn reply(&self) -> Self {
        self.clone()
    }
}

/// Error classes (`ofp_error_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    HelloFailed,
    BadRequest,
    BadAction,
    FlowModFailed,
    PortModFailed,
    QueueOpFailed,
    Other(u16),
}

impl ErrorType {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => Self::HelloFailed,
            1 => Self::BadRequest,
            2 => Self::BadAction,
            3 => Self::FlowModFailed,
            4 => Self::PortModFailed,
            5 => Self::QueueOpFailed,
            other => Self::Other(other),
        }
    }

    pub fn as_u16(self) -> u16 {
        match self {
            Self::HelloFailed => 0,
            Self::BadRequest => 1,
            Self::BadAction => 2,
            Self::FlowModFailed => 3,
            Self::PortModFailed => 4,
            Self::QueueOpFailed => 5,
            Self::Other(other) => other,
        }
    }
}

/// Codes refining [`ErrorType::HelloFailed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum HelloFailedCode {
    Incompatible = 0,
    PermissionsError = 1,
}

/// An error notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMsg {
    pub xid: u32,
    pub error_type: ErrorType,
    pub code: u16,
    /// At least 64 bytes of the offending message, per protocol convention.
    pub data: Bytes,
}

impl ErrorMsg {
    /// The negotiation-failure notice: hello failed, incompatible version.
    pub fn hello_failed(xid: u32, code: HelloFailedCode) -> Self {
        Self {
            xid,
            error_type: ErrorType::HelloFailed,
            code: code as u16,
            data: Bytes::new(),
        }
    }

    pub fn is_hello_failed(&self) -> bool {
        self.error_type == ErrorType::HelloFailed
    }

    fn decode(xid: u32, buf: &mut &[u8]) -> Result<Self, CodecError> {
        if buf.remaining() < 4 {
            return Err(CodecError::Truncated("error message"));
        }
        let error_type = ErrorType::from_u16(buf.get_u16());
        let code = buf.get_u16();
        Ok(Self {
            xid,
            error_type,
            code,
            data: Bytes::copy_from_slice(buf),
        })
    }

    fn encode_body(&self, dst: &mut BytesMut) {
        dst.put_u16(self.error_type.as_u16());
        dst.put_u16(self.code);
        dst.put_slice(&self.data);
    }
}

/// Capability query. Empty body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeaturesRequest {
    pub xid: u32,
}

impl FeaturesRequest {
    pub fn new() -> Self {
        Self { xid: 0 }
    }
}

impl Default for FeaturesRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// A fully decoded protocol message, tagged by [`MessageKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Hello(Hello),
    Error(ErrorMsg),
    EchoRequest(Echo),
    EchoReply(Echo),
    FeaturesRequest(FeaturesRequest),
    FeaturesReply(SwitchFeatures),
    StatsRequest(StatsRequest),
    StatsReply(StatsReply),
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Hello(_) => MessageKind::Hello,
            Self::Error(_) => MessageKind::Error,
            Self::EchoRequest(_) => MessageKind::EchoRequest,
            Self::EchoReply(_) => MessageKind::EchoReply,
            Self::FeaturesRequest(_) => MessageKind::FeaturesRequest,
            Self::FeaturesReply(_) => MessageKind::FeaturesReply,
            Self::StatsRequest(_) => MessageKind::StatsRequest,
            Self::StatsReply(_) => MessageKind::StatsReply,
        }
    }

    pub fn xid(&self) -> u32 {
        match self {
            Self::Hello(hello) => hello.xid,
            Self::Error(error) => error.xid,
            Self::EchoRequest(echo) | Self::EchoReply(echo) => echo.xid,
            Self::FeaturesRequest(request) => request.xid,
            Self::FeaturesReply(features) => features.xid,
            Self::StatsRequest(request) => request.xid,
            Self::StatsReply(reply) => reply.xid,
        }
    }

    /// Version byte written into the header. Hello carries its own declared
    /// version; everything else speaks the codec's version.
    pub fn version(&self) -> u8 {
        match self {
            Self::Hello(hello) => hello.version,
            _ => OFP_VERSION,
        }
    }

    /// Decode the body bytes following an already-parsed header.
    pub fn decode(header: &Header, body: &[u8]) -> Result<Self, CodecError> {
        let mut buf = body;
        match header.kind {
            // trailing hello elements are tolerated for forward compatibility
            MessageKind::Hello => Ok(Self::Hello(Hello {
                version: header.version,
                xid: header.xid,
            })),
            MessageKind::Error => ErrorMsg::decode(header.xid, &mut buf).map(Self::Error),
            MessageKind::EchoRequest => Ok(Self::EchoRequest(Echo {
                xid: header.xid,
                data: Bytes::copy_from_slice(body),
            })),
            MessageKind::EchoReply => Ok(Self::EchoReply(Echo {
                xid: header.xid,
                data: Bytes::copy_from_slice(body),
            })),
            MessageKind::FeaturesRequest => Ok(Self::FeaturesRequest(FeaturesRequest {
                xid: header.xid,
            })),
            MessageKind::FeaturesReply => {
                SwitchFeatures::decode(header.xid, &mut buf).map(Self::FeaturesReply)
            }
            MessageKind::StatsRequest => {
                StatsRequest::decode(header.xid, &mut buf).map(Self::StatsRequest)
            }
            MessageKind::StatsReply => {
                StatsReply::decode(header.xid, &mut buf).map(Self::StatsReply)
            }
        }
    }

    /// Encode header and body into a fresh buffer.
    pub fn encode(&self) -> BytesMut {
        let mut body = BytesMut::new();
        self.encode_body(&mut body);
        let mut out = BytesMut::with_capacity(HEADER_LEN + body.len());
        let header = Header::new(
            self.version(),
            self.kind(),
            (HEADER_LEN + body.len()) as u16,
            self.xid(),
        );
        header.encode(&mut out);
        out.extend_from_slice(&body);
        out
    }

    fn encode_body(&self, dst: &mut BytesMut) {
        match self {
            Self::Hello(_) | Self::FeaturesRequest(_) => {}
            Self::Error(error) => error.encode_body(dst),
            Self::EchoRequest(echo) | Self::EchoReply(echo) => dst.put_slice(&echo.data),
            Self::FeaturesReply(features) => features.encode_body(dst),
            Self::StatsRequest(request) => request.encode_body(dst),
            Self::StatsReply(reply) => reply.encode_body(dst),
        }
    }
}

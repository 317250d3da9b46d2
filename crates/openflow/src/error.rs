/// Errors raised while decoding a frame into a typed message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The header declares a message type this codec does not know.
    #[error("unknown message type {0:#04x}")]
    UnknownKind(u8),
    /// The buffer ended before the structure was complete.
    #[error("truncated frame while reading {0}")]
    Truncated(&'static str),
    /// A length field is inconsistent with the enclosing structure.
    #[error("invalid length field {length} while reading {context}")]
    BadLength { context: &'static str, length: u16 },
}

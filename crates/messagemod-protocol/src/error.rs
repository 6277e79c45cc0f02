//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization of a frame failed (malformed JSON, missing fields).
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A submission buffer is truncated or corrupt: the declared length
    /// does not match the available bytes, the length prefix itself is
    /// unreadable, or the message body does not parse.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// A frame that decoded fine but violates protocol rules, e.g. a
    /// connection whose first frame is not `Hello`.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

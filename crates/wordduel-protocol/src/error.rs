//! Error types for the protocol layer.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing required fields,
    /// or wrong data types.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The envelope's `type` is not a request kind this server knows.
    #[error("unknown message type: {0}")]
    UnknownType(String),

    /// The message is well-formed JSON but violates protocol rules.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

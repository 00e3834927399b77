//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The server doesn't care HOW envelopes are serialized; it just needs
//! something that implements the [`Codec`] trait. Framing (one message
//! per line) is left to the transport.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses compact JSON (via `serde_json`).
///
/// Compact output never contains a raw newline, which is what lets the
/// line transport use `\n` as the frame delimiter.
///
/// ## Example
///
/// ```rust
/// use wordduel_protocol::{Codec, Envelope, JsonCodec, ServerResponse};
///
/// let codec = JsonCodec;
/// let envelope = ServerResponse::Winner("alice".into()).to_envelope().unwrap();
///
/// let bytes = codec.encode(&envelope).unwrap();
/// assert_eq!(bytes, br#"{"type":"protocol.winner","data":"alice"}"#);
///
/// let decoded: Envelope = codec.decode(&bytes).unwrap();
/// assert_eq!(envelope, decoded);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Envelope;

    #[test]
    fn test_encode_has_no_newlines() {
        let env = Envelope {
            kind: "protocol.invalid_request".into(),
            data: serde_json::json!("line one\nline two"),
        };
        let bytes = JsonCodec.encode(&env).unwrap();
        assert!(!bytes.contains(&b'\n'));
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let result: Result<Envelope, _> = JsonCodec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}

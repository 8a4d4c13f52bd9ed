//! Command and result-envelope types for eventcreator.
//!
//! The UI and the background service talk through one-shot request/response
//! messages. Each request is a [`Command`]; each reply is a
//! [`ResultEnvelope`], `{"success": true, ...payload}` or
//! `{"success": false, "error": "..."}`.
//!
//! # Example
//!
//! ```rust
//! use eventcreator_protocol::{decode_command, encode_envelope, Command, ResultEnvelope};
//!
//! let command = decode_command(r#"{"action": "checkAuth"}"#).unwrap();
//! assert_eq!(command, Command::CheckAuth);
//!
//! let reply = encode_envelope(&ResultEnvelope::authenticated(true)).unwrap();
//! assert_eq!(reply, r#"{"success":true,"authenticated":true}"#);
//! ```

mod error;
mod types;

pub use error::{ProtocolError, ProtocolResult};
pub use types::{Command, Payload, ResultEnvelope};

/// Parses a raw JSON command.
pub fn decode_command(raw: &str) -> ProtocolResult<Command> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ProtocolError::EmptyMessage);
    }
    Ok(serde_json::from_str(raw)?)
}

/// Serializes an envelope to compact JSON.
pub fn encode_envelope(envelope: &ResultEnvelope) -> ProtocolResult<String> {
    Ok(serde_json::to_string(envelope)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_empty_message() {
        assert!(matches!(
            decode_command("  "),
            Err(ProtocolError::EmptyMessage)
        ));
    }

    #[test]
    fn decode_invalid_json() {
        assert!(matches!(
            decode_command("{not json"),
            Err(ProtocolError::Serialization(_))
        ));
    }

    #[test]
    fn encode_failure_envelope() {
        let json = encode_envelope(&ResultEnvelope::failure("boom")).unwrap();
        assert_eq!(json, r#"{"success":false,"error":"boom"}"#);
    }
}

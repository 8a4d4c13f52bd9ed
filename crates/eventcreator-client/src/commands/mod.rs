//! Subcommand implementations.

pub mod auth;
pub mod config;
pub mod event;

use eventcreator_protocol::{Payload, ResultEnvelope};

use crate::error::{ClientError, ClientResult};

/// Prints `envelope` as JSON when `json` is set.
///
/// A failed envelope becomes [`ClientError::Command`] either way, so the
/// process exits non-zero. On success returns the payload for rendering,
/// or `None` when it was already printed.
pub(crate) fn finish(envelope: ResultEnvelope, json: bool) -> ClientResult<Option<Payload>> {
    if json {
        let text = serde_json::to_string_pretty(&envelope)
            .map_err(|e| ClientError::Command(format!("failed to encode reply: {}", e)))?;
        println!("{}", text);
    }

    if let Some(message) = envelope.error() {
        return Err(ClientError::Command(message.to_string()));
    }

    Ok(if json { None } else { Some(envelope.payload) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_becomes_command_error() {
        let err = finish(ResultEnvelope::failure("Invalid colorId"), false).unwrap_err();
        assert!(matches!(err, ClientError::Command(ref m) if m == "Invalid colorId"));
        assert_eq!(err.to_string(), "Invalid colorId");
    }

    #[test]
    fn success_yields_payload_unless_printed() {
        let payload = finish(ResultEnvelope::token("at"), false).unwrap();
        assert_eq!(
            payload,
            Some(Payload::Token {
                token: "at".to_string()
            })
        );
        assert_eq!(finish(ResultEnvelope::empty(), true).unwrap(), None);
    }
}

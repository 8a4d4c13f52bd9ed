//! Command and envelope types for the eventcreator message channel.

use eventcreator_core::{CalendarSummary, EventColors, EventDraft};
use serde::{Deserialize, Serialize};

/// Commands the UI can send to the background service.
///
/// On the wire a command is a JSON object tagged by `action`:
///
/// ```json
/// {"action": "createEvent", "event": {"title": "T", "start": "...", "end": "..."}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Command {
    /// Is a session stored? Presence check only, no expiry check.
    CheckAuth,

    /// Report the redirect URI and client id used for sign-in.
    #[serde(rename = "getRedirectURI")]
    GetRedirectUri,

    /// Run the interactive sign-in flow.
    Authenticate,

    /// Forget the stored session.
    Logout,

    /// List calendars the user can write to.
    GetCalendars,

    /// Fetch the event color palette.
    GetColors,

    /// Publish an event.
    CreateEvent {
        /// The event to create.
        event: EventDraft,
    },
}

impl Command {
    /// Creates a CreateEvent command.
    pub fn create_event(event: EventDraft) -> Self {
        Self::CreateEvent { event }
    }

    /// Returns the wire name of this command.
    pub fn action(&self) -> &'static str {
        match self {
            Self::CheckAuth => "checkAuth",
            Self::GetRedirectUri => "getRedirectURI",
            Self::Authenticate => "authenticate",
            Self::Logout => "logout",
            Self::GetCalendars => "getCalendars",
            Self::GetColors => "getColors",
            Self::CreateEvent { .. } => "createEvent",
        }
    }
}

/// Operation-specific fields of a [`ResultEnvelope`].
///
/// Serialized flat next to `success`, so `Payload::Token` produces
/// `{"success": true, "token": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Auth {
        authenticated: bool,
    },
    RedirectUri {
        #[serde(rename = "redirectURI")]
        redirect_uri: String,
        #[serde(rename = "clientId")]
        client_id: String,
    },
    Token {
        token: String,
    },
    Calendars {
        calendars: Vec<CalendarSummary>,
    },
    Colors {
        colors: EventColors,
    },
    EventCreated {
        #[serde(rename = "eventId")]
        event_id: String,
        #[serde(rename = "eventLink")]
        event_link: Option<String>,
    },
    Error {
        error: String,
    },
    Empty {},
}

/// The uniform reply to every [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultEnvelope {
    pub success: bool,
    #[serde(flatten)]
    pub payload: Payload,
}

impl ResultEnvelope {
    /// A successful reply carrying `payload`.
    pub fn ok(payload: Payload) -> Self {
        Self {
            success: true,
            payload,
        }
    }

    /// A successful reply with no payload.
    pub fn empty() -> Self {
        Self::ok(Payload::Empty {})
    }

    /// A failed reply: `{"success": false, "error": message}`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: Payload::Error {
                error: message.into(),
            },
        }
    }

    pub fn authenticated(authenticated: bool) -> Self {
        Self::ok(Payload::Auth { authenticated })
    }

    pub fn redirect_uri(redirect_uri: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self::ok(Payload::RedirectUri {
            redirect_uri: redirect_uri.into(),
            client_id: client_id.into(),
        })
    }

    pub fn token(token: impl Into<String>) -> Self {
        Self::ok(Payload::Token {
            token: token.into(),
        })
    }

    pub fn calendars(calendars: Vec<CalendarSummary>) -> Self {
        Self::ok(Payload::Calendars { calendars })
    }

    pub fn colors(colors: EventColors) -> Self {
        Self::ok(Payload::Colors { colors })
    }

    pub fn event_created(event_id: impl Into<String>, event_link: Option<String>) -> Self {
        Self::ok(Payload::EventCreated {
            event_id: event_id.into(),
            event_link,
        })
    }

    /// Returns true if the operation succeeded.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Returns the error message of a failed reply.
    pub fn error(&self) -> Option<&str> {
        match self.payload {
            Payload::Error { ref error } => Some(error),
            _ => None,
        }
    }
}

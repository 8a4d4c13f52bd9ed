//! Event drafts: what the user dictated or typed, ready to publish.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Calendar used when a draft names none.
pub const DEFAULT_CALENDAR_ID: &str = "primary";

/// Validation failures for a draft, with user-facing messages.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("Please enter an event title")]
    MissingTitle,

    #[error("Event end must not be before its start")]
    EndBeforeStart,
}

/// A single event to create. Never persisted beyond one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "crate::time::flexible_instant")]
    pub start: DateTime<Utc>,
    #[serde(with = "crate::time::flexible_instant")]
    pub end: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_id: Option<String>,
}

impl EventDraft {
    /// Creates a draft on the default calendar with no description or color.
    pub fn new(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            start,
            end,
            calendar_id: None,
            color_id: None,
        }
    }

    /// Builder: set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder: use the dictated transcript when no description was typed.
    pub fn with_transcript_fallback(mut self, transcript: &str) -> Self {
        if self.description.trim().is_empty() {
            self.description = transcript.trim().to_string();
        }
        self
    }

    /// Builder: set the target calendar.
    pub fn with_calendar_id(mut self, calendar_id: impl Into<String>) -> Self {
        self.calendar_id = Some(calendar_id.into());
        self
    }

    /// Builder: set the event color.
    pub fn with_color_id(mut self, color_id: impl Into<String>) -> Self {
        self.color_id = Some(color_id.into());
        self
    }

    /// Target calendar, defaulting to [`DEFAULT_CALENDAR_ID`] when unset or blank.
    pub fn calendar_id(&self) -> &str {
        match self.calendar_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => DEFAULT_CALENDAR_ID,
        }
    }

    /// Event color, if one was chosen.
    pub fn color_id(&self) -> Option<&str> {
        self.color_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Checks the draft before it is sent, trimming the title in place.
    pub fn validate(&mut self) -> Result<(), DraftError> {
        self.title = self.title.trim().to_string();
        if self.title.is_empty() {
            return Err(DraftError::MissingTitle);
        }
        if self.end < self.start {
            return Err(DraftError::EndBeforeStart);
        }
        Ok(())
    }
}

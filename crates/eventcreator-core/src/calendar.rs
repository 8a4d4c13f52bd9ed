//! Calendar and event-color types.
//!
//! These are read-only projections of Google Calendar data handed to the UI
//! layer; none of them are persisted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Event color id used when nothing better is known.
pub const DEFAULT_EVENT_COLOR_ID: &str = "1";

/// Display names of the eleven Google Calendar event colors, indexed by id.
pub const EVENT_COLOR_NAMES: [(&str, &str); 11] = [
    ("1", "Lavender"),
    ("2", "Sage"),
    ("3", "Grape"),
    ("4", "Flamingo"),
    ("5", "Banana"),
    ("6", "Tangerine"),
    ("7", "Peacock"),
    ("8", "Graphite"),
    ("9", "Blueberry"),
    ("10", "Basil"),
    ("11", "Tomato"),
];

/// A writable calendar as presented to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSummary {
    /// Calendar identifier (e.g. `primary` or an email address).
    pub id: String,
    /// Human-readable name. Falls back to the id when the provider has none.
    pub summary: String,
    /// Calendar color id (1-24 in Google's calendar palette).
    pub color_id: Option<String>,
    /// Background color as a hex string.
    pub background_color: Option<String>,
    /// Whether this is the user's primary calendar.
    pub primary: bool,
}

impl CalendarSummary {
    /// Creates a summary with only an id and name.
    pub fn new(id: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            summary: summary.into(),
            color_id: None,
            background_color: None,
            primary: false,
        }
    }

    /// Builder: mark as primary.
    pub fn with_primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    /// Builder: set the calendar color id.
    pub fn with_color_id(mut self, color_id: impl Into<String>) -> Self {
        self.color_id = Some(color_id.into());
        self
    }

    /// Event color that matches this calendar's own color.
    pub fn default_event_color(&self) -> &'static str {
        calendar_color_to_event_color(self.color_id.as_deref())
    }
}

/// A single entry of the event color palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventColor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground: Option<String>,
}

/// Event color palette keyed by color id (`"1"`..`"11"`).
pub type EventColors = BTreeMap<String, EventColor>;

/// Returns the display name for an event color id, if it is one of the known ids.
pub fn event_color_name(color_id: &str) -> Option<&'static str> {
    EVENT_COLOR_NAMES
        .iter()
        .find(|(id, _)| *id == color_id)
        .map(|(_, name)| *name)
}

/// Maps a calendar color id (1-24) onto the event palette (1-11).
///
/// Ids already inside the event range map to themselves; anything else,
/// including a missing or non-numeric id, maps to [`DEFAULT_EVENT_COLOR_ID`].
pub fn calendar_color_to_event_color(calendar_color_id: Option<&str>) -> &'static str {
    calendar_color_id
        .and_then(|id| id.trim().parse::<u8>().ok())
        .and_then(|id| {
            EVENT_COLOR_NAMES
                .iter()
                .find(|(event_id, _)| event_id.parse::<u8>().ok() == Some(id))
                .map(|(event_id, _)| *event_id)
        })
        .unwrap_or(DEFAULT_EVENT_COLOR_ID)
}

/// The id of the primary calendar, or `"primary"` when none is flagged.
pub fn primary_calendar_id(calendars: &[CalendarSummary]) -> &str {
    calendars
        .iter()
        .find(|c| c.primary)
        .map(|c| c.id.as_str())
        .unwrap_or("primary")
}

//! Core types: calendars, event colors, event drafts, time helpers, tracing setup.

pub mod calendar;
pub mod draft;
pub mod time;
pub mod tracing;

pub use calendar::{
    calendar_color_to_event_color, event_color_name, primary_calendar_id, CalendarSummary,
    EventColor, EventColors, DEFAULT_EVENT_COLOR_ID, EVENT_COLOR_NAMES,
};
pub use draft::{DraftError, EventDraft, DEFAULT_CALENDAR_ID};
pub use time::{
    default_event_window, format_datetime_local, local_timezone, parse_instant, to_iso_utc,
    TimeError,
};
pub use tracing::{init_tracing, TracingConfig, TracingError, TracingOutputFormat};

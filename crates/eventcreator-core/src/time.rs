//! Time helpers for event drafts.
//!
//! Event start/end instants arrive either as RFC 3339 timestamps or in the
//! `YYYY-MM-DDTHH:MM` form produced by `datetime-local` pickers. The latter
//! carry no offset and are interpreted in the host's local time zone.

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeDelta, TimeZone, Utc};
use thiserror::Error;
use tracing::warn;

/// Format used by `datetime-local` inputs.
pub const DATETIME_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Same as [`DATETIME_LOCAL_FORMAT`] with seconds, which some pickers emit.
const DATETIME_LOCAL_SECONDS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Time zone reported when the host zone cannot be determined.
pub const FALLBACK_TIMEZONE: &str = "UTC";

/// Default length of a new event, in minutes.
pub const DEFAULT_EVENT_MINUTES: i64 = 60;

/// Errors produced while parsing event instants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeError {
    /// The value is empty.
    #[error("missing date/time value")]
    Empty,

    /// The value matches none of the accepted formats.
    #[error("invalid date/time '{0}': expected RFC 3339 or YYYY-MM-DDTHH:MM")]
    Invalid(String),

    /// The local time does not exist in the host zone (DST gap).
    #[error("local time '{0}' does not exist in the current time zone")]
    NonExistent(String),
}

/// Parses an event instant.
///
/// Accepts RFC 3339 (`2024-03-15T10:00:00Z`, `2024-03-15T10:00:00+02:00`)
/// or a local `datetime-local` value (`2024-03-15T10:00`). Ambiguous local
/// times (DST overlap) resolve to the earlier instant.
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>, TimeError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(TimeError::Empty);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(value, DATETIME_LOCAL_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, DATETIME_LOCAL_SECONDS_FORMAT))
        .map_err(|_| TimeError::Invalid(value.to_string()))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| TimeError::NonExistent(value.to_string()))
}

/// Formats an instant as an ISO-8601 UTC timestamp with milliseconds.
///
/// This is the `dateTime` representation sent to the Calendar API.
pub fn to_iso_utc(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Formats an instant as a `datetime-local` value in the host time zone.
pub fn format_datetime_local(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Local)
        .format(DATETIME_LOCAL_FORMAT)
        .to_string()
}

/// Returns the `(start, end)` window for a new event starting at `start`.
///
/// `minutes` is the event length; [`DEFAULT_EVENT_MINUTES`] when the caller
/// has no preference. An end past the representable range is clamped.
pub fn default_event_window(
    start: DateTime<Utc>,
    minutes: i64,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let end = TimeDelta::try_minutes(minutes)
        .and_then(|length| start.checked_add_signed(length))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    (start, end)
}

/// Returns the host's IANA time zone name (e.g. `Europe/Paris`).
///
/// Falls back to [`FALLBACK_TIMEZONE`] when the zone cannot be determined.
pub fn local_timezone() -> String {
    match iana_time_zone::get_timezone() {
        Ok(tz) if !tz.is_empty() => tz,
        Ok(_) => FALLBACK_TIMEZONE.to_string(),
        Err(e) => {
            warn!("could not determine local time zone: {}", e);
            FALLBACK_TIMEZONE.to_string()
        }
    }
}

/// Serde adapter for instants that accepts both RFC 3339 and `datetime-local` input.
///
/// Serializes as [`to_iso_utc`].
pub mod flexible_instant {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::to_iso_utc(dt))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_instant(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rfc3339_utc() {
        let dt = parse_instant("2024-03-15T10:00:00Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap());
    }

    #[test]
    fn parse_rfc3339_with_offset() {
        let dt = parse_instant("2024-03-15T12:00:00+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap());
    }

    #[test]
    fn parse_datetime_local_uses_host_zone() {
        let dt = parse_instant("2024-03-15T10:30").unwrap();
        assert_eq!(format_datetime_local(&dt), "2024-03-15T10:30");
    }

    #[test]
    fn parse_datetime_local_with_seconds() {
        let with_seconds = parse_instant("2024-03-15T10:30:00").unwrap();
        let without = parse_instant("2024-03-15T10:30").unwrap();
        assert_eq!(with_seconds, without);
    }

    #[test]
    fn parse_rejects_empty_and_garbage() {
        assert_eq!(parse_instant("   "), Err(TimeError::Empty));
        assert!(matches!(
            parse_instant("next tuesday"),
            Err(TimeError::Invalid(_))
        ));
    }

    #[test]
    fn iso_utc_has_millis_and_z() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        assert_eq!(to_iso_utc(&dt), "2024-03-15T10:00:00.000Z");
    }

    #[test]
    fn default_window_is_one_hour() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 23, 30, 0).unwrap();
        let (start, end) = default_event_window(now, DEFAULT_EVENT_MINUTES);
        assert_eq!(start, now);
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 3, 16, 0, 30, 0).unwrap());

        let (_, end) = default_event_window(now, 15);
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 3, 15, 23, 45, 0).unwrap());

        let (_, end) = default_event_window(now, i64::MAX);
        assert_eq!(end, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn local_timezone_is_never_empty() {
        assert!(!local_timezone().is_empty());
    }
}

//! Calendar listing and event creation.

use chrono::{DateTime, Utc};
use tracing::debug;

use eventcreator_core::{
    EventDraft, default_event_window, event_color_name, format_datetime_local, parse_instant,
    primary_calendar_id,
};
use eventcreator_protocol::{Command, Payload};
use eventcreator_server::BackgroundHandle;

use super::finish;
use crate::cli::CreateArgs;
use crate::config::EventDefaults;
use crate::error::{ClientError, ClientResult};

/// Lists calendars the user can write to.
pub async fn calendars(handle: &BackgroundHandle, json: bool) -> ClientResult<()> {
    let reply = handle.send(Command::GetCalendars).await?;
    let Some(Payload::Calendars { calendars }) = finish(reply, json)? else {
        return Ok(());
    };

    if calendars.is_empty() {
        println!("No writable calendars.");
        return Ok(());
    }

    let primary = primary_calendar_id(&calendars).to_string();
    for calendar in &calendars {
        let marker = if calendar.id == primary { "*" } else { " " };
        let color = calendar.default_event_color();
        println!(
            "{} {}  {}  (event color {} {})",
            marker,
            calendar.summary,
            calendar.id,
            color,
            event_color_name(color).unwrap_or("?")
        );
    }
    Ok(())
}

/// Shows the event color palette.
pub async fn colors(handle: &BackgroundHandle, json: bool) -> ClientResult<()> {
    let reply = handle.send(Command::GetColors).await?;
    let Some(Payload::Colors { colors }) = finish(reply, json)? else {
        return Ok(());
    };

    let mut entries: Vec<_> = colors.iter().collect();
    // ids are numeric strings
    entries.sort_by_key(|(id, _)| id.parse::<u32>().unwrap_or(u32::MAX));
    for (id, color) in entries {
        println!(
            "{:>2}  {:<10} {}",
            id,
            event_color_name(id).unwrap_or("-"),
            color.background.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

/// Publishes a new event.
pub async fn create(
    handle: &BackgroundHandle,
    args: CreateArgs,
    defaults: &EventDefaults,
    json: bool,
) -> ClientResult<()> {
    let draft = build_draft(&args, defaults, Utc::now())?;
    debug!(calendar_id = draft.calendar_id(), "sending draft");

    let start = format_datetime_local(&draft.start);
    let reply = handle.send(Command::create_event(draft)).await?;
    if let Some(Payload::EventCreated {
        event_id,
        event_link,
    }) = finish(reply, json)?
    {
        println!("Event created ({}) starting {}", event_id, start);
        if let Some(link) = event_link {
            println!("{}", link);
        }
    }
    Ok(())
}

/// Builds a draft from command-line input and configured defaults.
///
/// A missing start means `now`; a missing end means start plus the
/// configured duration.
pub(crate) fn build_draft(
    args: &CreateArgs,
    defaults: &EventDefaults,
    now: DateTime<Utc>,
) -> ClientResult<EventDraft> {
    let start = match args.start {
        Some(ref value) => parse_instant(value)?,
        None => now,
    };
    let (start, default_end) = default_event_window(start, defaults.duration_minutes);
    let end = match args.end {
        Some(ref value) => parse_instant(value)?,
        None => default_end,
    };

    let mut draft = EventDraft::new(args.title.clone(), start, end)
        .with_description(args.description.clone().unwrap_or_default());
    if let Some(ref transcript) = args.transcript {
        draft = draft.with_transcript_fallback(transcript);
    }
    if let Some(calendar) = args.calendar.as_ref().or(defaults.calendar_id.as_ref()) {
        draft = draft.with_calendar_id(calendar.clone());
    }
    if let Some(color) = args.color.as_ref().or(defaults.color_id.as_ref()) {
        if event_color_name(color.trim()).is_none() {
            return Err(ClientError::Input(format!(
                "unknown event color `{}`, see `eventcreator colors`",
                color
            )));
        }
        draft = draft.with_color_id(color.clone());
    }

    Ok(draft)
}

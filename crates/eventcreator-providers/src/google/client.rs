//! Google Calendar API client.
//!
//! Every call asks the [`TokenBroker`] for a valid access token first and
//! then issues exactly one request. Nothing is retried.

use std::sync::Arc;

use eventcreator_core::{CalendarSummary, EventColors, EventDraft, local_timezone, to_iso_utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderResult};

use super::broker::TokenBroker;
use super::config::GoogleConfig;
use super::oauth::build_http_client;

const CALENDARS_FALLBACK: &str = "Failed to fetch calendars";
const COLORS_FALLBACK: &str = "Failed to fetch colors";
const CREATE_EVENT_FALLBACK: &str = "Failed to create event";

/// Identifiers of a newly created event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEvent {
    pub id: String,
    #[serde(default)]
    pub html_link: Option<String>,
}

/// Google Calendar API client.
#[derive(Debug)]
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    api_base: String,
    timezone: Option<String>,
    broker: Arc<TokenBroker>,
}

impl GoogleCalendarClient {
    pub fn new(config: &GoogleConfig, broker: Arc<TokenBroker>) -> ProviderResult<Self> {
        Ok(Self {
            http_client: build_http_client(config.timeout, &config.user_agent)?,
            api_base: config.api_base.clone(),
            timezone: config.timezone.clone(),
            broker,
        })
    }

    pub fn broker(&self) -> &TokenBroker {
        &self.broker
    }

    /// Lists calendars the user can write to.
    pub async fn list_calendars(&self) -> ProviderResult<Vec<CalendarSummary>> {
        let token = self.broker.get_valid_access_token().await?;
        let url = format!("{}/users/me/calendarList", self.api_base);

        let request = self
            .http_client
            .get(&url)
            .bearer_auth(&token)
            .query(&[("minAccessRole", "writer")]);

        let list: CalendarListResponse = self.send(request, CALENDARS_FALLBACK).await?;
        debug!("fetched {} writable calendars", list.items.len());
        Ok(list.items.into_iter().map(CalendarListEntry::into_summary).collect())
    }

    /// Fetches the event color palette. Calendar colors are dropped.
    pub async fn list_colors(&self) -> ProviderResult<EventColors> {
        let token = self.broker.get_valid_access_token().await?;
        let url = format!("{}/colors", self.api_base);

        let request = self.http_client.get(&url).bearer_auth(&token);
        let colors: ColorsResponse = self.send(request, COLORS_FALLBACK).await?;
        Ok(colors.event)
    }

    /// Publishes `draft` to its target calendar.
    ///
    /// The draft is validated before a token is requested.
    pub async fn create_event(&self, mut draft: EventDraft) -> ProviderResult<CreatedEvent> {
        draft
            .validate()
            .map_err(|e| ProviderError::invalid_draft(e.to_string()))?;

        let token = self.broker.get_valid_access_token().await?;
        let url = format!(
            "{}/calendars/{}/events",
            self.api_base,
            urlencoding::encode(draft.calendar_id())
        );

        let timezone = self.timezone.clone().unwrap_or_else(local_timezone);
        let body = EventBody {
            summary: &draft.title,
            description: &draft.description,
            color_id: draft.color_id(),
            start: ApiDateTime {
                date_time: to_iso_utc(&draft.start),
                time_zone: &timezone,
            },
            end: ApiDateTime {
                date_time: to_iso_utc(&draft.end),
                time_zone: &timezone,
            },
        };

        let request = self.http_client.post(&url).bearer_auth(&token).json(&body);
        let created: CreatedEvent = self.send(request, CREATE_EVENT_FALLBACK).await?;

        info!("created event {} in calendar {}", created.id, draft.calendar_id());
        Ok(created)
    }

    /// Sends `request` and decodes a 2xx body.
    ///
    /// Error responses surface Google's `error.message`, or `fallback` when
    /// the body carries none.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        fallback: &str,
    ) -> ProviderResult<T> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::transport("request timeout")
            } else if e.is_connect() {
                ProviderError::transport(format!("connection failed: {}", e))
            } else {
                ProviderError::transport(format!("request failed: {}", e))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::transport(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            warn!("Calendar API returned {}", status);
            return Err(ProviderError::api(api_error_message(&body, fallback)));
        }

        serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse response: {}", e))
        })
    }
}

/// Extracts `error.message` from a Google error body.
fn api_error_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<ApiErrorResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .and_then(|e| e.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// Response from the calendarList endpoint.
#[derive(Debug, Deserialize)]
struct CalendarListResponse {
    #[serde(default)]
    items: Vec<CalendarListEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarListEntry {
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    color_id: Option<String>,
    #[serde(default)]
    background_color: Option<String>,
    #[serde(default)]
    primary: bool,
}

impl CalendarListEntry {
    fn into_summary(self) -> CalendarSummary {
        let summary = self
            .summary
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.id.clone());
        CalendarSummary {
            id: self.id,
            summary,
            color_id: self.color_id.filter(|c| !c.is_empty()),
            background_color: self.background_color.filter(|c| !c.is_empty()),
            primary: self.primary,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ColorsResponse {
    #[serde(default)]
    event: EventColors,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventBody<'a> {
    summary: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    color_id: Option<&'a str>,
    start: ApiDateTime<'a>,
    end: ApiDateTime<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiDateTime<'a> {
    date_time: String,
    time_zone: &'a str,
}

//! Command dispatch.
//!
//! Every command produces exactly one [`ResultEnvelope`]. Failures from the
//! broker or the Calendar client become `{"success": false, "error": ...}`
//! and never escape to the caller.

use std::sync::Arc;

use tracing::{Span, debug, info, warn};

use eventcreator_protocol::{Command, ResultEnvelope};
use eventcreator_providers::google::{
    AuthFlowHost, GoogleCalendarClient, GoogleConfig, OAuthClient, SessionStore, TokenBroker,
};
use eventcreator_providers::{ProviderError, ProviderResult};

/// Routes commands to the token broker and the Calendar client.
#[derive(Debug)]
pub struct Dispatcher {
    calendar: GoogleCalendarClient,
}

impl Dispatcher {
    pub fn new(calendar: GoogleCalendarClient) -> Self {
        Self { calendar }
    }

    /// Wires a broker and a Calendar client from `config`.
    pub fn from_config(
        config: &GoogleConfig,
        store: Arc<dyn SessionStore>,
        host: Arc<dyn AuthFlowHost>,
    ) -> ProviderResult<Self> {
        config.validate().map_err(ProviderError::configuration)?;

        let broker = TokenBroker::new(store, OAuthClient::new(config)?, host);
        let calendar = GoogleCalendarClient::new(config, Arc::new(broker))?;
        Ok(Self::new(calendar))
    }

    fn broker(&self) -> &TokenBroker {
        self.calendar.broker()
    }

    /// Handles a single command and returns its reply.
    #[tracing::instrument(skip_all, fields(action = command.action(), success, duration_ms))]
    pub async fn handle(&self, command: Command) -> ResultEnvelope {
        let start = std::time::Instant::now();

        let envelope = match command {
            Command::CheckAuth => {
                debug!("checking for a stored session");
                reply(self.broker().has_session().await, ResultEnvelope::authenticated)
            }
            Command::GetRedirectUri => {
                ResultEnvelope::redirect_uri(self.broker().redirect_uri(), self.broker().client_id())
            }
            Command::Authenticate => {
                info!("starting sign-in");
                reply(self.broker().login().await, ResultEnvelope::token)
            }
            Command::Logout => reply(self.broker().logout().await, |()| ResultEnvelope::empty()),
            Command::GetCalendars => {
                reply(self.calendar.list_calendars().await, ResultEnvelope::calendars)
            }
            Command::GetColors => reply(self.calendar.list_colors().await, ResultEnvelope::colors),
            Command::CreateEvent { event } => {
                debug!(calendar_id = event.calendar_id(), "creating event");
                reply(self.calendar.create_event(event).await, |created| {
                    ResultEnvelope::event_created(created.id, created.html_link)
                })
            }
        };

        let span = Span::current();
        span.record("success", envelope.is_success());
        span.record("duration_ms", start.elapsed().as_millis() as u64);

        envelope
    }
}

/// Converts an operation result into its envelope.
fn reply<T>(result: ProviderResult<T>, ok: impl FnOnce(T) -> ResultEnvelope) -> ResultEnvelope {
    match result {
        Ok(value) => ok(value),
        Err(e) => {
            warn!(
                code = %e.code(),
                sign_in_required = e.requires_login(),
                "command failed: {}",
                e.message()
            );
            ResultEnvelope::failure(e.message())
        }
    }
}

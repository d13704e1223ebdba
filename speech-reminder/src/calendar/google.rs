use async_trait::async_trait;
use chrono::{Local, Utc};
use google_calendar3::api::{Event, Scope};
use google_calendar3::hyper_rustls::HttpsConnector;
use google_calendar3::CalendarHub;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use shared::CalendarEvent;

use super::CalendarSource;
use crate::config::CalendarSettings;
use crate::error::SourceError;

/// Read-only view of a Google calendar.
pub struct GoogleCalendarSource {
    hub: CalendarHub<HttpsConnector<HttpConnector>>,
    calendar_id: String,
}

impl GoogleCalendarSource {
    /// Authenticate with the installed-app flow, reusing cached tokens when present.
    ///
    /// The first run opens a browser consent page and stores the resulting
    /// tokens in `token_cache_file`.
    pub async fn connect(settings: &CalendarSettings) -> Result<Self, SourceError> {
        let secret = google_calendar3::yup_oauth2::read_application_secret(&settings.credentials_file)
            .await
            .map_err(|e| {
                SourceError::Auth(format!(
                    "failed to read OAuth credentials from {}: {}",
                    settings.credentials_file.display(),
                    e
                ))
            })?;

        let auth = google_calendar3::yup_oauth2::InstalledFlowAuthenticator::builder(
            secret,
            google_calendar3::yup_oauth2::InstalledFlowReturnMethod::HTTPRedirect,
        )
        .persist_tokens_to_disk(&settings.token_cache_file)
        .build()
        .await
        .map_err(|e| SourceError::Auth(format!("failed to build authenticator: {}", e)))?;

        let connector = google_calendar3::hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(|e| SourceError::Auth(format!("failed to load native TLS roots: {}", e)))?
            .https_or_http()
            .enable_http1()
            .build();

        let client = Client::builder(TokioExecutor::new()).build(connector);
        let hub = CalendarHub::new(client, auth);

        tracing::info!("Connected to Google calendar '{}'", settings.calendar_id);

        Ok(Self {
            hub,
            calendar_id: settings.calendar_id.clone(),
        })
    }
}

#[async_trait]
impl CalendarSource for GoogleCalendarSource {
    async fn fetch_upcoming(&self, max_count: u32) -> Result<Vec<CalendarEvent>, SourceError> {
        tracing::info!("Getting the upcoming {} events", max_count);

        let (_, events) = self
            .hub
            .events()
            .list(&self.calendar_id)
            .time_min(Utc::now())
            .max_results(i32::try_from(max_count).unwrap_or(i32::MAX))
            .single_events(true)
            .order_by("startTime")
            .add_scope(Scope::Readonly)
            .doit()
            .await
            .map_err(|e| list_error(&self.calendar_id, e))?;

        let items = events.items.unwrap_or_default();
        let total = items.len();
        let converted: Vec<CalendarEvent> = items.into_iter().filter_map(to_calendar_event).collect();

        if converted.len() < total {
            tracing::debug!("Skipped {} all-day events", total - converted.len());
        }

        Ok(converted)
    }
}

/// Map a failed `events.list` call; a 404 means the calendar id is unknown.
fn list_error(calendar_id: &str, err: google_calendar3::Error) -> SourceError {
    let not_found = match &err {
        google_calendar3::Error::BadRequest(body) => body["error"]["code"].as_u64() == Some(404),
        google_calendar3::Error::Failure(response) => response.status().as_u16() == 404,
        _ => false,
    };

    match err {
        _ if not_found => SourceError::NoCalendar(calendar_id.to_string()),
        google_calendar3::Error::MissingToken(e) => SourceError::Auth(e.to_string()),
        other => SourceError::Request(other.to_string()),
    }
}

/// Timed events only; all-day events carry a date but no start instant.
fn to_calendar_event(event: Event) -> Option<CalendarEvent> {
    let start = event.start.as_ref()?.date_time?;
    Some(CalendarEvent {
        title: event.summary,
        start_time: start.with_timezone(&Local).naive_local(),
    })
}

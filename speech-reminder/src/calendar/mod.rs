mod google;

pub use google::GoogleCalendarSource;

use async_trait::async_trait;
use shared::CalendarEvent;

use crate::error::SourceError;

/// Provider of upcoming calendar events.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Up to `max_count` upcoming events, ascending by start time. May be empty.
    async fn fetch_upcoming(&self, max_count: u32) -> Result<Vec<CalendarEvent>, SourceError>;
}

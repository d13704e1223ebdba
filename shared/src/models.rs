use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One upcoming calendar entry, as seen by the alert scheduler.
///
/// `start_time` is local wall-clock time with the timezone stripped, so it
/// can be compared directly against a naive local "now".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub title: Option<String>,
    pub start_time: NaiveDateTime,
}

impl CalendarEvent {
    pub fn new(title: impl Into<String>, start_time: NaiveDateTime) -> Self {
        Self {
            title: Some(title.into()),
            start_time,
        }
    }

    pub fn untitled(start_time: NaiveDateTime) -> Self {
        Self {
            title: None,
            start_time,
        }
    }

    /// Title for display and speech; a missing title renders as empty.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_missing_title_renders_empty() {
        let event = CalendarEvent::untitled(noon());
        assert_eq!(event.display_title(), "");
    }

    #[test]
    fn test_title_is_kept() {
        let event = CalendarEvent::new("Standup", noon());
        assert_eq!(event.display_title(), "Standup");
        assert_eq!(event.start_time, noon());
    }
}

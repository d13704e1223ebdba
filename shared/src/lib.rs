//! Domain types shared by the speech reminder service: calendar events,
//! countdown arithmetic, alert thresholds and localized phrases.

pub mod countdown;
pub mod locale;
pub mod models;
pub mod policy;

pub use countdown::{countdown_minutes, Clock, SystemClock};
pub use locale::Phrases;
pub use models::CalendarEvent;
pub use policy::{compose_message, matching_alert, AlertPolicy, AlertThreshold};

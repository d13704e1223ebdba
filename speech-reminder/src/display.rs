use chrono::NaiveDateTime;
use shared::Phrases;

const DIVIDER: &str = "====================================================";
const CLEAR_SCREEN: &str = "\x1B[2J\x1B[1;1H";

/// Console status screen redrawn on every pass. Purely advisory.
#[derive(Debug, Clone)]
pub struct StatusDisplay {
    enabled: bool,
    phrases: Phrases,
}

impl StatusDisplay {
    pub fn new(enabled: bool, phrases: Phrases) -> Self {
        Self { enabled, phrases }
    }

    pub fn begin_pass(&self) {
        if self.enabled {
            print!("{}", CLEAR_SCREEN);
            println!("{}", DIVIDER);
        }
    }

    pub fn event_line(&self, title: &str, countdown: i64) {
        if self.enabled {
            println!("{}", format_event_line(title, countdown, &self.phrases));
        }
    }

    pub fn no_events(&self) {
        if self.enabled {
            println!("{}", self.phrases.no_events);
        }
    }

    pub fn end_pass(&self, pass_counter: u32, last_refresh: Option<NaiveDateTime>) {
        if self.enabled {
            println!("{}", DIVIDER);
            println!("{}", format_footer(pass_counter, last_refresh));
        }
    }
}

pub fn format_event_line(title: &str, countdown: i64, phrases: &Phrases) -> String {
    format!(
        "{}  {} {} {}",
        title, phrases.begins_in, countdown, phrases.minutes
    )
}

pub fn format_footer(pass_counter: u32, last_refresh: Option<NaiveDateTime>) -> String {
    let refreshed = last_refresh
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());
    format!("Iteration: {}, events reloaded at {}", pass_counter, refreshed)
}

//! Alert thresholds and the wording of spoken alerts.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::locale::Phrases;

/// A countdown value, in minutes, at which an event is announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct AlertThreshold(u32);

impl AlertThreshold {
    /// Returns `None` for zero; thresholds are strictly positive.
    pub fn new(minutes_before: u32) -> Option<Self> {
        (minutes_before > 0).then_some(Self(minutes_before))
    }

    pub fn minutes_before(self) -> u32 {
        self.0
    }

    pub fn is_one_minute(self) -> bool {
        self.0 == 1
    }
}

impl TryFrom<u32> for AlertThreshold {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| "alert threshold must be positive".to_string())
    }
}

impl From<AlertThreshold> for u32 {
    fn from(threshold: AlertThreshold) -> Self {
        threshold.0
    }
}

impl fmt::Display for AlertThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The configured set of alert thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertPolicy {
    thresholds: BTreeSet<AlertThreshold>,
}

impl AlertPolicy {
    pub fn new(thresholds: impl IntoIterator<Item = AlertThreshold>) -> Self {
        Self {
            thresholds: thresholds.into_iter().collect(),
        }
    }

    /// Build a policy from raw minute values, dropping zeros.
    pub fn from_minutes(minutes: impl IntoIterator<Item = u32>) -> Self {
        Self::new(minutes.into_iter().filter_map(AlertThreshold::new))
    }

    pub fn thresholds(&self) -> &BTreeSet<AlertThreshold> {
        &self.thresholds
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    /// Every configured threshold equal to `countdown`, each checked on its own.
    pub fn matching(&self, countdown: i64) -> Vec<AlertThreshold> {
        self.thresholds
            .iter()
            .copied()
            .filter(|t| i64::from(t.0) == countdown)
            .collect()
    }
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self::from_minutes([1, 5])
    }
}

/// The threshold equal to `countdown`, if one is configured.
pub fn matching_alert(
    countdown: i64,
    thresholds: &BTreeSet<AlertThreshold>,
) -> Option<AlertThreshold> {
    let minutes = u32::try_from(countdown).ok()?;
    let candidate = AlertThreshold::new(minutes)?;
    thresholds.contains(&candidate).then_some(candidate)
}

/// Spoken alert text, e.g. `Standup begins in 5 minutes`.
///
/// A threshold of 1 uses the "one minute" phrase instead of `1 minutes`.
pub fn compose_message(title: &str, threshold: AlertThreshold, phrases: &Phrases) -> String {
    let when = if threshold.is_one_minute() {
        phrases.one_minute.to_string()
    } else {
        format!("{} {}", threshold, phrases.minutes)
    };

    let title = title.trim();
    if title.is_empty() {
        format!("{} {}", phrases.begins_in, when)
    } else {
        format!("{} {} {}", title, phrases.begins_in, when)
    }
}

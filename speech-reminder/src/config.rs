use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Environment, File, FileFormat};
use serde::Deserialize;
use shared::{AlertPolicy, AlertThreshold, Phrases};

use crate::error::{ConfigError, ConfigProblem};

/// Preferences file looked up in the working directory.
pub const PREFERENCES_FILE: &str = "preferences.toml";

/// Prefix for environment overrides, e.g. `SPEECH_REMINDER_LANGUAGE=en`.
pub const ENV_PREFIX: &str = "SPEECH_REMINDER";

/// Preferences exactly as read from the file and environment, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPreferences {
    pub status_output: Option<bool>,
    pub alert_tone: Option<bool>,
    pub language: Option<String>,
    pub alert_thresholds: Option<Vec<i64>>,
    pub events_to_fetch: Option<i64>,
    pub refresh_interval_passes: Option<i64>,
    pub exit_characters: Option<Vec<String>>,
    pub exit_on_empty: Option<bool>,
    pub announce_startup: Option<bool>,
    pub pass_interval_secs: Option<i64>,
    pub alert_tone_file: Option<PathBuf>,
    pub player: Option<String>,
    pub calendar_id: Option<String>,
    pub credentials_file: Option<PathBuf>,
    pub token_cache_file: Option<PathBuf>,
}

/// Where the Google calendar adapter finds its calendar and credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarSettings {
    pub calendar_id: String,
    /// OAuth client secret downloaded from the Google developer console
    pub credentials_file: PathBuf,
    /// Persisted access and refresh tokens
    pub token_cache_file: PathBuf,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            calendar_id: "primary".to_string(),
            credentials_file: PathBuf::from("credentials.json"),
            token_cache_file: PathBuf::from("token_cache.json"),
        }
    }
}

/// Validated, immutable preferences for one process lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    /// Render the per-pass status screen on stdout
    pub status_output: bool,
    /// Play the alert tone before each spoken alert
    pub alert_tone: bool,
    pub phrases: Phrases,
    pub alert_policy: AlertPolicy,
    pub events_to_fetch: u32,
    /// Passes between calendar refreshes
    pub refresh_interval_passes: u32,
    pub exit_characters: BTreeSet<char>,
    /// Stop the loop when the current event list is empty
    pub exit_on_empty: bool,
    pub announce_startup: bool,
    pub pass_interval: Duration,
    pub alert_tone_file: PathBuf,
    /// External audio player invoked for MP3 playback
    pub player: String,
    pub calendar: CalendarSettings,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            status_output: true,
            alert_tone: true,
            phrases: Phrases::default(),
            alert_policy: AlertPolicy::default(),
            events_to_fetch: 20,
            refresh_interval_passes: 10,
            exit_characters: BTreeSet::from(['q']),
            exit_on_empty: true,
            announce_startup: true,
            pass_interval: Duration::from_secs(60),
            alert_tone_file: PathBuf::from("gong.mp3"),
            player: "ffplay".to_string(),
            calendar: CalendarSettings::default(),
        }
    }
}

impl Preferences {
    pub fn language_code(&self) -> &'static str {
        self.phrases.language_code
    }

    /// Load preferences from `path` and the environment, falling back to the
    /// built-in defaults when anything is missing, malformed or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            tracing::info!(
                "No preferences file at {}, using defaults",
                path.display()
            );
        }

        let loaded = RawPreferences::load(path)
            .and_then(|raw| raw.validate().map_err(ConfigError::Invalid));

        match loaded {
            Ok(prefs) => {
                tracing::info!(
                    "Preferences loaded (language: {}, thresholds: {:?}, refresh every {} passes)",
                    prefs.language_code(),
                    prefs.alert_policy.thresholds(),
                    prefs.refresh_interval_passes
                );
                prefs
            }
            Err(e) => {
                tracing::warn!("{}; falling back to default preferences", e);
                Self::default()
            }
        }
    }
}

impl RawPreferences {
    /// Layer the TOML file (optional) under `SPEECH_REMINDER_*` environment variables.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Check every field in one pass, collecting all problems found.
    pub fn validate(self) -> Result<Preferences, Vec<ConfigProblem>> {
        let defaults = Preferences::default();
        let mut problems = Vec::new();

        let phrases = match self.language.as_deref() {
            None => defaults.phrases.clone(),
            Some(code) => Phrases::for_language(code).unwrap_or_else(|| {
                problems.push(ConfigProblem::UnknownLanguage(code.to_string()));
                defaults.phrases.clone()
            }),
        };

        let alert_policy = match self.alert_thresholds {
            None => defaults.alert_policy.clone(),
            Some(values) => {
                let mut thresholds = Vec::with_capacity(values.len());
                for value in values {
                    match u32::try_from(value).ok().and_then(AlertThreshold::new) {
                        Some(t) => thresholds.push(t),
                        None => problems.push(ConfigProblem::InvalidThreshold(value)),
                    }
                }
                let policy = AlertPolicy::new(thresholds);
                if policy.is_empty() && problems.is_empty() {
                    problems.push(ConfigProblem::NoThresholds);
                }
                policy
            }
        };

        let events_to_fetch =
            positive(self.events_to_fetch, "events_to_fetch", defaults.events_to_fetch, &mut problems);
        let refresh_interval_passes = positive(
            self.refresh_interval_passes,
            "refresh_interval_passes",
            defaults.refresh_interval_passes,
            &mut problems,
        );
        let pass_interval_secs = positive(
            self.pass_interval_secs,
            "pass_interval_secs",
            60,
            &mut problems,
        );

        let exit_characters = match self.exit_characters {
            None => defaults.exit_characters.clone(),
            Some(values) => {
                let mut chars = BTreeSet::new();
                for value in values {
                    let mut it = value.chars();
                    match (it.next(), it.next()) {
                        (Some(c), None) => {
                            chars.insert(c);
                        }
                        _ => problems.push(ConfigProblem::InvalidExitCharacter(value)),
                    }
                }
                chars
            }
        };

        if !problems.is_empty() {
            return Err(problems);
        }

        let calendar = CalendarSettings {
            calendar_id: self.calendar_id.unwrap_or(defaults.calendar.calendar_id),
            credentials_file: self
                .credentials_file
                .unwrap_or(defaults.calendar.credentials_file),
            token_cache_file: self
                .token_cache_file
                .unwrap_or(defaults.calendar.token_cache_file),
        };

        Ok(Preferences {
            status_output: self.status_output.unwrap_or(defaults.status_output),
            alert_tone: self.alert_tone.unwrap_or(defaults.alert_tone),
            phrases,
            alert_policy,
            events_to_fetch,
            refresh_interval_passes,
            exit_characters,
            exit_on_empty: self.exit_on_empty.unwrap_or(defaults.exit_on_empty),
            announce_startup: self.announce_startup.unwrap_or(defaults.announce_startup),
            pass_interval: Duration::from_secs(u64::from(pass_interval_secs)),
            alert_tone_file: self.alert_tone_file.unwrap_or(defaults.alert_tone_file),
            player: self.player.unwrap_or(defaults.player),
            calendar,
        })
    }
}

fn positive(
    value: Option<i64>,
    field: &'static str,
    default: u32,
    problems: &mut Vec<ConfigProblem>,
) -> u32 {
    match value {
        None => default,
        Some(v) => match u32::try_from(v) {
            Ok(n) if n > 0 => n,
            _ => {
                problems.push(ConfigProblem::NotPositive { field, value: v });
                default
            }
        },
    }
}

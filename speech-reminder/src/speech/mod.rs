//! Spoken announcements.
//!
//! [`Notifier`] is the sink the scheduler dispatches alerts to.
//! [`SpeechNotifier`] implements it with online speech synthesis and an
//! external audio player; synthesized audio is staged in a
//! [`SpeechStaging`] directory that is removed on shutdown.

mod player;
mod staging;
mod synth;

pub use player::AudioPlayer;
pub use staging::SpeechStaging;
pub use synth::{chunk_text, SpeechSynthesizer};

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::NotifyError;

/// Sink for alert announcements.
///
/// Implementations may block until playback completes; the scheduler runs
/// each call on its own task.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn notify(
        &self,
        message: &str,
        language_code: &str,
        with_alert_tone: bool,
    ) -> Result<(), NotifyError>;
}

/// Plays the alert tone, then speaks the message.
pub struct SpeechNotifier {
    synthesizer: SpeechSynthesizer,
    player: AudioPlayer,
    staging: PathBuf,
    alert_tone_file: PathBuf,
}

impl SpeechNotifier {
    pub fn new(
        synthesizer: SpeechSynthesizer,
        player: AudioPlayer,
        staging: &SpeechStaging,
        alert_tone_file: PathBuf,
    ) -> Self {
        Self {
            synthesizer,
            player,
            staging: staging.path().to_path_buf(),
            alert_tone_file,
        }
    }
}

#[async_trait]
impl Notifier for SpeechNotifier {
    async fn notify(
        &self,
        message: &str,
        language_code: &str,
        with_alert_tone: bool,
    ) -> Result<(), NotifyError> {
        if with_alert_tone {
            if self.alert_tone_file.exists() {
                self.player.play(&self.alert_tone_file).await?;
            } else {
                tracing::warn!(
                    "Alert tone {} not found, skipping",
                    self.alert_tone_file.display()
                );
            }
        }

        let audio = self.synthesizer.synthesize(message, language_code).await?;
        let staged = SpeechStaging::stage_in(&self.staging, &audio)?;

        tracing::debug!("Speaking '{}' from {}", message, staged.path().display());
        self.player.play(staged.path()).await
    }
}

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use speech_reminder::calendar::GoogleCalendarSource;
use speech_reminder::cli::{Cli, EXIT_USAGE};
use speech_reminder::config::{Preferences, PREFERENCES_FILE};
use speech_reminder::scheduler::{AlertScheduler, StopReason};
use speech_reminder::speech::{AudioPlayer, SpeechNotifier, SpeechStaging, SpeechSynthesizer};
use speech_reminder::{input, shutdown};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = cli.enter_working_dir() {
        eprintln!("speech-reminder: {}", e);
        return ExitCode::from(EXIT_USAGE);
    }

    dotenv::dotenv().ok();

    // Logs go to stderr so the status screen on stdout stays readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "speech_reminder=info,shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("TLS crypto provider already installed");
    }

    let prefs = Preferences::load_or_default(Path::new(PREFERENCES_FILE));

    let cancel = CancellationToken::new();
    let signals = shutdown::spawn_signal_listener(cancel.clone());
    let exit_keys = input::spawn_exit_key_watcher(prefs.exit_characters.clone(), cancel.clone());

    let staging = SpeechStaging::create().context("Failed to create speech staging directory")?;
    let notifier = Arc::new(SpeechNotifier::new(
        SpeechSynthesizer::new()?,
        AudioPlayer::new(prefs.player.clone()),
        &staging,
        prefs.alert_tone_file.clone(),
    ));

    tracing::info!(
        "Speech reminder running. Press Ctrl+C or enter one of {:?} to stop.",
        prefs.exit_characters
    );

    let result: Result<StopReason> = async {
        // The first run waits on the browser consent redirect
        let source = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(StopReason::Cancelled),
            connected = GoogleCalendarSource::connect(&prefs.calendar) => {
                connected.context("Failed to connect to Google Calendar")?
            }
        };
        let mut scheduler = AlertScheduler::new(source, notifier, prefs, cancel.clone());
        scheduler.run().await.context("Alert scheduler failed")
    }
    .await;

    // Stop the helper tasks and remove staged audio on every exit path
    cancel.cancel();
    shutdown::join_helper("Signal listener", signals).await;
    shutdown::join_helper("Exit key watcher", exit_keys).await;
    staging.cleanup();

    match result? {
        StopReason::Cancelled => tracing::info!("Shutdown requested, speech reminder stopped"),
        StopReason::NoEvents => tracing::info!("No upcoming events, speech reminder stopped"),
    }

    Ok(())
}

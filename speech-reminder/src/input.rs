//! Exit-key polling on standard input.

use std::collections::BTreeSet;
use std::io::BufRead;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub fn line_requests_exit(line: &str, exit_characters: &BTreeSet<char>) -> bool {
    line.chars().any(|c| exit_characters.contains(&c))
}

/// Cancel `cancel` when a line containing one of `exit_characters` is entered.
///
/// Stdin is read on a detached thread because a blocking read cannot be
/// interrupted; the thread ends with the process.
pub fn spawn_exit_key_watcher(
    exit_characters: BTreeSet<char>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let (tx, rx) = mpsc::unbounded_channel();

    let reader = std::thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });

    if let Err(e) = reader {
        tracing::warn!("Failed to start stdin reader, exit keys disabled: {}", e);
    }

    tokio::spawn(watch_lines(rx, exit_characters, cancel))
}

pub async fn watch_lines(
    mut lines: mpsc::UnboundedReceiver<String>,
    exit_characters: BTreeSet<char>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.recv() => match line {
                Some(line) if line_requests_exit(&line, &exit_characters) => {
                    tracing::info!("Exit key pressed, shutting down");
                    cancel.cancel();
                    break;
                }
                Some(_) => {}
                None => {
                    tracing::debug!("Standard input closed, exit keys disabled");
                    break;
                }
            },
        }
    }
}

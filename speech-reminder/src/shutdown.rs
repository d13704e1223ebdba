use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancel `cancel` on Ctrl-C or, on Unix, SIGTERM.
pub fn spawn_signal_listener(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {}
            signal = wait_for_signal() => match signal {
                Ok(name) => {
                    tracing::info!("{} received, shutting down", name);
                    cancel.cancel();
                }
                Err(e) => tracing::error!("Failed to listen for shutdown signals: {}", e),
            },
        }
    })
}

/// Wait for a helper task, logging a panic or abort. Returns whether it exited cleanly.
pub async fn join_helper(name: &str, handle: JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("{} task error: {:?}", name, e);
            false
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|_| "Ctrl-C"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|_| "Ctrl-C")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_listener_exits_once_cancelled() {
        let cancel = CancellationToken::new();
        let listener = spawn_signal_listener(cancel.clone());
        cancel.cancel();
        assert!(join_helper("Signal listener", listener).await);
    }

    #[tokio::test]
    async fn test_panicked_helper_is_reported() {
        let handle = tokio::spawn(async { panic!("stdin closed unexpectedly") });
        assert!(!join_helper("Exit key watcher", handle).await);
    }
}

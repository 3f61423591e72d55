use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::watch;
use tracing::{error, info};

/// Wait for SIGTERM or SIGINT, then send `true` on `shutdown_tx`.
///
/// Falls back to Ctrl-C alone if the Unix handlers cannot be registered.
pub async fn signal_listener(shutdown_tx: watch::Sender<bool>) {
    let handlers = signal(SignalKind::terminate())
        .and_then(|term| signal(SignalKind::interrupt()).map(|int| (term, int)));

    match handlers {
        Ok((mut sigterm, mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => info!("received SIGTERM, initiating graceful shutdown"),
                _ = sigint.recv() => info!("received SIGINT, initiating graceful shutdown"),
            }
        }
        Err(err) => {
            error!(error = %err, "failed to register signal handlers, waiting for ctrl-c");
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!(error = %err, "ctrl-c handler failed");
                return;
            }
            info!("received ctrl-c, initiating graceful shutdown");
        }
    }

    let _ = shutdown_tx.send(true);
}

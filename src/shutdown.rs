use std::{future::Future, io};

use log::{error, info};
use tokio::sync::broadcast;

/// Broadcasts once on Ctrl-C.
pub fn listen_for_shutdown() -> broadcast::Receiver<()> {
    shutdown_on(tokio::signal::ctrl_c())
}

fn shutdown_on<F>(signal: F) -> broadcast::Receiver<()>
where
    F: Future<Output = io::Result<()>> + Send + 'static,
{
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    tokio::spawn(async move {
        match signal.await {
            Ok(()) => {
                info!("Shutdown signal received");
                let _ = shutdown_tx.send(());
            }
            Err(err) => {
                error!("Failed to listen for shutdown signal: {err}");
                // The sender must outlive the server, a closed channel reads as shutdown.
                std::future::pending::<()>().await;
            }
        }
    });

    shutdown_rx
}

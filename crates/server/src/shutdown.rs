//! Process signals that stop the HTTP server.

use std::future::Future;

use tokio::signal;
use tracing::{info, warn};

/// Resolves on Ctrl+C, or SIGTERM on unix.
///
/// Pass it to [`crate::run`]; in-flight requests are drained before `run`
/// returns. A signal whose handler cannot be installed is never reported.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!(signal = "ctrl_c", "shutdown requested, draining connections"),
        _ = terminate => info!(signal = "sigterm", "shutdown requested, draining connections"),
    }
}

/// Any future as a shutdown trigger, logging when it fires.
pub(crate) async fn logged<F: Future<Output = ()>>(trigger: F) {
    trigger.await;
    info!("no longer accepting connections");
}

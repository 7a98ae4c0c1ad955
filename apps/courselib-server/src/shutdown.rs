use std::future::pending;

use tokio::signal;

/// Graceful-shutdown future for `axum::serve`.
///
/// Completes on Ctrl+C, or SIGTERM on unix. A signal whose handler cannot be
/// installed is logged and then never fires, so the server keeps serving
/// until the other one arrives.
pub async fn shutdown_signal() {
    let interrupt = async {
        match signal::ctrl_c().await {
            Ok(()) => tracing::info!(signal = "SIGINT", "Stop requested"),
            Err(e) => {
                tracing::error!(error = %e, "Ctrl+C handler unavailable");
                pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!(signal = "SIGTERM", "Stop requested");
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM handler unavailable");
                pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = pending::<()>();

    tokio::select! {
        () = interrupt => {}
        () = terminate => {}
    }
    tracing::info!("Draining in-flight requests");
}

// Signal handling module
//
// Supported signals:
// - SIGTERM: stop accepting connections
// - SIGINT:  stop accepting connections (Ctrl+C)

use crate::logger;

/// Resolves once a stop signal arrives.
///
/// If a handler cannot be registered the error is logged and that signal is
/// simply never observed.
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => Some(s),
        Err(e) => {
            logger::log_error(&format!("Failed to register SIGTERM handler: {e}"));
            None
        }
    };

    let sigterm_recv = async {
        match sigterm.as_mut() {
            Some(s) => {
                s.recv().await;
            }
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        () = sigterm_recv => logger::log_debug("SIGTERM received"),
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => logger::log_debug("SIGINT received"),
            Err(e) => {
                logger::log_error(&format!("Failed to listen for Ctrl+C: {e}"));
                std::future::pending::<()>().await;
            }
        },
    }
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        logger::log_error(&format!("Failed to listen for Ctrl+C: {e}"));
        std::future::pending::<()>().await;
    }
}

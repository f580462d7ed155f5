// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Shutdown signal state shared with the accept loop
pub struct SignalHandler {
    /// Notified once when a shutdown signal arrives
    pub shutdown: Arc<Notify>,
    /// Whether shutdown has been requested
    pub shutdown_requested: Arc<AtomicBool>,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self {
            shutdown: Arc::new(Notify::new()),
            shutdown_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Record the request and wake the accept loop.
    ///
    /// Uses `notify_one` so a signal arriving before the loop awaits is not lost.
    pub fn request_shutdown(&self, reason: &str) {
        if self.shutdown_requested.swap(true, Ordering::SeqCst) {
            return;
        }
        logger::log_shutdown(reason);
        self.shutdown.notify_one();
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Start signal handlers (Unix only)
///
/// | Signal  | Action         |
/// |---------|----------------|
/// | SIGTERM | Graceful stop  |
/// | SIGINT  | Graceful stop  |
#[cfg(unix)]
pub fn start_signal_handler(handler: Arc<SignalHandler>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                (Err(e), _) | (_, Err(e)) => {
                    logger::log_error(&format!("Failed to register signal handlers: {e}"));
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => handler.request_shutdown("SIGTERM received"),
            _ = sigint.recv() => handler.request_shutdown("SIGINT received"),
        }
    });
}

/// Non-Unix fallback: only Ctrl+C is handled
#[cfg(not(unix))]
pub fn start_signal_handler(handler: Arc<SignalHandler>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => handler.request_shutdown("Ctrl+C received"),
            Err(e) => logger::log_error(&format!("Failed to listen for Ctrl+C: {e}")),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_request_shutdown_wakes_late_waiter() {
        let handler = SignalHandler::new();
        handler.request_shutdown("test");
        assert!(handler.shutdown_requested.load(Ordering::SeqCst));
        // Permit stored by notify_one is consumed by a waiter that arrives later
        tokio::time::timeout(std::time::Duration::from_secs(1), handler.shutdown.notified())
            .await
            .unwrap();
    }

    #[test]
    fn test_request_shutdown_is_idempotent() {
        let handler = SignalHandler::new();
        handler.request_shutdown("first");
        handler.request_shutdown("second");
        assert!(handler.shutdown_requested.load(Ordering::SeqCst));
    }
}

// Server loop module
// Accepts connections until shutdown is requested, then drains active ones

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Accept loop.
///
/// Must run inside a `LocalSet`: each connection is a `spawn_local` task.
/// Returns after `shutdown` is notified and active connections have finished
/// or the drain deadline (`read_timeout`) has passed.
pub async fn run_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: Arc<Notify>,
) -> Result<(), Box<dyn std::error::Error>> {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = shutdown.notified() => break,
        }
    }

    drop(listener);
    drain_connections(
        &active_connections,
        Duration::from_secs(state.config.performance.read_timeout),
    )
    .await;
    Ok(())
}

/// Wait until no connections are active or `deadline` elapses
async fn drain_connections(active: &AtomicUsize, deadline: Duration) {
    let until = tokio::time::Instant::now() + deadline;

    while active.load(Ordering::SeqCst) > 0 {
        if tokio::time::Instant::now() >= until {
            logger::log_warning(&format!(
                "Shutting down with {} connection(s) still open",
                active.load(Ordering::SeqCst)
            ));
            return;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}

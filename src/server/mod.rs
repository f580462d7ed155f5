// Server module
// Listener setup, connection handling, accept loop and signal-driven shutdown

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the file is mounted as `server_loop`
#[path = "loop.rs"]
pub mod server_loop;

pub use listener::create_listener;
pub use server_loop::run_server_loop;
pub use signal::{start_signal_handler, SignalHandler};

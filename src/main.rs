use std::sync::Arc;

mod agent;
mod config;
mod encoder;
mod error;
mod handler;
mod http;
mod logger;
mod server;

use agent::{descriptor, Router};
use encoder::{EncodeOptions, QrPngEncoder};
use error::AgentError;
use server::SignalHandler;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

    // Worker count comes from config, default is one per CPU core
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        logger::log_config(&format!("Using {workers} worker threads"));
    } else {
        logger::log_config("Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    let options = EncodeOptions::from_config(&cfg.encoder)
        .map_err(|e| AgentError::ConfigLoad(format!("encoder: {e}")))?;
    let router = Router::new(
        &cfg.agent.name,
        &cfg.agent.version,
        descriptor::from_config(&cfg.agent),
        Arc::new(QrPngEncoder::new()),
        options,
    );
    let state = Arc::new(config::AppState::new(&cfg, router));

    let listener = server::create_listener(addr)?;
    logger::log_server_start(&addr, &cfg);
    logger::log_config(&format!("Max body size: {} bytes", cfg.http.max_body_size));
    logger::log_config(&format!(
        "Max connections: {:?}",
        cfg.performance.max_connections
    ));

    let signals = Arc::new(SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::run_server_loop(
            listener,
            state,
            Arc::clone(&signals.shutdown),
        ))
        .await
}

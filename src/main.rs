use std::process::ExitCode;

use static_cors_server::config::{Config, DEFAULT_CONFIG_PATH};
use static_cors_server::{logger, server, ServerError};

fn main() -> ExitCode {
    match start() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Falls back to stderr when the logger never got initialized
            logger::log_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn start() -> Result<(), ServerError> {
    // Optional first argument: config file path without extension
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg).map_err(ServerError::Logger)?;

    // Create Tokio runtime, thread count from the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build().map_err(ServerError::Io)?;

    runtime.block_on(server::run(&cfg))
}

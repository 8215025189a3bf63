// Server module entry
// Startup (root check, bind, banner) and the accept loop

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module is exposed as `server_loop`
#[path = "loop.rs"]
pub mod server_loop;

use std::sync::Arc;

use crate::config::{AppState, Config};
use crate::error::ServerError;
use crate::logger;

pub use listener::create_listener;
pub use server_loop::run_until;

/// Validate the root, bind, announce, and serve until Ctrl+C/SIGTERM.
///
/// Fails fast if the static root is missing or the port cannot be bound.
pub async fn run(config: &Config) -> Result<(), ServerError> {
    let state = Arc::new(AppState::new(config)?);
    let addr = config.get_socket_addr()?;
    let listener = create_listener(addr)?;
    let bound = listener.local_addr()?;

    logger::log_server_start(&bound, config, &state.root);

    run_until(listener, state, signal::shutdown_signal()).await;
    Ok(())
}

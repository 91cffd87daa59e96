// Server module entry point
// Listener setup, accept loop and per-connection serving

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module is exposed as `server_loop`
#[path = "loop.rs"]
pub mod server_loop;

pub use listener::create_reusable_listener;
pub use server_loop::start_server_loop;

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use crate::config::{AppState, Config};
use crate::logger;
use crate::registry::RouteRegistry;

/// Bind the configured address and serve `registry` until stopped
pub async fn run(
    config: &Config,
    registry: Arc<RouteRegistry>,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.get_socket_addr()?;
    let listener = create_reusable_listener(addr)?;
    let state = Arc::new(AppState::new(config, registry));

    logger::log_server_start(&addr, config, state.registry.len());
    start_server_loop(listener, state, Arc::new(AtomicUsize::new(0))).await
}

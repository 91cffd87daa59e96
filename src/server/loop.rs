// Server loop module
// Accepts connections until a stop signal arrives

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::connection::accept_connection;
use super::signal::shutdown_signal;
use crate::config::AppState;

/// Accept loop; returns after a graceful stop.
///
/// Connections already being served are left to finish on their own tasks.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => error!(error = %e, "Failed to accept connection"),
                }
            }

            () = &mut shutdown => {
                info!(
                    address = %listener.local_addr()?,
                    active = active_connections.load(Ordering::SeqCst),
                    "Listener closed"
                );
                return Ok(());
            }
        }
    }
}

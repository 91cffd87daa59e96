//! Logger module
//!
//! Two outputs:
//! - diagnostics through `tracing`, filtered by `logging.level` or `RUST_LOG`
//! - access log lines in combined, common, json or custom formats, written to
//!   stdout or a file

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize logging with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| -> Box<dyn std::error::Error> { e })?;

    writer::init(config.logging.access_log_file.as_deref())?;
    Ok(())
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, routes: usize) {
    info!(
        address = %addr,
        level = %config.logging.level,
        workers = ?config.server.workers,
        routes,
        cors = config.http.enable_cors,
        "Server started"
    );
    if let Some(ref path) = config.logging.access_log_file {
        info!(path = %path, "Access log redirected to file");
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    writer::write_access(&entry.format(format));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_once() {
        let config = Config::load_from("does-not-exist/config").unwrap();
        assert!(init(&config).is_ok());
        // The global subscriber and access writer can only be installed once
        assert!(init(&config).is_err());
    }
}

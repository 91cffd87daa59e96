//! Access log writer
//!
//! Thread-safe line writer targeting stdout or an append-only file.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

/// Global access log writer instance
static ACCESS_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Log output target
enum LogTarget {
    Stdout,
    File(Mutex<File>),
}

/// Thread-safe log writer
pub struct LogWriter {
    target: LogTarget,
}

impl LogWriter {
    fn new(path: Option<&str>) -> io::Result<Self> {
        let target = match path {
            Some(path) => LogTarget::File(Mutex::new(open_log_file(path)?)),
            None => LogTarget::Stdout,
        };
        Ok(Self { target })
    }

    pub fn write_line(&self, message: &str) {
        match &self.target {
            LogTarget::Stdout => println!("{message}"),
            LogTarget::File(file) => {
                if let Ok(mut f) = file.lock() {
                    if let Err(e) = writeln!(f, "{message}") {
                        tracing::warn!(error = %e, "Failed to write access log line");
                    }
                }
            }
        }
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize the global access log writer
///
/// Returns error if the log file cannot be opened or the writer is already set.
pub fn init(access_log_file: Option<&str>) -> io::Result<()> {
    let writer = LogWriter::new(access_log_file)?;
    ACCESS_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Access log writer already initialized",
        )
    })
}

/// Write one access log line, falling back to stdout before `init`
pub fn write_access(message: &str) {
    match ACCESS_WRITER.get() {
        Some(writer) => writer.write_line(message),
        None => println!("{message}"),
    }
}

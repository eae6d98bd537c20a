//! Log writer module
//!
//! Thread-safe log output to files or stdout/stderr. Targets are fixed at
//! startup from the logging configuration.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

/// Global log writer instance
static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Log output target
enum LogTarget {
    Stdout,
    Stderr,
    /// Append-mode file
    File(Mutex<File>),
}

impl LogTarget {
    /// Open `path` as a file target, or use `fallback` when no path is set
    fn open(path: Option<&str>, fallback: Self) -> io::Result<Self> {
        match path {
            Some(p) => Ok(Self::File(Mutex::new(open_log_file(p)?))),
            None => Ok(fallback),
        }
    }

    fn write_line(&self, message: &str) {
        match self {
            Self::Stdout => println!("{message}"),
            Self::Stderr => eprintln!("{message}"),
            Self::File(file) => {
                // A poisoned lock still guards a usable file handle
                let mut f = file.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
                let _ = writeln!(f, "{message}");
            }
        }
    }
}

/// Thread-safe log writer
pub struct LogWriter {
    /// Access and info lines
    access: LogTarget,
    /// Errors and warnings
    error: LogTarget,
}

impl LogWriter {
    /// Create a new log writer with optional file paths
    fn new(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<Self> {
        Ok(Self {
            access: LogTarget::open(access_log_file, LogTarget::Stdout)?,
            error: LogTarget::open(error_log_file, LogTarget::Stderr)?,
        })
    }

    /// Write to access log
    pub fn write_access(&self, message: &str) {
        self.access.write_line(message);
    }

    /// Write to error log
    pub fn write_error(&self, message: &str) {
        self.error.write_line(message);
    }

    /// Write info message (to access log target)
    pub fn write_info(&self, message: &str) {
        self.access.write_line(message);
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

/// Initialize the global log writer
///
/// This should be called once at application startup.
/// Returns error if log files cannot be opened.
pub fn init(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<()> {
    let writer = LogWriter::new(access_log_file, error_log_file)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// Get the global log writer
///
/// Panics if `init()` has not been called; check `is_initialized()` first.
pub fn get() -> &'static LogWriter {
    LOG_WRITER
        .get()
        .expect("Log writer not initialized. Call logger::writer::init() first.")
}

/// Check if the log writer has been initialized
pub fn is_initialized() -> bool {
    LOG_WRITER.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_log_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("items-server-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_file_targets_append_lines() {
        let access = temp_log_path("access.log");
        let error = temp_log_path("nested/error.log");
        let _ = std::fs::remove_file(&access);
        let _ = std::fs::remove_file(&error);

        let writer = LogWriter::new(access.to_str(), error.to_str()).unwrap();
        writer.write_access("GET /api/v1/items 200");
        writer.write_info("started");
        writer.write_error("[ERROR] boom");

        let access_text = std::fs::read_to_string(&access).unwrap();
        assert_eq!(access_text, "GET /api/v1/items 200\nstarted\n");
        let error_text = std::fs::read_to_string(&error).unwrap();
        assert_eq!(error_text, "[ERROR] boom\n");
    }

    #[test]
    fn test_stdio_targets_without_paths() {
        let writer = LogWriter::new(None, None).unwrap();
        assert!(matches!(writer.access, LogTarget::Stdout));
        assert!(matches!(writer.error, LogTarget::Stderr));
    }
}

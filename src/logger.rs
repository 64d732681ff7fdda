/*============================================================
  Synavera Project: Syn-App
  Module: synapp_core::logger
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1
  ------------------------------------------------------------
  Purpose:
    Provide structured, append-only logging for a Syn-App run
    and seal the session log with a SHA-256 digest.

  Security / Safety Notes:
    Entries carry URLs, paths and versions only. Nothing read
    from the installer or the vendor page body is logged.

  Dependencies:
    chrono for UTC stamps, sha2 for integrity hashing.

  Operational Scope:
    Shared by every workflow component; warnings surface on
    stderr regardless of verbosity.

  Revision History:
    2025-11-09 COD  Adapted session logger for Syn-App.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Append-only logging with UTC timestamps
    - Deterministic formatting for auditability
    - Graceful error propagation on I/O failures
============================================================*/

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use sha2::{Digest, Sha256};

use crate::error::{Result, SynappError};

/// Structured log level for Syn-App events.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Debug,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Debug => "DEBUG",
        }
    }

    fn always_echoed(self) -> bool {
        matches!(self, LogLevel::Warn | LogLevel::Error)
    }
}

/// Session logger writing to stderr and, optionally, a log file.
pub struct Logger {
    file: Option<Mutex<BufWriter<File>>>,
    path: Option<PathBuf>,
    verbose: bool,
}

impl Logger {
    /// Build a logger that writes to stderr and optionally to a file.
    pub fn new(path: Option<PathBuf>, verbose: bool) -> Result<Self> {
        let file = match path.as_deref() {
            Some(file_path) => Some(Mutex::new(BufWriter::new(open_append(file_path)?))),
            None => None,
        };

        Ok(Self {
            file,
            path,
            verbose,
        })
    }

    /// Emit a log entry with the given level, code, and message.
    pub fn log<S: AsRef<str>>(&self, level: LogLevel, code: &str, message: S) {
        let payload = format_entry(level, code, message.as_ref());

        if self.verbose || level.always_echoed() {
            eprintln!("{payload}");
        }

        if let Some(file) = &self.file {
            if let Ok(mut guard) = file.lock() {
                if writeln!(guard, "{payload}").and_then(|_| guard.flush()).is_err() {
                    eprintln!(
                        "{}",
                        format_entry(LogLevel::Error, "LOGGER", "Failed to write to log file")
                    );
                }
            }
        }
    }

    pub fn info<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Info, code, message);
    }

    pub fn warn<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Warn, code, message);
    }

    pub fn error<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Error, code, message);
    }

    pub fn debug<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Debug, code, message);
    }

    /// Return the path backing this logger, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Compute and persist the SHA-256 digest of the log file as `<log>.hash`.
    pub fn finalize(&self) -> Result<()> {
        let Some(path) = self.path() else {
            return Ok(());
        };

        let data = std::fs::read(path).map_err(|err| {
            SynappError::Filesystem(format!(
                "Failed to read log for hashing {}: {err}",
                path.display()
            ))
        })?;
        let digest = Sha256::digest(&data);

        let mut hash_os = path.as_os_str().to_os_string();
        hash_os.push(".hash");
        let hash_path = PathBuf::from(hash_os);
        let line = format!(
            "{:x}  {}\n",
            digest,
            path.file_name().unwrap_or_default().to_string_lossy()
        );
        std::fs::write(&hash_path, line).map_err(|err| {
            SynappError::Filesystem(format!(
                "Failed to write hash file {}: {err}",
                hash_path.display()
            ))
        })
    }
}

fn open_append(file_path: &Path) -> Result<File> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| {
            SynappError::Filesystem(format!(
                "Failed to create log directory {}: {err}",
                parent.display()
            ))
        })?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(file_path)
        .map_err(|err| {
            SynappError::Filesystem(format!(
                "Failed to open log file {}: {err}",
                file_path.display()
            ))
        })
}

fn format_entry(level: LogLevel, code: &str, message: &str) -> String {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    format!("{timestamp} [{}] [{code}] {message}", level.as_str())
}

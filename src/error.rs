/*============================================================
  Synavera Project: Syn-App
  Module: synapp_core::error
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Centralise Syn-App error types to provide consistent
    diagnostics and exit semantics.

  Security / Safety Notes:
    Error contexts carry URLs and paths only; no response
    bodies or headers are embedded.

  Dependencies:
    thiserror for ergonomic error definitions.

  Operational Scope:
    Used across modules to propagate fatal failures and
    consolidate exit codes for the binary entry point.

  Revision History:
    2025-11-09 COD  Established shared error definitions.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit error taxonomy with actionable context
    - No silent failure paths
    - Stable exit codes for operational tooling
============================================================*/

use std::io;
use std::process::ExitCode;

use thiserror::Error;

/// Result alias for Syn-App operations.
pub type Result<T> = std::result::Result<T, SynappError>;

/// Enumerates the fatal error domains surfaced by Syn-App.
///
/// Non-fatal conditions (link not found, unknown remote size,
/// unverified install) are not errors; they are reported through
/// the logger and `RunOutcome`.
#[derive(Debug, Error)]
pub enum SynappError {
    #[error("No {vendor} GPU detected; rerun with --force to install anyway")]
    GpuNotFound { vendor: String },
    #[error("Required command `{command}` not found in PATH")]
    CommandMissing { command: String },
    #[error("Command `{command}` failed with status {status}: {stderr}")]
    CommandFailure {
        command: String,
        status: i32,
        stderr: String,
    },
    #[error("Configuration: {0}")]
    Config(String),
    #[error("Network: {0}")]
    Network(String),
    #[error("Serialization: {0}")]
    Serialization(String),
    #[error("Filesystem: {0}")]
    Filesystem(String),
    #[error("Runtime: {0}")]
    Runtime(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl SynappError {
    /// Map error category to a deterministic exit code.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }

    fn code(&self) -> u8 {
        match self {
            SynappError::GpuNotFound { .. } => 2,
            SynappError::CommandMissing { .. } => 10,
            SynappError::CommandFailure { .. } => 11,
            SynappError::Config(_) => 20,
            SynappError::Network(_) => 30,
            SynappError::Serialization(_) => 31,
            SynappError::Filesystem(_) => 40,
            SynappError::Io(_) => 41,
            SynappError::Runtime(_) => 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpu_gate_has_its_own_exit_code() {
        let err = SynappError::GpuNotFound {
            vendor: "NVIDIA".into(),
        };
        assert_eq!(err.code(), 2);
        assert!(err.to_string().contains("--force"));
    }

    #[test]
    fn io_errors_convert_transparently() {
        let err: SynappError = io::Error::new(io::ErrorKind::Other, "disk gone").into();
        assert_eq!(err.code(), 41);
        assert_eq!(err.to_string(), "disk gone");
    }
}

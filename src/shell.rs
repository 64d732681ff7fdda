/*============================================================
  Synavera Project: Syn-App
  Module: synapp_core::shell
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Run host utilities (PowerShell, lspci) and capture their
    output with uniform diagnostics.

  Security / Safety Notes:
    Executes binaries with user privileges only; arguments are
    passed as argv entries, never through a shell string.

  Dependencies:
    tokio::process for async command execution.

  Operational Scope:
    Backs GPU enumeration and installed-version lookups.

  Revision History:
    2025-11-09 COD  Extracted command helpers for Syn-App.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Deterministic command invocation with explicit checks
    - Reusable helpers for external command diagnostics
============================================================*/

use std::io;
use std::process::Stdio;

use tokio::process::Command;

use crate::error::{Result, SynappError};

/// Run `program args...`, require success, and return stdout as UTF-8.
pub async fn capture(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|err| map_spawn_error(err, program))?;

    if !output.status.success() {
        return Err(SynappError::CommandFailure {
            command: program.to_string(),
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    String::from_utf8(output.stdout).map_err(|err| {
        SynappError::Serialization(format!("{program} emitted invalid UTF-8: {err}"))
    })
}

/// Run a PowerShell snippet without loading the user profile.
pub async fn powershell(script: &str) -> Result<String> {
    capture(
        "powershell",
        &["-NoProfile", "-NonInteractive", "-Command", script],
    )
    .await
}

/// Quote a value as a single-quoted PowerShell literal.
pub fn ps_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

pub fn map_spawn_error(err: io::Error, command: &str) -> SynappError {
    if err.kind() == io::ErrorKind::NotFound {
        SynappError::CommandMissing {
            command: command.into(),
        }
    } else {
        SynappError::Runtime(format!("Failed to spawn {command}: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_escape_single_quotes() {
        assert_eq!(ps_literal(r"C:\Program Files\x.exe"), r"'C:\Program Files\x.exe'");
        assert_eq!(ps_literal("it's"), "'it''s'");
    }

    #[test]
    fn missing_binaries_are_classified() {
        let err = map_spawn_error(io::Error::from(io::ErrorKind::NotFound), "lspci");
        assert!(matches!(err, SynappError::CommandMissing { ref command } if command == "lspci"));
        let err = map_spawn_error(io::Error::from(io::ErrorKind::PermissionDenied), "lspci");
        assert!(matches!(err, SynappError::Runtime(_)));
    }

    #[tokio::test]
    async fn absent_program_maps_to_command_missing() {
        let err = capture("synapp-definitely-not-installed", &[]).await.unwrap_err();
        assert!(matches!(err, SynappError::CommandMissing { .. }));
    }
}

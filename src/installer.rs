/*============================================================
  Synavera Project: Syn-App
  Module: synapp_core::installer
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Launch the downloaded installer with its silent-install
    arguments and wait for it to exit.

  Security / Safety Notes:
    Runs the installer with the caller's privileges; the
    installer itself requests elevation when it needs it.

  Dependencies:
    tokio::process for the blocking wait.

  Operational Scope:
    Final side-effecting step of a run. The exit code is
    informational; the post-install version check decides.

  Revision History:
    2025-11-09 COD  Implemented installer launcher.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Argument list passed verbatim, no shell interpolation
    - Launch failures fatal, exit codes reported only
============================================================*/

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::Result;
use crate::shell::map_spawn_error;

/// Runs an installer and reports its exit code.
#[async_trait]
pub trait Installer: Send + Sync {
    /// Run `path` with whitespace-separated `args`, blocking until exit.
    /// A process terminated without an exit code reports `-1`.
    async fn install(&self, path: &Path, args: &str) -> Result<i32>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessInstaller;

#[async_trait]
impl Installer for ProcessInstaller {
    async fn install(&self, path: &Path, args: &str) -> Result<i32> {
        let program = path.to_string_lossy();
        let status = Command::new(path)
            .args(args.split_whitespace())
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|err| map_spawn_error(err, &program))?;
        Ok(status.code().unwrap_or(-1))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SynappError;

    #[tokio::test]
    async fn missing_installer_is_a_launch_failure() {
        let err = ProcessInstaller
            .install(Path::new("/nonexistent/synapp/Setup.exe"), "-s")
            .await
            .unwrap_err();
        assert!(matches!(err, SynappError::CommandMissing { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exit_code_is_reported_not_judged() {
        let code = ProcessInstaller
            .install(Path::new("/bin/sh"), "-c false")
            .await
            .unwrap();
        assert_eq!(code, 1);
    }
}

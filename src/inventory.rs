/*============================================================
  Synavera Project: Syn-App
  Module: synapp_core::inventory
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Report the locally installed product version by reading
    the version resource embedded in its main binary.

  Security / Safety Notes:
    Read-only: stats one path and queries file metadata.

  Dependencies:
    tokio::process via the shell helpers.

  Operational Scope:
    Consulted before download (already-current check) and
    after install (verification oracle). Never cached.

  Revision History:
    2025-11-09 COD  Implemented installed-version lookup.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Fresh reads at every decision point
    - Absent path is absence, not an error
============================================================*/

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;
use crate::shell;

/// Reports the installed product version, if any.
#[async_trait]
pub trait Inventory: Send + Sync {
    async fn installed_version(&self) -> Result<Option<String>>;
}

/// Reads the product version embedded in an executable.
#[async_trait]
pub trait VersionReader: Send + Sync {
    async fn product_version(&self, path: &Path) -> Result<Option<String>>;
}

/// Version resource lookup through PowerShell's `VersionInfo`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PowerShellVersionReader;

#[async_trait]
impl VersionReader for PowerShellVersionReader {
    async fn product_version(&self, path: &Path) -> Result<Option<String>> {
        let script = format!(
            "(Get-Item -LiteralPath {}).VersionInfo.ProductVersion",
            shell::ps_literal(&path.to_string_lossy())
        );
        let stdout = shell::powershell(&script).await?;
        Ok(non_empty(&stdout))
    }
}

/// Inventory keyed on a fixed install path.
pub struct LocalInventory<R: VersionReader> {
    install_path: PathBuf,
    reader: R,
}

impl<R: VersionReader> LocalInventory<R> {
    pub fn new(install_path: PathBuf, reader: R) -> Self {
        Self {
            install_path,
            reader,
        }
    }
}

#[async_trait]
impl<R: VersionReader> Inventory for LocalInventory<R> {
    async fn installed_version(&self) -> Result<Option<String>> {
        if !self.install_path.is_file() {
            return Ok(None);
        }
        self.reader.product_version(&self.install_path).await
    }
}

fn non_empty(stdout: &str) -> Option<String> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::sync::Mutex;

    use super::*;

    /// Returns scripted answers in order; the last answer repeats.
    pub struct ScriptedInventory {
        answers: Mutex<Vec<Option<String>>>,
        pub queries: Mutex<usize>,
    }

    impl ScriptedInventory {
        pub fn new(answers: &[Option<&str>]) -> Self {
            Self {
                answers: Mutex::new(answers.iter().map(|a| a.map(str::to_string)).collect()),
                queries: Mutex::new(0),
            }
        }

        pub fn query_count(&self) -> usize {
            *self.queries.lock().unwrap()
        }
    }

    #[async_trait]
    impl Inventory for ScriptedInventory {
        async fn installed_version(&self) -> Result<Option<String>> {
            *self.queries.lock().unwrap() += 1;
            let mut answers = self.answers.lock().unwrap();
            if answers.len() > 1 {
                Ok(answers.remove(0))
            } else {
                Ok(answers.first().cloned().flatten())
            }
        }
    }
}

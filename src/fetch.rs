/*============================================================
  Synavera Project: Syn-App
  Module: synapp_core::fetch
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1
  ------------------------------------------------------------
  Purpose:
    Download the installer to its cache path and decide when
    an existing cached copy can be reused.

  Security / Safety Notes:
    Writes only to the operator-selected cache directory.

  Dependencies:
    transport::Transport.

  Operational Scope:
    Invoked by the orchestrator after the already-current check.

  Revision History:
    2025-11-09 COD  Implemented fetcher and cache check.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Fetch always overwrites; skip decisions live with caller
    - Unknown remote sizes never validate a cache entry
============================================================*/

use std::path::Path;

use crate::error::{Result, SynappError};
use crate::logger::Logger;
use crate::transport::Transport;

/// State of the cached installer relative to the remote artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Local length equals the known remote size.
    Hit,
    /// A file exists but its length differs, or the remote size is unknown.
    Stale { local_bytes: u64 },
    Absent,
}

/// Compare the file at `path` against the remote size.
pub fn cache_state(path: &Path, remote_size: u64) -> Result<CacheState> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(CacheState::Absent),
        Err(err) => {
            return Err(SynappError::Filesystem(format!(
                "Failed to stat cached installer {}: {err}",
                path.display()
            )))
        }
    };

    let local_bytes = metadata.len();
    if remote_size > 0 && local_bytes == remote_size {
        Ok(CacheState::Hit)
    } else {
        Ok(CacheState::Stale { local_bytes })
    }
}

pub struct Fetcher<'a> {
    transport: &'a dyn Transport,
    logger: &'a Logger,
}

impl<'a> Fetcher<'a> {
    pub fn new(transport: &'a dyn Transport, logger: &'a Logger) -> Self {
        Self { transport, logger }
    }

    /// Download `url` into `dest`, replacing whatever is there.
    pub async fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        self.logger
            .info("FETCH", format!("Downloading {url} → {}", dest.display()));
        let written = self.transport.download(url, dest).await?;
        self.logger.info(
            "FETCH",
            format!("Wrote {written} bytes to {}", dest.display()),
        );
        Ok(())
    }
}

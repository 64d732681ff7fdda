/*============================================================
  Synavera Project: Syn-App
  Module: synapp_core::config
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Hold the immutable run configuration derived from the CLI
    and the product profile describing what Syn-App installs.

  Security / Safety Notes:
    No configuration file is read or written; every value is
    supplied at invocation or compiled in.

  Dependencies:
    clap for the edition value enum, dirs for default paths.

  Operational Scope:
    Threaded by reference through every workflow component.

  Revision History:
    2025-11-09 COD  Introduced RunConfig and ProductProfile.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit configuration over ambient global state
    - Deterministic defaults for paths
============================================================*/

use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;

/// Silent-install arguments understood by the vendor installer.
pub const SILENT_INSTALL_ARGS: &str = "-s -noreboot -noeula -nofinish -nosplash";

/// Product variant whose vendor page is queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Edition {
    #[default]
    #[value(name = "Public")]
    Public,
    #[value(name = "Enterprise")]
    Enterprise,
}

impl Edition {
    pub fn as_str(self) -> &'static str {
        match self {
            Edition::Public => "Public",
            Edition::Enterprise => "Enterprise",
        }
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Process-wide switches for a single invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunConfig {
    pub verbose: bool,
    pub dry_run: bool,
    pub force: bool,
    pub edition: Edition,
}

/// Compile-time description of the product Syn-App manages.
#[derive(Debug, Clone)]
pub struct ProductProfile {
    /// Display name used in log lines.
    pub display_name: String,
    /// Case-insensitive token identifying the GPU vendor.
    pub vendor_token: String,
    /// Tokens every candidate download link must contain.
    pub name_tokens: Vec<String>,
    pub public_page: String,
    pub enterprise_page: String,
    /// Binary whose embedded product version marks an installation.
    pub install_path: PathBuf,
    pub silent_args: String,
}

impl ProductProfile {
    /// Profile for the NVIDIA App.
    pub fn nvidia_app() -> Self {
        Self {
            display_name: "NVIDIA app".into(),
            vendor_token: "NVIDIA".into(),
            name_tokens: vec!["nvidia".into(), "app".into()],
            public_page: "https://www.nvidia.com/en-us/software/nvidia-app/".into(),
            enterprise_page: "https://www.nvidia.com/en-us/software/nvidia-app-enterprise/"
                .into(),
            install_path: PathBuf::from(
                r"C:\Program Files\NVIDIA Corporation\NVIDIA app\CEF\NVIDIA app.exe",
            ),
            silent_args: SILENT_INSTALL_ARGS.into(),
        }
    }

    /// Vendor page for the requested edition.
    pub fn page_for(&self, edition: Edition) -> &str {
        match edition {
            Edition::Public => &self.public_page,
            Edition::Enterprise => &self.enterprise_page,
        }
    }

    pub fn install_path(&self) -> &Path {
        &self.install_path
    }
}

/// Default directory for session logs.
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("syn-app")
        .join("logs")
}

/// Default directory holding downloaded installers between runs.
pub fn default_cache_dir() -> PathBuf {
    std::env::temp_dir()
}

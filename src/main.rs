/*============================================================
  Synavera Project: Syn-App
  Module: synapp_core::main
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Entry point for Syn-App. Detects the vendor GPU, resolves
    the current installer from the vendor page, and installs it
    only when the local installation is missing or outdated.

  Security / Safety Notes:
    Operates within user privileges. Performs HTTPS GET/HEAD
    requests, runs PowerShell/lspci queries, and launches the
    downloaded installer with fixed silent arguments.

  Dependencies:
    clap for CLI parsing, chrono for session stamps, tokio
    for the async runtime.

  Operational Scope:
    Invoked by operators or provisioning scripts; safe to
    re-run after partial downloads or installs.

  Revision History:
    2025-11-09 COD  Authored Syn-App runtime.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Result-first error handling with deterministic exits
    - Structured logging following Synavera cadence
    - Explicit configuration threaded through every component
============================================================*/

mod config;
mod descriptor;
mod error;
mod fetch;
mod gpu;
mod installer;
mod inventory;
mod logger;
mod orchestrator;
mod remote;
mod resolver;
mod shell;
mod transport;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{ArgAction, Parser};

use config::{default_cache_dir, default_log_dir, Edition, ProductProfile, RunConfig};
use error::{Result, SynappError};
use gpu::SystemAdapters;
use installer::ProcessInstaller;
use inventory::{LocalInventory, PowerShellVersionReader};
use logger::Logger;
use orchestrator::{Collaborators, Orchestrator};
use transport::ReqwestTransport;

/// Command-line arguments for Syn-App.
#[derive(Debug, Parser)]
#[command(
    name = "Syn-App",
    version,
    author = "Synavera Systems",
    about = "Idempotent installer and updater for the NVIDIA app"
)]
struct Cli {
    /// Enable verbose logging to stderr.
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
    /// Report the install plan without downloading or installing.
    #[arg(long, action = ArgAction::SetTrue)]
    dry_run: bool,
    /// Proceed without a vendor GPU and reinstall a current version.
    #[arg(long, action = ArgAction::SetTrue)]
    force: bool,
    /// Product edition whose vendor page is queried.
    #[arg(long, value_enum, ignore_case = true, default_value_t = Edition::Public)]
    edition: Edition,
    /// Explicit log file path.
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
    /// Directory holding downloaded installers between runs.
    #[arg(long, value_name = "PATH")]
    cache_dir: Option<PathBuf>,
}

impl Cli {
    fn run_config(&self) -> RunConfig {
        RunConfig {
            verbose: self.verbose,
            dry_run: self.dry_run,
            force: self.force,
            edition: self.edition,
        }
    }

    /// Dry runs only write a log when one is explicitly requested.
    fn log_path(&self) -> Option<PathBuf> {
        if self.log.is_some() || self.dry_run {
            return self.log.clone();
        }
        let session_stamp = Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string();
        Some(default_log_dir().join(format!("run_{session_stamp}.log")))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("[Syn-App] {}", err);
            err.exit_code()
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli.run_config();

    let logger = Logger::new(cli.log_path(), config.verbose)?;
    logger.info(
        "INIT",
        format!(
            "Syn-App awakening (edition={} dry_run={} force={})",
            config.edition, config.dry_run, config.force
        ),
    );

    let profile = ProductProfile::nvidia_app();
    let cache_dir = cli.cache_dir.clone().unwrap_or_else(default_cache_dir);
    if cache_dir.exists() && !cache_dir.is_dir() {
        return Err(SynappError::Config(format!(
            "Cache path {} exists and is not a directory",
            cache_dir.display()
        )));
    }

    let transport = ReqwestTransport::new()?;
    let inventory = LocalInventory::new(
        profile.install_path().to_path_buf(),
        PowerShellVersionReader,
    );
    let deps = Collaborators {
        adapters: &SystemAdapters,
        transport: &transport,
        inventory: &inventory,
        installer: &ProcessInstaller,
    };

    let outcome = Orchestrator::new(&config, &profile, &cache_dir, deps, &logger)
        .run()
        .await;

    match outcome {
        Ok(outcome) => {
            let summary = outcome.summary();
            logger.info("SUMMARY", &summary);
            eprintln!("→ {summary}");
            logger.info("COMPLETE", "Run concluded.");
            logger.finalize()?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            logger.error("FATAL", err.to_string());
            if let Err(seal_err) = logger.finalize() {
                eprintln!("[Syn-App] {seal_err}");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_onto_run_config() {
        let cli = Cli::parse_from([
            "syn-app",
            "--dry-run",
            "--force",
            "--edition",
            "enterprise",
        ]);
        assert_eq!(
            cli.run_config(),
            RunConfig {
                verbose: false,
                dry_run: true,
                force: true,
                edition: Edition::Enterprise,
            }
        );
    }

    #[test]
    fn edition_defaults_to_public() {
        let cli = Cli::parse_from(["syn-app"]);
        assert_eq!(cli.edition, Edition::Public);
        assert!(cli.log_path().is_some());
    }

    #[test]
    fn dry_run_writes_no_log_unless_asked() {
        let cli = Cli::parse_from(["syn-app", "--dry-run"]);
        assert_eq!(cli.log_path(), None);

        let cli = Cli::parse_from(["syn-app", "--dry-run", "--log", "/tmp/syn-app.log"]);
        assert_eq!(cli.log_path(), Some(PathBuf::from("/tmp/syn-app.log")));
    }

    #[test]
    fn unknown_edition_is_rejected() {
        assert!(Cli::try_parse_from(["syn-app", "--edition", "Studio"]).is_err());
    }
}

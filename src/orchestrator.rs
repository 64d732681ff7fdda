/*============================================================
  Synavera Project: Syn-App
  Module: synapp_core::orchestrator
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Reconcile the vendor's current installer against the local
    installation and decide whether to download and install.

  Security / Safety Notes:
    Dry runs stop before any filesystem or process side effect.
    The cached installer is reused only on an exact size match.

  Dependencies:
    gpu, resolver, remote, inventory, fetch, installer modules;
    serde_json for the run report.

  Operational Scope:
    Invoked once per process by the binary entry point.

  Revision History:
    2025-11-09 COD  Authored reconciliation workflow.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Normal terminations are outcomes, faults are errors
    - Installed state re-read at every decision point
    - Exit codes of the installer never decide success
============================================================*/

use std::path::{Path, PathBuf};

use crate::config::{ProductProfile, RunConfig};
use crate::descriptor::{DownloadDescriptor, RunResult};
use crate::error::{Result, SynappError};
use crate::fetch::{cache_state, CacheState, Fetcher};
use crate::gpu::{AdapterSource, GpuProbe};
use crate::installer::Installer;
use crate::inventory::Inventory;
use crate::logger::Logger;
use crate::remote::RemoteMeta;
use crate::resolver::LinkResolver;
use crate::transport::Transport;

/// GPU label used when a forced run finds no vendor adapter.
pub const UNKNOWN_GPU: &str = "Unknown";

/// Host capabilities the workflow drives.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub adapters: &'a dyn AdapterSource,
    pub transport: &'a dyn Transport,
    pub inventory: &'a dyn Inventory,
    pub installer: &'a dyn Installer,
}

/// Terminal state of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Plan computed and reported; nothing touched.
    DryRun(RunResult),
    /// The vendor page yielded no installer link.
    LinkNotFound,
    /// The resolved version is already installed.
    AlreadyInstalled { version: String },
    /// The installer ran and a version is now present.
    Installed {
        result: RunResult,
        version: String,
        exit_code: i32,
        cache_hit: bool,
    },
    /// The installer ran but no installed version could be found afterwards.
    InstallNotVerified {
        result: RunResult,
        exit_code: i32,
        cache_hit: bool,
    },
}

impl RunOutcome {
    pub fn summary(&self) -> String {
        match self {
            RunOutcome::DryRun(result) => {
                format!("Dry run: would install {} ({})", result.version, result.filename)
            }
            RunOutcome::LinkNotFound => "No installer link found; nothing to do".into(),
            RunOutcome::AlreadyInstalled { version } => {
                format!("Version {version} already installed")
            }
            RunOutcome::Installed {
                result,
                version,
                exit_code,
                cache_hit,
            } => format!(
                "Installed version {version} from {} (installer exit code {exit_code})",
                installer_source(result, *cache_hit)
            ),
            RunOutcome::InstallNotVerified {
                result,
                exit_code,
                cache_hit,
            } => format!(
                "Installer {} finished (exit code {exit_code}) but no installed version was found",
                installer_source(result, *cache_hit)
            ),
        }
    }
}

fn installer_source(result: &RunResult, cache_hit: bool) -> String {
    if cache_hit {
        format!("cached {}", result.filename)
    } else {
        format!("downloaded {}", result.filename)
    }
}

/// Drives one reconciliation run.
pub struct Orchestrator<'a> {
    config: &'a RunConfig,
    profile: &'a ProductProfile,
    cache_dir: &'a Path,
    deps: Collaborators<'a>,
    logger: &'a Logger,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a RunConfig,
        profile: &'a ProductProfile,
        cache_dir: &'a Path,
        deps: Collaborators<'a>,
        logger: &'a Logger,
    ) -> Self {
        Self {
            config,
            profile,
            cache_dir,
            deps,
            logger,
        }
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        let gpu_model = self.gpu_gate().await?;

        let page = self.profile.page_for(self.config.edition);
        self.logger.info(
            "LINK",
            format!("Resolving {} edition from {page}", self.config.edition),
        );
        let resolver =
            LinkResolver::new(self.deps.transport, &self.profile.name_tokens, self.logger);
        let Some(url) = resolver.resolve(page).await? else {
            self.logger.warn(
                "LINK404",
                format!("No installer link found on {page}; page markup may have changed"),
            );
            return Ok(RunOutcome::LinkNotFound);
        };

        let size = RemoteMeta::new(self.deps.transport, self.logger)
            .size_of(&url)
            .await?;
        let descriptor = DownloadDescriptor::new(url, size);
        let installer_path = self.installer_path(&descriptor);
        let result = RunResult::new(
            &gpu_model,
            &descriptor,
            &installer_path,
            &self.profile.silent_args,
        );
        self.report(&result)?;

        if self.config.dry_run {
            self.logger
                .info("DRYRUN", "Dry run requested; no download or install performed");
            return Ok(RunOutcome::DryRun(result));
        }

        let installed = self.deps.inventory.installed_version().await?;
        match installed.as_deref() {
            Some(current) if current == descriptor.version && !self.config.force => {
                self.logger.info(
                    "CURRENT",
                    format!("{} {current} already installed", self.profile.display_name),
                );
                return Ok(RunOutcome::AlreadyInstalled {
                    version: current.to_string(),
                });
            }
            Some(current) if current == descriptor.version => {
                self.logger
                    .info("CURRENT", format!("Reinstalling {current} (forced)"));
            }
            Some(current) => {
                self.logger.info(
                    "UPDATE",
                    format!("Installed {current} differs from {}", descriptor.version),
                );
            }
            None => {
                self.logger.info(
                    "UPDATE",
                    format!("{} not installed", self.profile.display_name),
                );
            }
        }

        let cache_hit = self.ensure_downloaded(&descriptor, &installer_path).await?;

        self.logger.info(
            "INSTALL",
            format!("Launching {}", result.install_command),
        );
        let exit_code = self
            .deps
            .installer
            .install(&installer_path, &self.profile.silent_args)
            .await?;
        if exit_code != 0 {
            self.logger.warn(
                "INSTALL",
                format!("Installer exited with code {exit_code}; verifying installed version"),
            );
        } else {
            self.logger.info("INSTALL", "Installer exited with code 0");
        }

        match self.deps.inventory.installed_version().await? {
            Some(version) => {
                self.logger
                    .info("VERIFY", format!("Installed version is now {version}"));
                Ok(RunOutcome::Installed {
                    result,
                    version,
                    exit_code,
                    cache_hit,
                })
            }
            None => {
                self.logger.warn(
                    "VERIFY",
                    "No installed version found after install; the installation appears not to have taken effect",
                );
                Ok(RunOutcome::InstallNotVerified {
                    result,
                    exit_code,
                    cache_hit,
                })
            }
        }
    }

    async fn gpu_gate(&self) -> Result<String> {
        let vendor = &self.profile.vendor_token;
        match GpuProbe::new(self.deps.adapters).detect(vendor).await? {
            Some(name) => {
                self.logger.info("GPU", format!("Detected {name}"));
                Ok(name)
            }
            None if self.config.force => {
                self.logger.warn(
                    "GPU",
                    format!(
                        "No {vendor} GPU detected; continuing because --force is set. The installer may still abort on its own"
                    ),
                );
                Ok(UNKNOWN_GPU.to_string())
            }
            None => {
                self.logger
                    .error("GPU", format!("No {vendor} GPU detected"));
                Err(SynappError::GpuNotFound {
                    vendor: vendor.clone(),
                })
            }
        }
    }

    fn installer_path(&self, descriptor: &DownloadDescriptor) -> PathBuf {
        self.cache_dir.join(&descriptor.filename)
    }

    /// Returns `true` when the cached installer was reused.
    async fn ensure_downloaded(
        &self,
        descriptor: &DownloadDescriptor,
        path: &Path,
    ) -> Result<bool> {
        match cache_state(path, descriptor.remote_size_bytes)? {
            CacheState::Hit => {
                self.logger.info(
                    "CACHE",
                    format!(
                        "Reusing {} ({} bytes match remote)",
                        path.display(),
                        descriptor.remote_size_bytes
                    ),
                );
                return Ok(true);
            }
            CacheState::Stale { local_bytes } if descriptor.size_known() => {
                self.logger.info(
                    "CACHE",
                    format!(
                        "Cached {} is {local_bytes} bytes, remote is {}; downloading again",
                        path.display(),
                        descriptor.remote_size_bytes
                    ),
                );
            }
            CacheState::Stale { .. } => {
                self.logger.info(
                    "CACHE",
                    format!(
                        "Remote size unknown; cannot validate {}, downloading again",
                        path.display()
                    ),
                );
            }
            CacheState::Absent => {
                self.logger
                    .debug("CACHE", format!("No cached installer at {}", path.display()));
            }
        }

        Fetcher::new(self.deps.transport, self.logger)
            .fetch(&descriptor.url, path)
            .await?;
        Ok(false)
    }

    fn report(&self, result: &RunResult) -> Result<()> {
        let rendered = serde_json::to_string_pretty(result).map_err(|err| {
            SynappError::Serialization(format!("Failed to render run result: {err}"))
        })?;
        self.logger.debug("PLAN", rendered.replace('\n', " "));
        println!("{rendered}");
        Ok(())
    }
}

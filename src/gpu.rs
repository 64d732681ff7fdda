/*============================================================
  Synavera Project: Syn-App
  Module: synapp_core::gpu
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Enumerate display adapters and report the first one that
    belongs to the target GPU vendor.

  Security / Safety Notes:
    Read-only hardware queries via PowerShell/CIM on Windows
    and lspci elsewhere.

  Dependencies:
    serde_json for CIM output decoding, tokio::process via
    the shell helpers.

  Operational Scope:
    Gates installation: absence of a vendor GPU is fatal unless
    the operator forces the run.

  Revision History:
    2025-11-09 COD  Implemented adapter enumeration and probe.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Enumeration failures propagate; never guessed
    - Pure matching logic separated from host queries
============================================================*/

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{Result, SynappError};
use crate::shell;

/// One display adapter as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayAdapter {
    pub name: String,
    pub processor: String,
}

/// Source of display adapters.
#[async_trait]
pub trait AdapterSource: Send + Sync {
    async fn adapters(&self) -> Result<Vec<DisplayAdapter>>;
}

/// Finds the vendor GPU among the host's display adapters.
pub struct GpuProbe<'a> {
    source: &'a dyn AdapterSource,
}

impl<'a> GpuProbe<'a> {
    pub fn new(source: &'a dyn AdapterSource) -> Self {
        Self { source }
    }

    /// Name of the first adapter whose name or processor contains
    /// `vendor_match`, compared case-insensitively.
    pub async fn detect(&self, vendor_match: &str) -> Result<Option<String>> {
        let adapters = self.source.adapters().await?;
        Ok(first_matching(&adapters, vendor_match).map(|adapter| adapter.name.clone()))
    }
}

fn first_matching<'a>(
    adapters: &'a [DisplayAdapter],
    vendor_match: &str,
) -> Option<&'a DisplayAdapter> {
    let needle = vendor_match.to_lowercase();
    adapters.iter().find(|adapter| {
        adapter.name.to_lowercase().contains(&needle)
            || adapter.processor.to_lowercase().contains(&needle)
    })
}

/// Host adapter enumeration for the current platform.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAdapters;

#[async_trait]
impl AdapterSource for SystemAdapters {
    async fn adapters(&self) -> Result<Vec<DisplayAdapter>> {
        enumerate_host().await
    }
}

#[cfg(windows)]
async fn enumerate_host() -> Result<Vec<DisplayAdapter>> {
    let stdout = shell::powershell(
        "Get-CimInstance Win32_VideoController | Select-Object Name, VideoProcessor | ConvertTo-Json -Compress",
    )
    .await?;
    parse_cim_json(&stdout)
}

#[cfg(not(windows))]
async fn enumerate_host() -> Result<Vec<DisplayAdapter>> {
    let stdout = shell::capture("lspci", &["-mm"]).await?;
    Ok(parse_lspci(&stdout))
}

#[derive(Debug, Deserialize)]
struct CimController {
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "VideoProcessor")]
    video_processor: Option<String>,
}

impl From<CimController> for DisplayAdapter {
    fn from(raw: CimController) -> Self {
        Self {
            name: raw.name.unwrap_or_default(),
            processor: raw.video_processor.unwrap_or_default(),
        }
    }
}

/// `ConvertTo-Json` emits nothing for zero rows, an object for one,
/// and an array for several.
#[cfg_attr(not(windows), allow(dead_code))]
fn parse_cim_json(stdout: &str) -> Result<Vec<DisplayAdapter>> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let value: serde_json::Value = serde_json::from_str(trimmed).map_err(|err| {
        SynappError::Serialization(format!("Failed to decode video controller list: {err}"))
    })?;
    let rows = match value {
        serde_json::Value::Array(rows) => rows,
        other => vec![other],
    };
    rows.into_iter()
        .map(|row| {
            serde_json::from_value::<CimController>(row)
                .map(DisplayAdapter::from)
                .map_err(|err| {
                    SynappError::Serialization(format!("Unexpected video controller entry: {err}"))
                })
        })
        .collect()
}

const DISPLAY_CLASSES: [&str; 3] = [
    "VGA compatible controller",
    "3D controller",
    "Display controller",
];

/// Parse `lspci -mm` machine-readable output into display adapters.
#[cfg_attr(windows, allow(dead_code))]
fn parse_lspci(stdout: &str) -> Vec<DisplayAdapter> {
    stdout
        .lines()
        .filter_map(|line| {
            let fields = quoted_fields(line);
            let class = fields.first()?;
            if !DISPLAY_CLASSES.iter().any(|known| class.starts_with(known)) {
                return None;
            }
            let vendor = fields.get(1).cloned().unwrap_or_default();
            let device = fields.get(2).cloned().unwrap_or_default();
            Some(DisplayAdapter {
                name: format!("{vendor} {device}").trim().to_string(),
                processor: device,
            })
        })
        .collect()
}

fn quoted_fields(line: &str) -> Vec<String> {
    line.split('"')
        .enumerate()
        .filter(|(idx, _)| idx % 2 == 1)
        .map(|(_, field)| field.to_string())
        .collect()
}

/*============================================================
  Synavera Project: Syn-App
  Module: synapp_core::descriptor
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Shared structures describing the resolved installer
    candidate and the observable result of a run.

  Security / Safety Notes:
    Pure data container; no I/O performed in this module.

  Dependencies:
    regex for version parsing, url for filename derivation,
    serde for the structured run report.

  Operational Scope:
    Built once per run by the orchestrator and emitted as JSON.

  Revision History:
    2025-11-09 COD  Introduced DownloadDescriptor and RunResult.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Clear data contracts between modules
    - Serializable structures for machine consumption
============================================================*/

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Version reported when the filename carries no `_v<a.b.c.d>` token.
pub const UNKNOWN_VERSION: &str = "Unknown";

/// Cache filename used when the URL names nothing at all.
const FALLBACK_FILENAME: &str = "installer.exe";

/// Candidate installer resolved from the vendor page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadDescriptor {
    pub url: String,
    pub filename: String,
    pub version: String,
    /// Remote size in bytes; 0 means the server did not report one.
    pub remote_size_bytes: u64,
}

impl DownloadDescriptor {
    pub fn new(url: String, remote_size_bytes: u64) -> Self {
        let filename = filename_from_url(&url);
        let version = version_from_filename(&filename);
        Self {
            url,
            filename,
            version,
            remote_size_bytes,
        }
    }

    pub fn size_known(&self) -> bool {
        self.remote_size_bytes > 0
    }
}

/// Observable plan for a run, emitted on stdout as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub gpu_model: String,
    pub url: String,
    pub filename: String,
    pub size_of_package: String,
    pub version: String,
    pub install_command: String,
}

impl RunResult {
    pub fn new(
        gpu_model: &str,
        descriptor: &DownloadDescriptor,
        installer_path: &Path,
        args: &str,
    ) -> Self {
        Self {
            gpu_model: gpu_model.to_string(),
            url: descriptor.url.clone(),
            filename: descriptor.filename.clone(),
            size_of_package: describe_size(descriptor.remote_size_bytes),
            version: descriptor.version.clone(),
            install_command: describe_install_command(installer_path, args),
        }
    }
}

/// Installer name carried by the URL: the last path segment when it ends in
/// `.exe`, otherwise the last `.exe` query value. `None` for relative URLs.
pub fn installer_filename(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    if let Some(last) = parsed.path_segments().and_then(|mut segments| segments.next_back()) {
        if is_installer_name(last) {
            return Some(last.to_string());
        }
    }
    parsed
        .query_pairs()
        .filter_map(|(_, value)| value.rsplit('/').next().map(str::to_string))
        .filter(|name| is_installer_name(name))
        .last()
}

fn is_installer_name(name: &str) -> bool {
    name.len() > ".exe".len() && name.to_lowercase().ends_with(".exe")
}

/// Cache filename for the URL. Prefers [`installer_filename`], then the last
/// non-empty path segment without query or fragment.
pub fn filename_from_url(url: &str) -> String {
    if let Some(name) = installer_filename(url) {
        return name;
    }
    let without_suffix = url.split(['?', '#']).next().unwrap_or(url);
    without_suffix
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or(FALLBACK_FILENAME)
        .to_string()
}

/// Extract `a.b.c.d` from a `_v<a.b.c.d>` token, or `Unknown`.
pub fn version_from_filename(filename: &str) -> String {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"_v(\d+\.\d+\.\d+\.\d+)").expect("version pattern is valid")
    });
    pattern
        .captures(filename)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_VERSION.to_string())
}

/// Render a byte count as `N bytes (X.XX MiB)`.
pub fn describe_size(bytes: u64) -> String {
    if bytes == 0 {
        return "Unknown (server did not report a size)".to_string();
    }
    let mib = bytes as f64 / (1024.0 * 1024.0);
    format!("{bytes} bytes ({mib:.2} MiB)")
}

/// Human-readable install command; never executed as a string.
pub fn describe_install_command(installer_path: &Path, args: &str) -> String {
    format!("\"{}\" {args}", installer_path.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_parsed_from_filename() {
        assert_eq!(version_from_filename("Product_v11.0.2.341.exe"), "11.0.2.341");
        assert_eq!(version_from_filename("Product_latest.exe"), UNKNOWN_VERSION);
        assert_eq!(version_from_filename("Product_v11.0.exe"), UNKNOWN_VERSION);
    }

    #[test]
    fn filename_drops_path_query_and_fragment() {
        assert_eq!(
            filename_from_url("https://host/app/11.0.2.341/Product_v11.0.2.341.exe"),
            "Product_v11.0.2.341.exe"
        );
        assert_eq!(
            filename_from_url("https://host/dl/Product_v1.2.3.4.exe?token=abc#frag"),
            "Product_v1.2.3.4.exe"
        );
        assert_eq!(filename_from_url("not a url/Setup.exe?x=1"), "Setup.exe");
    }

    #[test]
    fn filename_falls_back_to_query_carried_installer() {
        let descriptor = DownloadDescriptor::new(
            "https://dl.example/get?file=NVIDIA_app_v11.0.2.341.exe".into(),
            0,
        );
        assert_eq!(descriptor.filename, "NVIDIA_app_v11.0.2.341.exe");
        assert_eq!(descriptor.version, "11.0.2.341");

        assert_eq!(
            installer_filename("https://dl.example/get?mirror=eu&path=%2Fapp%2FSetup.exe"),
            Some("Setup.exe".to_string())
        );
        assert_eq!(installer_filename("https://dl.example/get?file=notes.txt"), None);
    }

    #[test]
    fn filename_is_never_empty() {
        assert_eq!(installer_filename("https://dl.example/product_app.exe/"), None);
        assert_eq!(
            filename_from_url("https://dl.example/product_app.exe/"),
            "product_app.exe"
        );
        assert_eq!(filename_from_url("https://dl.example/"), "dl.example");
    }

    #[test]
    fn size_is_described_in_bytes_and_mebibytes() {
        assert_eq!(describe_size(155_022_288), "155022288 bytes (147.84 MiB)");
        assert!(describe_size(0).starts_with("Unknown"));
    }

    #[test]
    fn run_result_serializes_with_camel_case_fields() {
        let descriptor = DownloadDescriptor::new(
            "https://host/app/11.0.2.341/Product_v11.0.2.341.exe".into(),
            155_022_288,
        );
        let result = RunResult::new(
            "Vendor Card X",
            &descriptor,
            Path::new("/tmp/Product_v11.0.2.341.exe"),
            "-s -noreboot -noeula -nofinish -nosplash",
        );
        let value = serde_json::to_value(&result).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        for key in ["gpuModel", "url", "filename", "sizeOfPackage", "version", "installCommand"] {
            assert!(keys.contains(&key), "missing {key}");
        }
        assert_eq!(
            value["installCommand"],
            "\"/tmp/Product_v11.0.2.341.exe\" -s -noreboot -noeula -nofinish -nosplash"
        );
    }
}

/*============================================================
  Synavera Project: Syn-App
  Module: synapp_core::transport
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1
  ------------------------------------------------------------
  Purpose:
    HTTP capability shared by the link resolver, the remote
    size probe, and the installer fetcher.

  Security / Safety Notes:
    Performs HTTPS GET/HEAD requests only. No credentials or
    cookies are transmitted.

  Dependencies:
    reqwest for HTTP, tokio::fs for streaming writes,
    async-trait for the transport seam.

  Operational Scope:
    One request per call; no retries, timeouts or backoff.

  Revision History:
    2025-11-09 COD  Implemented reqwest-backed transport.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Single attempt per operation with explicit error paths
    - Narrow trait seam for deterministic tests
============================================================*/

use std::path::Path;

use async_trait::async_trait;
use reqwest::header::CONTENT_LENGTH;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::error::{Result, SynappError};

/// HTTP operations consumed by the workflow.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET the URL and return the body as text.
    async fn get_text(&self, url: &str) -> Result<String>;

    /// HEAD the URL and return the raw `Content-Length` header, if any.
    async fn head_content_length(&self, url: &str) -> Result<Option<String>>;

    /// GET the URL and stream the body into `dest`, truncating it first.
    /// Returns the number of bytes written.
    async fn download(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// Production transport backed by a shared `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("Syn-App/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| SynappError::Network(format!("Failed to build HTTP client: {err}")))?;
        Ok(Self { client })
    }

    async fn checked(
        &self,
        request: reqwest::RequestBuilder,
        method: &str,
        url: &str,
    ) -> Result<reqwest::Response> {
        let response = request.send().await.map_err(|err| {
            SynappError::Network(format!("{method} {url} failed: {err}"))
        })?;
        if !response.status().is_success() {
            return Err(SynappError::Network(format!(
                "{method} {url} returned status {}",
                response.status()
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.checked(self.client.get(url), "GET", url).await?;
        response.text().await.map_err(|err| {
            SynappError::Network(format!("Failed to read body from {url}: {err}"))
        })
    }

    async fn head_content_length(&self, url: &str) -> Result<Option<String>> {
        let response = self.checked(self.client.head(url), "HEAD", url).await?;
        Ok(response
            .headers()
            .get(CONTENT_LENGTH)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned()))
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let mut response = self.checked(self.client.get(url), "GET", url).await?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|err| {
                SynappError::Filesystem(format!(
                    "Failed to create download directory {}: {err}",
                    parent.display()
                ))
            })?;
        }
        let mut file = File::create(dest).await.map_err(|err| {
            SynappError::Filesystem(format!("Failed to create {}: {err}", dest.display()))
        })?;

        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await.map_err(|err| {
            SynappError::Network(format!("Download from {url} interrupted: {err}"))
        })? {
            file.write_all(&chunk).await.map_err(|err| {
                SynappError::Filesystem(format!("Failed to write {}: {err}", dest.display()))
            })?;
            written = written.saturating_add(chunk.len() as u64);
        }
        file.flush().await.map_err(|err| {
            SynappError::Filesystem(format!("Failed to flush {}: {err}", dest.display()))
        })?;

        Ok(written)
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! Scripted transport used by component and workflow tests.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct FakeTransport {
        pub pages: HashMap<String, String>,
        pub content_lengths: HashMap<String, Option<String>>,
        pub bodies: HashMap<String, Vec<u8>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeTransport {
        pub fn with_page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.into(), body.into());
            self
        }

        pub fn with_content_length(mut self, url: &str, value: Option<&str>) -> Self {
            self.content_lengths.insert(url.into(), value.map(str::to_string));
            self
        }

        pub fn with_body(mut self, url: &str, body: &[u8]) -> Self {
            self.bodies.insert(url.into(), body.to_vec());
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn count(&self, method: &str) -> usize {
            self.calls()
                .iter()
                .filter(|call| call.starts_with(method))
                .count()
        }

        fn record(&self, method: &str, url: &str) {
            self.calls.lock().unwrap().push(format!("{method} {url}"));
        }

        fn missing(method: &str, url: &str) -> SynappError {
            SynappError::Network(format!("{method} {url} returned status 404 Not Found"))
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn get_text(&self, url: &str) -> Result<String> {
            self.record("GET", url);
            self.pages.get(url).cloned().ok_or_else(|| Self::missing("GET", url))
        }

        async fn head_content_length(&self, url: &str) -> Result<Option<String>> {
            self.record("HEAD", url);
            self.content_lengths
                .get(url)
                .cloned()
                .ok_or_else(|| Self::missing("HEAD", url))
        }

        async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
            self.record("DOWNLOAD", url);
            let body = self.bodies.get(url).ok_or_else(|| Self::missing("GET", url))?;
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(dest, body)?;
            Ok(body.len() as u64)
        }
    }
}

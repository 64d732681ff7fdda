/*============================================================
  Synavera Project: Syn-App
  Module: synapp_core::remote
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1
  ------------------------------------------------------------
  Purpose:
    Learn the installer's size from a metadata-only request
    without downloading the body.

  Security / Safety Notes:
    HEAD requests only.

  Dependencies:
    transport::Transport.

  Operational Scope:
    Feeds the run report and the cache validation step.

  Revision History:
    2025-11-09 COD  Implemented remote size probe.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Unknown sizes degrade to 0 with a warning
    - Transport failures remain fatal
============================================================*/

use crate::error::Result;
use crate::logger::Logger;
use crate::transport::Transport;

pub struct RemoteMeta<'a> {
    transport: &'a dyn Transport,
    logger: &'a Logger,
}

impl<'a> RemoteMeta<'a> {
    pub fn new(transport: &'a dyn Transport, logger: &'a Logger) -> Self {
        Self { transport, logger }
    }

    /// Content length of `url` in bytes; 0 when the server omits or
    /// garbles the header. Callers must read 0 as unknown.
    pub async fn size_of(&self, url: &str) -> Result<u64> {
        let header = self.transport.head_content_length(url).await?;
        match header.as_deref().map(str::trim) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(bytes) => {
                    self.logger
                        .debug("SIZE", format!("{url} reports {bytes} bytes"));
                    Ok(bytes)
                }
                Err(_) => {
                    self.logger.warn(
                        "SIZE",
                        format!("Malformed Content-Length `{raw}` for {url}; size unknown"),
                    );
                    Ok(0)
                }
            },
            None => {
                self.logger
                    .warn("SIZE", format!("No Content-Length for {url}; size unknown"));
                Ok(0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::fake::FakeTransport;

    const URL: &str = "https://cdn.example/1.2.3.4/Product_v1.2.3.4.exe";

    #[tokio::test]
    async fn reads_content_length() {
        let logger = Logger::new(None, false).unwrap();
        let transport = FakeTransport::default().with_content_length(URL, Some(" 155022288 "));
        let meta = RemoteMeta::new(&transport, &logger);
        assert_eq!(meta.size_of(URL).await.unwrap(), 155_022_288);
        assert_eq!(transport.count("HEAD"), 1);
        assert_eq!(transport.count("GET"), 0);
    }

    #[tokio::test]
    async fn missing_or_malformed_header_is_zero() {
        let logger = Logger::new(None, false).unwrap();
        let transport = FakeTransport::default()
            .with_content_length(URL, None)
            .with_content_length("https://cdn.example/other.exe", Some("lots"));
        let meta = RemoteMeta::new(&transport, &logger);
        assert_eq!(meta.size_of(URL).await.unwrap(), 0);
        assert_eq!(meta.size_of("https://cdn.example/other.exe").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn transport_failure_is_fatal() {
        let logger = Logger::new(None, false).unwrap();
        let transport = FakeTransport::default();
        let meta = RemoteMeta::new(&transport, &logger);
        assert!(meta.size_of(URL).await.is_err());
    }
}

//! Raw image byte sources: network fetch and file read
//!
//! Bytes are passed through untouched; nothing here inspects image formats.

use crate::config::{Config, SharedConfig};
use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// User agent sent with every image request
pub const USER_AGENT: &str = concat!("remote-images-preview/", env!("CARGO_PKG_VERSION"));

/// Source of raw image bytes for hover previews
pub trait ImageLoader: Send + Sync {
    /// Fetch the full body at `url`
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;

    /// Read a local file
    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

/// Blocking HTTP loader. Timeout and size cap are read from the shared
/// configuration on every fetch.
#[derive(Debug, Clone)]
pub struct NetworkLoader {
    config: SharedConfig,
}

impl NetworkLoader {
    pub fn new(config: SharedConfig) -> Self {
        Self { config }
    }
}

impl Default for NetworkLoader {
    fn default() -> Self {
        Self::new(Config::default().shared())
    }
}

impl ImageLoader for NetworkLoader {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let config = Config::snapshot(&self.config);
        let max_bytes = config.max_image_bytes;
        tracing::debug!("Fetching image from {}", url);
        // ureq reports non-2xx responses as `Error::Status`
        let response = ureq::get(url)
            .set("User-Agent", USER_AGENT)
            .timeout(Duration::from_millis(config.fetch_timeout_ms))
            .call()
            .with_context(|| format!("HTTP request for {url} failed"))?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(max_bytes + 1)
            .read_to_end(&mut bytes)
            .with_context(|| format!("Failed to read response body from {url}"))?;

        if bytes.len() as u64 > max_bytes {
            bail!("Image at {url} is larger than {max_bytes} bytes");
        }

        tracing::debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes)
    }
}

//! Remote image fetching.
//!
//! Provides:
//! - The [`RemoteFetch`] seam the migrator downloads through
//! - [`HttpFetcher`], streaming the body to a `.part` file and renaming it into place
//! - Filename derivation from the URL path or the response content type

use crate::config::NetworkConfig;
use crate::network::client::HttpClient;
use crate::paths::allocate_unique_path;
use crate::{MdShelfError, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

/// Downloads a remote image into a directory.
#[async_trait]
pub trait RemoteFetch: Send + Sync {
    /// Fetch `url` into `target_dir`, returning the path written.
    async fn fetch(&self, url: &str, target_dir: &Path) -> Result<PathBuf>;
}

/// [`RemoteFetch`] over HTTP GET.
pub struct HttpFetcher {
    http: Arc<HttpClient>,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: Arc::new(HttpClient::new()?),
        })
    }

    async fn stream_to(&self, url: &str, response: reqwest::Response, temp_path: &Path) -> Result<u64> {
        let mut file =
            std::fs::File::create(temp_path).map_err(|e| MdShelfError::io_with_path(e, temp_path))?;

        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| MdShelfError::DownloadFailed {
                url: url.to_string(),
                message: format!("Error reading download stream: {}", e),
            })?;
            file.write_all(&chunk)
                .map_err(|e| MdShelfError::io_with_path(e, temp_path))?;
            written += chunk.len() as u64;
        }

        file.flush()
            .map_err(|e| MdShelfError::io_with_path(e, temp_path))?;
        Ok(written)
    }
}

#[async_trait]
impl RemoteFetch for HttpFetcher {
    async fn fetch(&self, url: &str, target_dir: &Path) -> Result<PathBuf> {
        let response = self.http.get(url).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let file_name = derive_file_name(url, content_type.as_deref(), unix_timestamp());

        if !target_dir.exists() {
            std::fs::create_dir_all(target_dir)
                .map_err(|e| MdShelfError::io_with_path(e, target_dir))?;
        }
        let destination = allocate_unique_path(target_dir, &file_name);
        let temp_path = PathBuf::from(format!(
            "{}{}",
            destination.display(),
            NetworkConfig::DOWNLOAD_TEMP_SUFFIX
        ));

        match self.stream_to(url, response, &temp_path).await {
            Ok(bytes) => {
                std::fs::rename(&temp_path, &destination).map_err(|e| {
                    let _ = std::fs::remove_file(&temp_path);
                    MdShelfError::io_with_path(e, &destination)
                })?;
                info!("Downloaded {} bytes to {}", bytes, destination.display());
                Ok(destination)
            }
            Err(e) => {
                let _ = std::fs::remove_file(&temp_path);
                Err(e)
            }
        }
    }
}

/// Pick a local filename for `url`.
///
/// Uses the percent-decoded last path segment when it has an extension, otherwise
/// `remote_image_<timestamp>.<ext>` with the extension taken from `content_type`.
pub fn derive_file_name(url: &str, content_type: Option<&str>, timestamp: u64) -> String {
    if let Some(name) = url_basename(url) {
        if has_extension(&name) {
            return name;
        }
        debug!("URL basename {:?} has no extension", name);
    }
    format!(
        "{}_{}.{}",
        NetworkConfig::REMOTE_NAME_PREFIX,
        timestamp,
        extension_for_content_type(content_type)
    )
}

/// Map `image/<subtype>` to its extension, defaulting to `jpg`.
pub fn extension_for_content_type(content_type: Option<&str>) -> String {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|mime| mime.trim().to_ascii_lowercase())
        .and_then(|mime| {
            mime.strip_prefix("image/").map(|subtype| {
                // image/svg+xml -> svg
                subtype.split('+').next().unwrap_or_default().to_string()
            })
        })
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
        .unwrap_or_else(|| NetworkConfig::DEFAULT_IMAGE_EXTENSION.to_string())
}

fn url_basename(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.next_back()?;
    if segment.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    // A decoded separator would escape the target directory.
    let name = decoded.rsplit(['/', '\\']).next().unwrap_or_default().to_string();
    (!name.is_empty()).then_some(name)
}

fn has_extension(name: &str) -> bool {
    matches!(name.rfind('.'), Some(pos) if pos > 0 && pos + 1 < name.len())
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

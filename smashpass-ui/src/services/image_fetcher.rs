//! Entity artwork fetcher
//!
//! A single HTTP GET per image. The caller runs it on a spawned task so the
//! input loop never waits on the network.

use smashpass_common::{Error, Result};
use std::time::Duration;

const USER_AGENT: &str = concat!("smashpass/", env!("CARGO_PKG_VERSION"));

/// Raw image returned by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    /// `Content-Type` header, when the server sent one
    pub content_type: Option<String>,
}

/// reqwest-backed image client
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    http_client: reqwest::Client,
}

impl ImageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::ImageFetchFailed(e.to_string()))?;

        Ok(Self { http_client })
    }

    /// Download the image at `url`
    ///
    /// Transport errors and non-success statuses both map to `ImageFetchFailed`.
    pub async fn fetch(&self, url: &str) -> Result<FetchedImage> {
        tracing::debug!(url = %url, "Fetching image");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::ImageFetchFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ImageFetchFailed(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::ImageFetchFailed(e.to_string()))?;

        tracing::debug!(url = %url, bytes = bytes.len(), "Image fetched");
        Ok(FetchedImage {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}

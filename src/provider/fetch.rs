//! Resolve any [`ImageOutput`] into raw image bytes.

use super::{build_http_client, map_http_error, map_status, ImageOutput};
use crate::error::AssetError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures::StreamExt;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Upper bound for downloading a remote reference.
pub const REMOTE_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Decodes inline data, downloads remote references, and drains streams. No retries.
pub struct ImageFetcher {
    client: Client,
}

impl ImageFetcher {
    pub fn new() -> Result<Self, AssetError> {
        Ok(Self {
            client: build_http_client(Some(REMOTE_FETCH_TIMEOUT))?,
        })
    }

    /// Produce the bytes of one image regardless of how the provider delivered it.
    pub async fn resolve(&self, output: ImageOutput) -> Result<Vec<u8>, AssetError> {
        let bytes = match output {
            ImageOutput::InlineData(data) => STANDARD
                .decode(data.trim())
                .map_err(|e| AssetError::Provider(format!("Invalid base64 image data: {}", e)))?,
            ImageOutput::RemoteReference(url) => self.download(&url).await?,
            ImageOutput::Stream(mut stream) => {
                let mut buf = Vec::new();
                while let Some(chunk) = stream.next().await {
                    buf.extend_from_slice(&chunk?);
                }
                buf
            }
        };

        if bytes.is_empty() {
            return Err(AssetError::Provider("Provider returned an empty image".to_string()));
        }
        Ok(bytes)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, AssetError> {
        debug!(url = %url, "Fetching remote image");
        let response = self.client.get(url).send().await.map_err(map_http_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_status(
                status.as_u16(),
                &format!("fetching remote image {}", url),
            ));
        }

        let body = response.bytes().await.map_err(map_http_error)?;
        Ok(body.to_vec())
    }
}

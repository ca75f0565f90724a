//! Image Provider Abstraction
//!
//! The seam between the batch driver and an external image-synthesis service. A provider
//! receives an [`ImageRequest`] and answers with one [`ImageOutput`] per requested image;
//! [`ImageFetcher`] turns any output shape into raw bytes.

use crate::config::OutputFormat;
use crate::error::AssetError;
use async_trait::async_trait;
use futures::Stream;
use reqwest::Client;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Duration;

pub mod fetch;
pub mod mock;
pub mod openai;
pub mod profile;

pub use fetch::ImageFetcher;
pub use mock::MockImageProvider;
pub use openai::OpenAIImageClient;
pub use profile::{ProviderConfig, ProviderType, API_KEY_ENV};

/// One provider call: generate `count` images from `prompt`, optionally conditioned on
/// `reference`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub prompt: String,
    /// `None` requests a fresh generation; `Some` requests an edit conditioned on this image.
    pub reference: Option<PathBuf>,
    pub count: u32,
    pub size: String,
    pub quality: String,
    pub output_format: OutputFormat,
}

impl ImageRequest {
    pub fn is_conditioned(&self) -> bool {
        self.reference.is_some()
    }
}

/// Chunked image body.
pub type ImageByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, AssetError>> + Send>>;

/// How a provider delivered a single image.
pub enum ImageOutput {
    /// Base64-encoded image bytes carried in the response body
    InlineData(String),
    /// URL the image can be downloaded from
    RemoteReference(String),
    /// Image bytes readable as a stream
    Stream(ImageByteStream),
}

impl std::fmt::Debug for ImageOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageOutput::InlineData(data) => f
                .debug_tuple("InlineData")
                .field(&format_args!("{} base64 chars", data.len()))
                .finish(),
            ImageOutput::RemoteReference(url) => {
                f.debug_tuple("RemoteReference").field(url).finish()
            }
            ImageOutput::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Image provider client trait
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Run one generation or edit call; returns exactly `request.count` outputs on success.
    async fn generate(&self, request: ImageRequest) -> Result<Vec<ImageOutput>, AssetError>;

    /// Get the provider name
    fn provider_name(&self) -> &str;

    /// Get the model name
    fn model_name(&self) -> &str;
}

// Helper function to map transport errors to AssetError
pub(crate) fn map_http_error(error: reqwest::Error) -> AssetError {
    if let Some(status) = error.status() {
        return map_status(status.as_u16(), &error.to_string());
    }
    if error.is_timeout() {
        AssetError::ProviderRequestFailed(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        AssetError::ProviderRequestFailed(format!("Connection error: {}", error))
    } else {
        AssetError::Provider(format!("HTTP error: {}", error))
    }
}

pub(crate) fn map_status(status: u16, detail: &str) -> AssetError {
    match status {
        401 => AssetError::ProviderAuthFailed(format!("Authentication failed: {}", detail)),
        429 => AssetError::ProviderRateLimit(format!("Rate limit exceeded: {}", detail)),
        _ => AssetError::ProviderRequestFailed(format!(
            "Request failed with status {}: {}",
            status, detail
        )),
    }
}

const PROVIDER_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build an HTTP client. `timeout = None` leaves the request unbounded; image generation
/// calls can legitimately run for minutes.
pub(crate) fn build_http_client(timeout: Option<Duration>) -> Result<Client, AssetError> {
    let mut builder = Client::builder().connect_timeout(PROVIDER_HTTP_CONNECT_TIMEOUT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| AssetError::Provider(format!("Failed to create HTTP client: {}", e)))
}

/// Builds provider clients from configuration.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create the configured client. Fails with a configuration error when the credential
    /// is missing or blank.
    pub fn create(config: &ProviderConfig) -> Result<Box<dyn ImageProvider>, AssetError> {
        Self::create_with_env(config, std::env::var(API_KEY_ENV).ok())
    }

    /// Create the configured client with the credential fallback supplied by the caller.
    pub fn create_with_env(
        config: &ProviderConfig,
        env_api_key: Option<String>,
    ) -> Result<Box<dyn ImageProvider>, AssetError> {
        config
            .validate()
            .map_err(|e| AssetError::Configuration(format!("provider: {}", e)))?;
        let api_key = config.resolve_api_key_with(env_api_key)?;
        match config.provider_type {
            ProviderType::OpenAI | ProviderType::OpenAICompatible => Ok(Box::new(
                OpenAIImageClient::new(config.model.clone(), api_key, config.endpoint.clone())?,
            )),
        }
    }
}

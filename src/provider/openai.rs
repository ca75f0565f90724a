//! OpenAI images API client (`/images/generations` and `/images/edits`).

use super::{build_http_client, map_http_error, map_status, ImageOutput, ImageProvider, ImageRequest};
use crate::error::AssetError;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Serialize)]
struct ImageGenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
    quality: &'a str,
    output_format: &'a str,
}

#[derive(Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
    url: Option<String>,
}

/// OpenAI image provider client
pub struct OpenAIImageClient {
    client: Client,
    model: String,
    api_key: String,
    base_url: String,
}

impl OpenAIImageClient {
    pub fn new(model: String, api_key: String, base_url: Option<String>) -> Result<Self, AssetError> {
        if api_key.trim().is_empty() {
            return Err(AssetError::Configuration(
                "Provider credential cannot be blank".to_string(),
            ));
        }
        let client = build_http_client(None)?;
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            model,
            api_key,
            base_url,
        })
    }

    async fn request_generation(&self, request: &ImageRequest) -> Result<reqwest::Response, AssetError> {
        let body = ImageGenerationRequest {
            model: &self.model,
            prompt: &request.prompt,
            n: request.count,
            size: &request.size,
            quality: &request.quality,
            output_format: request.output_format.as_str(),
        };
        self.client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_http_error)
    }

    async fn request_edit(
        &self,
        request: &ImageRequest,
        reference: &Path,
    ) -> Result<reqwest::Response, AssetError> {
        let image_bytes = tokio::fs::read(reference)
            .await
            .map_err(|e| AssetError::io(reference, e))?;
        let file_name = reference
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "reference.png".to_string());
        let part = Part::bytes(image_bytes)
            .file_name(file_name)
            .mime_str(reference_mime(reference))
            .map_err(|e| AssetError::Provider(format!("Invalid reference image part: {}", e)))?;

        let form = Form::new()
            .text("model", self.model.clone())
            .text("prompt", request.prompt.clone())
            .text("n", request.count.to_string())
            .text("size", request.size.clone())
            .text("quality", request.quality.clone())
            .text("output_format", request.output_format.as_str())
            .part("image[]", part);

        self.client
            .post(format!("{}/images/edits", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(map_http_error)
    }
}

#[async_trait]
impl ImageProvider for OpenAIImageClient {
    async fn generate(&self, request: ImageRequest) -> Result<Vec<ImageOutput>, AssetError> {
        debug!(
            model = %self.model,
            count = request.count,
            conditioned = request.is_conditioned(),
            "Sending image request"
        );
        let response = match &request.reference {
            None => self.request_generation(&request).await?,
            Some(reference) => self.request_edit(&request, reference).await?,
        };

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(map_status(status.as_u16(), &error_text));
        }

        let parsed: ImagesResponse = response
            .json()
            .await
            .map_err(|e| AssetError::Provider(format!("Failed to parse response: {}", e)))?;

        into_outputs(parsed, request.count)
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Map response entries to tagged outputs. Inline data wins when both fields are present.
fn into_outputs(response: ImagesResponse, expected: u32) -> Result<Vec<ImageOutput>, AssetError> {
    if response.data.len() < expected as usize {
        return Err(AssetError::Provider(format!(
            "Expected {} images, provider returned {}",
            expected,
            response.data.len()
        )));
    }

    response
        .data
        .into_iter()
        .take(expected as usize)
        .enumerate()
        .map(|(idx, datum)| match (datum.b64_json, datum.url) {
            (Some(b64), _) if !b64.is_empty() => Ok(ImageOutput::InlineData(b64)),
            (_, Some(url)) if !url.is_empty() => Ok(ImageOutput::RemoteReference(url)),
            _ => Err(AssetError::UnrecognizedResult(format!(
                "Image {} has neither b64_json nor url",
                idx + 1
            ))),
        })
        .collect()
}

fn reference_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

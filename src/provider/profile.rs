//! Provider profile: the `[provider]` config section and credential resolution.

use crate::error::AssetError;
use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_IMAGE_MODEL: &str = "gpt-image-1";

/// Environment variable consulted when `provider.api_key` is not configured.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderType {
    /// api.openai.com (or `endpoint`, when set)
    #[default]
    #[serde(rename = "openai")]
    OpenAI,
    /// Any service exposing the OpenAI images API; requires `endpoint`
    #[serde(rename = "openai-compatible")]
    OpenAICompatible,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub provider_type: ProviderType,

    #[serde(default = "default_model")]
    pub model: String,

    /// Credential; falls back to OPENAI_API_KEY
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the images API, e.g. `https://api.openai.com/v1`
    #[serde(default)]
    pub endpoint: Option<String>,
}

fn default_model() -> String {
    DEFAULT_IMAGE_MODEL.to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: ProviderType::default(),
            model: default_model(),
            api_key: None,
            endpoint: None,
        }
    }
}

impl ProviderConfig {
    /// Validate static settings. The credential is checked separately by
    /// [`ProviderConfig::resolve_api_key`].
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("Model name cannot be empty".to_string());
        }

        if let Some(endpoint) = &self.endpoint {
            let url = reqwest::Url::parse(endpoint)
                .map_err(|e| format!("Invalid endpoint URL '{}': {}", endpoint, e))?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(format!(
                    "Endpoint URL '{}' must use http or https",
                    endpoint
                ));
            }
        } else if self.provider_type == ProviderType::OpenAICompatible {
            return Err("openai-compatible providers require an endpoint".to_string());
        }

        Ok(())
    }

    /// The credential to authenticate with: `api_key` if non-blank, else OPENAI_API_KEY.
    pub fn resolve_api_key(&self) -> Result<String, AssetError> {
        self.resolve_api_key_with(std::env::var(API_KEY_ENV).ok())
    }

    /// Same as [`Self::resolve_api_key`] with the environment value supplied by the caller.
    pub fn resolve_api_key_with(&self, env_value: Option<String>) -> Result<String, AssetError> {
        let configured = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty());
        let from_env = env_value
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty());

        configured.or(from_env).map(str::to_string).ok_or_else(|| {
            AssetError::Configuration(format!(
                "No provider credential: set provider.api_key or {}",
                API_KEY_ENV
            ))
        })
    }
}

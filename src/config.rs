//! Configuration System
//!
//! Layered configuration for provider access, batch generation, WebP conversion, and
//! logging. Built once at command start and passed down explicitly.

use crate::logging::LoggingConfig;
use crate::optimize::OptimizeConfig;
use serde::{Deserialize, Serialize};

mod facade;
mod generation;
mod merge_policy;
mod sources;

pub use crate::provider::{ProviderConfig, ProviderType};
pub use facade::ConfigLoader;
pub use generation::{AnchorMode, GenerationConfig, OutputFormat};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Image provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Batch generation settings
    #[serde(default)]
    pub generation: GenerationConfig,

    /// WebP conversion settings
    #[serde(default)]
    pub optimize: OptimizeConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Provider(String),
    Generation(String),
    Optimize(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Provider(msg) => write!(f, "provider: {}", msg),
            ValidationError::Generation(msg) => write!(f, "generation: {}", msg),
            ValidationError::Optimize(msg) => write!(f, "optimize: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl AssetConfig {
    /// Validate the entire configuration, collecting every problem.
    ///
    /// The credential is not checked here; it is resolved when a provider client is built so
    /// that `status`, `optimize`, and `config` work without one.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.provider.validate() {
            errors.push(ValidationError::Provider(e));
        }
        errors.extend(
            self.generation
                .validate()
                .into_iter()
                .map(ValidationError::Generation),
        );
        if let Err(e) = self.optimize.validate() {
            errors.push(ValidationError::Optimize(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Copy of the configuration that is safe to print.
    pub fn redacted(&self) -> AssetConfig {
        let mut copy = self.clone();
        if copy.provider.api_key.is_some() {
            copy.provider.api_key = Some("***".to_string());
        }
        copy
    }
}

/// Join validation errors into a single configuration error.
pub fn validation_failure(errors: &[ValidationError]) -> crate::error::AssetError {
    let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    crate::error::AssetError::Configuration(format!(
        "Configuration validation failed:\n{}",
        msgs.join("\n")
    ))
}

//! Error types for batch asset generation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by configuration, generation, and conversion.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider request failed: {0}")]
    ProviderRequestFailed(String),

    #[error("Provider authentication failed: {0}")]
    ProviderAuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    ProviderRateLimit(String),

    #[error("Unrecognized provider result: {0}")]
    UnrecognizedResult(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AssetError {
    /// Wrap an I/O error together with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AssetError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for every failure that originates in a provider call or in decoding its result.
    pub fn is_provider_error(&self) -> bool {
        matches!(
            self,
            AssetError::Provider(_)
                | AssetError::ProviderRequestFailed(_)
                | AssetError::ProviderAuthFailed(_)
                | AssetError::ProviderRateLimit(_)
                | AssetError::UnrecognizedResult(_)
        )
    }

    pub fn is_configuration_error(&self) -> bool {
        matches!(self, AssetError::Configuration(_))
    }
}

impl From<config::ConfigError> for AssetError {
    fn from(err: config::ConfigError) -> Self {
        AssetError::Configuration(err.to_string())
    }
}

impl From<csv::Error> for AssetError {
    fn from(err: csv::Error) -> Self {
        AssetError::Configuration(format!("Invalid manifest: {}", err))
    }
}

//! Resolved, validated settings for one run.

use crate::config::{AnchorMode, GenerationConfig, OutputFormat};
use crate::error::AssetError;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Which reference image each provider call receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorPolicy {
    /// First fresh output anchors every later item.
    FirstOutput,
    /// `anchor` seeds the chain; each new primary output replaces it.
    Chained { anchor: PathBuf },
}

/// Everything the driver needs, with paths resolved against the workspace root.
#[derive(Debug, Clone)]
pub struct BatchSettings {
    pub manifest_path: PathBuf,
    pub output_dir: PathBuf,
    pub policy: AnchorPolicy,
    pub size: String,
    pub default_quality: String,
    pub images_per_item: u32,
    pub output_format: OutputFormat,
    pub throttle: Duration,
}

impl BatchSettings {
    pub fn from_config(config: &GenerationConfig, workspace_root: &Path) -> Result<Self, AssetError> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(AssetError::Configuration(format!(
                "Invalid generation settings: {}",
                errors.join("; ")
            )));
        }

        let policy = match config.anchor_mode {
            AnchorMode::FirstOutput => AnchorPolicy::FirstOutput,
            AnchorMode::Chained => {
                let anchor = config.anchor_path.as_deref().ok_or_else(|| {
                    AssetError::Configuration(
                        "anchor_path is required when anchor_mode is 'chained'".to_string(),
                    )
                })?;
                AnchorPolicy::Chained {
                    anchor: resolve(workspace_root, anchor),
                }
            }
        };

        Ok(Self {
            manifest_path: resolve(workspace_root, &config.manifest_path),
            output_dir: resolve(workspace_root, &config.output_dir),
            policy,
            size: config.size.clone(),
            default_quality: config.default_quality.trim().to_string(),
            images_per_item: config.images_per_item,
            output_format: config.output_format,
            throttle: Duration::try_from_secs_f64(config.throttle_secs).map_err(|e| {
                AssetError::Configuration(format!(
                    "Invalid throttle_secs {}: {}",
                    config.throttle_secs, e
                ))
            })?,
        })
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

//! `[generation]` section: manifest, output layout, anchor policy, and throttle.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub(crate) const DEFAULT_MANIFEST: &str = "prompts.csv";
pub(crate) const DEFAULT_OUTPUT_DIR: &str = "generated";
pub(crate) const DEFAULT_SIZE: &str = "1024x1024";
pub(crate) const DEFAULT_QUALITY: &str = "high";
pub(crate) const DEFAULT_IMAGES_PER_ITEM: u32 = 2;
pub(crate) const DEFAULT_THROTTLE_SECS: f64 = 1.2;

/// How the reference image is chosen across a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorMode {
    /// No fixed anchor: the first freshly generated image anchors every later item.
    #[default]
    FirstOutput,
    /// A pre-existing anchor file seeds the chain; each new output becomes the next reference.
    Chained,
}

impl std::fmt::Display for AnchorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnchorMode::FirstOutput => write!(f, "first-output"),
            AnchorMode::Chained => write!(f, "chained"),
        }
    }
}

impl std::str::FromStr for AnchorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first-output" => Ok(AnchorMode::FirstOutput),
            "chained" => Ok(AnchorMode::Chained),
            other => Err(format!(
                "unknown anchor mode '{}' (expected 'first-output' or 'chained')",
                other
            )),
        }
    }
}

/// Encoding requested from the provider and used for output file extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl OutputFormat {
    /// Wire name sent to the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Webp => "webp",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Webp => "webp",
        }
    }
}

/// Batch generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// CSV manifest with `filename`, `prompt`, and optional `quality` columns
    #[serde(default = "default_manifest_path")]
    pub manifest_path: PathBuf,

    /// Directory generated assets are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default)]
    pub anchor_mode: AnchorMode,

    /// Required when `anchor_mode = "chained"`
    #[serde(default)]
    pub anchor_path: Option<PathBuf>,

    /// Target size (`WxH` or `auto`), identical for every call in a run
    #[serde(default = "default_size")]
    pub size: String,

    /// Quality tier used when a manifest row leaves it blank
    #[serde(default = "default_quality")]
    pub default_quality: String,

    #[serde(default = "default_images_per_item")]
    pub images_per_item: u32,

    #[serde(default)]
    pub output_format: OutputFormat,

    /// Pause after each generated item, in seconds
    #[serde(default = "default_throttle_secs")]
    pub throttle_secs: f64,
}

fn default_manifest_path() -> PathBuf {
    PathBuf::from(DEFAULT_MANIFEST)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_size() -> String {
    DEFAULT_SIZE.to_string()
}

fn default_quality() -> String {
    DEFAULT_QUALITY.to_string()
}

fn default_images_per_item() -> u32 {
    DEFAULT_IMAGES_PER_ITEM
}

fn default_throttle_secs() -> f64 {
    DEFAULT_THROTTLE_SECS
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            manifest_path: default_manifest_path(),
            output_dir: default_output_dir(),
            anchor_mode: AnchorMode::default(),
            anchor_path: None,
            size: default_size(),
            default_quality: default_quality(),
            images_per_item: default_images_per_item(),
            output_format: OutputFormat::default(),
            throttle_secs: default_throttle_secs(),
        }
    }
}

impl GenerationConfig {
    /// Validate generation settings, returning one message per problem.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.manifest_path.as_os_str().is_empty() {
            errors.push("manifest_path cannot be empty".to_string());
        }
        if self.output_dir.as_os_str().is_empty() {
            errors.push("output_dir cannot be empty".to_string());
        }
        if self.images_per_item == 0 {
            errors.push("images_per_item must be at least 1".to_string());
        }
        if !is_valid_size(&self.size) {
            errors.push(format!(
                "size '{}' must be 'auto' or WIDTHxHEIGHT with non-zero sides",
                self.size
            ));
        }
        if self.default_quality.trim().is_empty() {
            errors.push("default_quality cannot be blank".to_string());
        }
        if std::time::Duration::try_from_secs_f64(self.throttle_secs).is_err() {
            errors.push(format!(
                "throttle_secs must be a non-negative number of seconds in range, got {}",
                self.throttle_secs
            ));
        }
        if self.anchor_mode == AnchorMode::Chained && self.anchor_path.is_none() {
            errors.push("anchor_path is required when anchor_mode is 'chained'".to_string());
        }

        errors
    }
}

fn is_valid_size(size: &str) -> bool {
    if size == "auto" {
        return true;
    }
    match size.split_once('x') {
        Some((w, h)) => matches!(
            (w.parse::<u32>(), h.parse::<u32>()),
            (Ok(w), Ok(h)) if w > 0 && h > 0
        ),
        None => false,
    }
}

//! Merge rules: defaults applied before any file or environment source.

use super::generation::{
    DEFAULT_IMAGES_PER_ITEM, DEFAULT_MANIFEST, DEFAULT_OUTPUT_DIR, DEFAULT_QUALITY, DEFAULT_SIZE,
    DEFAULT_THROTTLE_SECS,
};
use crate::provider::profile::DEFAULT_IMAGE_MODEL;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("provider.provider_type", "openai")?
        .set_default("provider.model", DEFAULT_IMAGE_MODEL)?
        .set_default("generation.manifest_path", DEFAULT_MANIFEST)?
        .set_default("generation.output_dir", DEFAULT_OUTPUT_DIR)?
        .set_default("generation.anchor_mode", "first-output")?
        .set_default("generation.size", DEFAULT_SIZE)?
        .set_default("generation.default_quality", DEFAULT_QUALITY)?
        .set_default("generation.images_per_item", DEFAULT_IMAGES_PER_ITEM as i64)?
        .set_default("generation.output_format", "png")?
        .set_default("generation.throttle_secs", DEFAULT_THROTTLE_SECS)
}

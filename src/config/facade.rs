//! Config loading facade: one entry point that assembles every source in precedence order.

use super::merge_policy::builder_with_defaults;
use super::sources::{environment, global_file, workspace_file};
use super::AssetConfig;
use crate::error::AssetError;
use config::{File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads [`AssetConfig`] from defaults, files, and the environment.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (highest last): defaults, global file, workspace `config/config.toml`,
    /// workspace `config/{ASSETFORGE_ENV}.toml`, `ASSETFORGE__*` environment variables.
    pub fn load(workspace_root: &Path) -> Result<AssetConfig, AssetError> {
        let builder = builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder);

        let config: AssetConfig = builder.build()?.try_deserialize()?;
        debug!(workspace = %workspace_root.display(), "Configuration loaded");
        Ok(config)
    }

    /// Load configuration from a single explicit file on top of the defaults.
    /// Environment overrides still apply.
    pub fn load_from_file(path: &Path) -> Result<AssetConfig, AssetError> {
        if !path.exists() {
            return Err(AssetError::Configuration(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let builder = builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()).format(FileFormat::Toml));
        let builder = environment::add_to_builder(builder);

        let config: AssetConfig = builder.build()?.try_deserialize()?;
        debug!(config_path = %path.display(), "Configuration loaded from file");
        Ok(config)
    }

    /// Location of the user-level config file, when one can be determined.
    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}

//! Batch generation: settings, output layout, anchor chaining, planning, and the driver.

pub mod chain;
pub mod driver;
pub mod layout;
pub mod plan;
pub mod settings;

pub use chain::AnchorChain;
pub use driver::{check_anchor, run_batch, BatchDriver, RunSummary};
pub use layout::{Completion, OutputLayout};
pub use plan::{plan_run, PlannedAction, PlannedItem};
pub use settings::{AnchorPolicy, BatchSettings};

use crate::config::AssetConfig;
use crate::error::AssetError;
use crate::provider::ProviderFactory;
use std::path::Path;

/// Full generation run for a workspace: resolve settings, build the configured provider
/// (which checks the credential), then drive the batch.
pub async fn run(config: &AssetConfig, workspace_root: &Path) -> Result<RunSummary, AssetError> {
    let settings = BatchSettings::from_config(&config.generation, workspace_root)?;
    let provider = ProviderFactory::create(&config.provider)?;
    run_batch(&settings, provider).await
}

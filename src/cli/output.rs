//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::AssetError;

/// Map domain errors to a string for CLI output, with a resume hint for provider failures.
pub fn map_error(e: &AssetError) -> String {
    if e.is_provider_error() {
        format!("{}\nCompleted items are kept; run the same command again to resume.", e)
    } else {
        e.to_string()
    }
}

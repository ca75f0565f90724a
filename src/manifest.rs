//! Work list loading from a CSV manifest (`filename,prompt[,quality]`).

use crate::error::AssetError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// One row of the manifest. Row order is the chaining order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Output filename stem
    pub identifier: String,
    /// Generation instruction
    pub instruction: String,
    /// Provider quality tier; `None` means use the configured default
    pub quality: Option<String>,
}

impl WorkItem {
    pub fn quality_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.quality.as_deref().unwrap_or(default)
    }
}

#[derive(Debug, Deserialize)]
struct ManifestRow {
    filename: Option<String>,
    prompt: Option<String>,
    #[serde(default)]
    quality: Option<String>,
}

/// Load and validate the manifest at `path`.
pub fn load_manifest(path: &Path) -> Result<Vec<WorkItem>, AssetError> {
    let file = std::fs::File::open(path).map_err(|e| {
        AssetError::Configuration(format!("Cannot read manifest {}: {}", path.display(), e))
    })?;
    parse_manifest(file)
        .map_err(|e| AssetError::Configuration(format!("{} ({})", e, path.display())))
}

/// Parse manifest rows from any reader. Fields are trimmed; blank quality counts as absent.
pub fn parse_manifest<R: std::io::Read>(reader: R) -> Result<Vec<WorkItem>, String> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| format!("Invalid manifest header: {}", e))?
        .clone();
    for required in ["filename", "prompt"] {
        if !headers.iter().any(|h| h == required) {
            return Err(format!("Manifest is missing required column '{}'", required));
        }
    }

    let mut items = Vec::new();
    let mut seen = HashSet::new();
    for (idx, row) in csv_reader.deserialize::<ManifestRow>().enumerate() {
        let row_number = idx + 1;
        let row = row.map_err(|e| format!("Invalid manifest row {}: {}", row_number, e))?;

        let identifier = row.filename.unwrap_or_default().trim().to_string();
        let instruction = row.prompt.unwrap_or_default().trim().to_string();
        if identifier.is_empty() {
            return Err(format!("Manifest row {} has an empty filename", row_number));
        }
        if !is_plain_name(&identifier) {
            return Err(format!(
                "Manifest row {} filename '{}' must be a plain name without path separators",
                row_number, identifier
            ));
        }
        if instruction.is_empty() {
            return Err(format!(
                "Manifest row {} ('{}') has an empty prompt",
                row_number, identifier
            ));
        }
        if !seen.insert(identifier.clone()) {
            return Err(format!(
                "Manifest row {} repeats filename '{}'",
                row_number, identifier
            ));
        }

        let quality = row
            .quality
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());

        items.push(WorkItem {
            identifier,
            instruction,
            quality,
        });
    }

    if items.is_empty() {
        return Err("Manifest has no work items".to_string());
    }
    Ok(items)
}

/// Identifiers become file names inside the output directory.
fn is_plain_name(identifier: &str) -> bool {
    identifier != "."
        && identifier != ".."
        && !identifier.contains(&['/', '\\'][..])
}

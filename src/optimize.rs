//! WebP conversion for generated assets.
//!
//! Walks a directory tree and writes a `.webp` sibling for every source image. One bad file
//! is logged and counted; it never stops the walk.

use crate::error::AssetError;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// `[optimize]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeConfig {
    /// Directory walked when `optimize` is run without an explicit root
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Extensions (case-insensitive, without dot) that are converted
    #[serde(default = "default_source_extensions")]
    pub source_extensions: Vec<String>,

    /// Leave sources alone when their `.webp` sibling is at least as new
    #[serde(default)]
    pub skip_existing: bool,
}

fn default_root() -> PathBuf {
    PathBuf::from("public/assets/images")
}

fn default_source_extensions() -> Vec<String> {
    vec!["png".to_string()]
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            source_extensions: default_source_extensions(),
            skip_existing: false,
        }
    }
}

impl OptimizeConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.source_extensions.is_empty() {
            return Err("source_extensions cannot be empty".to_string());
        }
        if self
            .source_extensions
            .iter()
            .any(|ext| ext.trim_start_matches('.').eq_ignore_ascii_case("webp"))
        {
            return Err("source_extensions cannot include webp".to_string());
        }
        Ok(())
    }

    fn matches(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().map(|e| e.to_string_lossy()) else {
            return false;
        };
        self.source_extensions
            .iter()
            .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(&ext))
    }
}

/// Result of one conversion pass.
#[derive(Debug, Default, Serialize)]
pub struct OptimizeReport {
    pub converted: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<ConversionFailure>,
}

#[derive(Debug, Serialize)]
pub struct ConversionFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Convert every matching image under `root`.
pub fn optimize_images(root: &Path, config: &OptimizeConfig) -> Result<OptimizeReport, AssetError> {
    if !root.is_dir() {
        return Err(AssetError::Configuration(format!(
            "Optimize root is not a directory: {}",
            root.display()
        )));
    }

    let mut report = OptimizeReport::default();
    let mut sources = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        match entry {
            Ok(entry) if entry.file_type().is_file() && config.matches(entry.path()) => {
                sources.push(entry.into_path());
            }
            Ok(_) => {}
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                warn!(path = %path.display(), error = %e, "Could not read directory entry");
                report.failed.push(ConversionFailure {
                    path,
                    error: e.to_string(),
                });
            }
        }
    }
    sources.sort();

    for source in sources {
        let target = source.with_extension("webp");
        if config.skip_existing && is_up_to_date(&source, &target) {
            report.skipped.push(source);
            continue;
        }
        match convert_to_webp(&source, &target) {
            Ok(()) => {
                info!(source = %source.display(), target = %target.display(), "Converted");
                report.converted.push(target);
            }
            Err(e) => {
                warn!(source = %source.display(), error = %format!("{:#}", e), "Could not convert");
                report.failed.push(ConversionFailure {
                    path: source,
                    error: format!("{:#}", e),
                });
            }
        }
    }

    info!(
        converted = report.converted.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "Image optimization complete"
    );
    Ok(report)
}

/// Lossless WebP encode of `source` into `target`.
fn convert_to_webp(source: &Path, target: &Path) -> anyhow::Result<()> {
    let img = image::open(source).with_context(|| format!("decoding {}", source.display()))?;
    img.to_rgba8()
        .save_with_format(target, image::ImageFormat::WebP)
        .with_context(|| format!("encoding {}", target.display()))?;
    Ok(())
}

fn is_up_to_date(source: &Path, target: &Path) -> bool {
    let modified = |p: &Path| std::fs::metadata(p).and_then(|m| m.modified()).ok();
    match (modified(source), modified(target)) {
        (Some(src), Some(dst)) => dst >= src,
        _ => false,
    }
}

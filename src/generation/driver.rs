//! Batch driver: one sequential, resumable pass over the work list.

use super::chain::AnchorChain;
use super::layout::OutputLayout;
use super::settings::{AnchorPolicy, BatchSettings};
use crate::error::AssetError;
use crate::manifest::{load_manifest, WorkItem};
use crate::provider::{ImageFetcher, ImageProvider, ImageRequest};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped: usize,
    pub output_dir: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Drives the provider over work items in order, skipping completed ones and threading the
/// anchor chain through every call.
pub struct BatchDriver<'a> {
    provider: Box<dyn ImageProvider>,
    fetcher: ImageFetcher,
    settings: &'a BatchSettings,
    layout: OutputLayout,
}

impl<'a> BatchDriver<'a> {
    pub fn new(provider: Box<dyn ImageProvider>, settings: &'a BatchSettings) -> Result<Self, AssetError> {
        Ok(Self {
            provider,
            fetcher: ImageFetcher::new()?,
            layout: OutputLayout::new(
                settings.output_dir.clone(),
                settings.images_per_item,
                settings.output_format,
            ),
            settings,
        })
    }

    /// Process every item. The first failing item aborts the run; outputs written for earlier
    /// items stay on disk so the next run resumes after them.
    pub async fn run(&mut self, items: &[WorkItem]) -> Result<RunSummary, AssetError> {
        let started_at = Utc::now();
        let mut chain = AnchorChain::new(&self.settings.policy);
        let mut processed = 0;
        let mut skipped = 0;

        for (idx, item) in items.iter().enumerate() {
            let primary = self.layout.primary_path(&item.identifier);

            if self.layout.is_complete(&item.identifier) {
                debug!(identifier = %item.identifier, "Outputs present, skipping");
                chain.record_skipped(&primary);
                skipped += 1;
                continue;
            }

            let reference = chain.reference().map(Path::to_path_buf);
            let mode = if reference.is_some() { "conditioned" } else { "fresh" };
            info!(
                identifier = %item.identifier,
                position = idx + 1,
                total = items.len(),
                mode,
                outputs = self.settings.images_per_item,
                reference = ?reference,
                "Generating"
            );

            if let Err(e) = self.generate_item(item, reference).await {
                error!(
                    identifier = %item.identifier,
                    error = %e,
                    "Generation failed; re-run to resume from this item"
                );
                return Err(e);
            }

            chain.record_generated(&primary);
            processed += 1;

            if !self.settings.throttle.is_zero() {
                tokio::time::sleep(self.settings.throttle).await;
            }
        }

        let summary = RunSummary {
            processed,
            skipped,
            output_dir: self.layout.dir().to_path_buf(),
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            processed = summary.processed,
            skipped = summary.skipped,
            output_dir = %summary.output_dir.display(),
            "Batch complete"
        );
        Ok(summary)
    }

    /// Call the provider for one item and write every expected file. A partially complete
    /// item is regenerated in full.
    async fn generate_item(&self, item: &WorkItem, reference: Option<PathBuf>) -> Result<(), AssetError> {
        let expected = self.layout.expected_paths(&item.identifier);
        let request = ImageRequest {
            prompt: item.instruction.clone(),
            reference,
            count: self.settings.images_per_item,
            size: self.settings.size.clone(),
            quality: item.quality_or(&self.settings.default_quality).to_string(),
            output_format: self.settings.output_format,
        };

        let outputs = self.provider.generate(request).await?;
        if outputs.len() != expected.len() {
            return Err(AssetError::Provider(format!(
                "Expected {} images for '{}', provider returned {}",
                expected.len(),
                item.identifier,
                outputs.len()
            )));
        }

        // Every output must resolve before any file is touched
        let mut images = Vec::with_capacity(outputs.len());
        for output in outputs {
            images.push(self.fetcher.resolve(output).await?);
        }

        write_outputs(&expected, &images)?;
        for (path, bytes) in expected.iter().zip(images.iter()) {
            debug!(path = %path.display(), bytes = bytes.len(), "Wrote output");
        }
        Ok(())
    }
}

fn part_path(path: &Path) -> PathBuf {
    let mut part_name = path.as_os_str().to_os_string();
    part_name.push(".part");
    PathBuf::from(part_name)
}

/// Stage every image as a `.part` sibling, drop stale outputs of the item, then rename the
/// staged files into place. A failure at any step leaves the item incomplete on disk.
fn write_outputs(paths: &[PathBuf], images: &[Vec<u8>]) -> Result<(), AssetError> {
    let staged: Vec<PathBuf> = paths.iter().map(|p| part_path(p)).collect();

    for (part, bytes) in staged.iter().zip(images.iter()) {
        if let Err(e) = std::fs::write(part, bytes) {
            for leftover in &staged {
                let _ = std::fs::remove_file(leftover);
            }
            return Err(AssetError::io(part, e));
        }
    }

    for path in paths {
        match std::fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(AssetError::io(path, e)),
        }
    }

    for (part, path) in staged.iter().zip(paths.iter()) {
        std::fs::rename(part, path).map_err(|e| AssetError::io(path, e))?;
    }
    Ok(())
}

/// Check run preconditions, create the output directory, and drive the batch.
///
/// The manifest and anchor checks happen before anything is created or any provider call
/// is made.
pub async fn run_batch(
    settings: &BatchSettings,
    provider: Box<dyn ImageProvider>,
) -> Result<RunSummary, AssetError> {
    let items = load_manifest(&settings.manifest_path)?;
    check_anchor(&settings.policy)?;

    std::fs::create_dir_all(&settings.output_dir)
        .map_err(|e| AssetError::io(&settings.output_dir, e))?;

    info!(
        items = items.len(),
        provider = provider.provider_name(),
        model = provider.model_name(),
        output_dir = %settings.output_dir.display(),
        "Starting batch"
    );

    let mut driver = BatchDriver::new(provider, settings)?;
    driver.run(&items).await
}

/// In chained mode the anchor file must exist before the run starts.
pub fn check_anchor(policy: &AnchorPolicy) -> Result<(), AssetError> {
    if let AnchorPolicy::Chained { anchor } = policy {
        if !anchor.is_file() {
            return Err(AssetError::Configuration(format!(
                "Anchor image not found: {}",
                anchor.display()
            )));
        }
    }
    Ok(())
}

//! Shared test utilities for integration tests
//!
//! A temporary workspace with a manifest and batch settings pointing into it.

use assetforge::config::OutputFormat;
use assetforge::generation::{AnchorPolicy, BatchSettings};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

pub struct TestWorkspace {
    pub dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root().join("prompts.csv")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root().join("generated")
    }

    /// Settings with no throttle so tests run at full speed.
    pub fn settings(&self, policy: AnchorPolicy, images_per_item: u32) -> BatchSettings {
        BatchSettings {
            manifest_path: self.manifest_path(),
            output_dir: self.output_dir(),
            policy,
            size: "1024x1024".to_string(),
            default_quality: "high".to_string(),
            images_per_item,
            output_format: OutputFormat::Png,
            throttle: Duration::ZERO,
        }
    }

    /// Write an anchor image next to the manifest and return its path.
    pub fn write_anchor(&self) -> PathBuf {
        let anchor = self.root().join("anchor.png");
        std::fs::write(&anchor, b"anchor-pixels").unwrap();
        anchor
    }
}

/// Write `prompts.csv` with the given `(filename, prompt)` rows.
pub fn write_manifest(path: &Path, rows: &[(&str, &str)]) {
    let mut content = String::from("filename,prompt\n");
    for (id, prompt) in rows {
        content.push_str(&format!("{},\"{}\"\n", id, prompt));
    }
    std::fs::write(path, content).unwrap();
}

/// Contents of every file in `dir`, sorted by name.
pub fn item_outputs(dir: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files: Vec<(String, Vec<u8>)> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap())
        .map(|e| {
            (
                e.file_name().to_string_lossy().into_owned(),
                std::fs::read(e.path()).unwrap(),
            )
        })
        .collect();
    files.sort();
    files
}

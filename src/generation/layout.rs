//! Output file naming and completion checks. The files on disk are the only record of
//! finished work.

use crate::config::OutputFormat;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// How much of an item's expected output exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum Completion {
    Complete,
    Partial { present: usize, expected: usize },
    Missing,
}

/// Maps identifiers to output paths under one directory.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    dir: PathBuf,
    images_per_item: u32,
    extension: &'static str,
}

impl OutputLayout {
    pub fn new(dir: PathBuf, images_per_item: u32, format: OutputFormat) -> Self {
        Self {
            dir,
            images_per_item: images_per_item.max(1),
            extension: format.extension(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<id>.<ext>` for single-image items, `<id>_v1.<ext>` .. `<id>_vN.<ext>` otherwise.
    pub fn expected_paths(&self, identifier: &str) -> Vec<PathBuf> {
        if self.images_per_item == 1 {
            return vec![self.dir.join(format!("{}.{}", identifier, self.extension))];
        }
        (1..=self.images_per_item)
            .map(|n| self.dir.join(format!("{}_v{}.{}", identifier, n, self.extension)))
            .collect()
    }

    /// The file that anchors or advances the chain for this item.
    pub fn primary_path(&self, identifier: &str) -> PathBuf {
        if self.images_per_item == 1 {
            self.dir.join(format!("{}.{}", identifier, self.extension))
        } else {
            self.dir.join(format!("{}_v1.{}", identifier, self.extension))
        }
    }

    pub fn completion(&self, identifier: &str) -> Completion {
        let expected = self.expected_paths(identifier);
        let present = expected.iter().filter(|p| is_written(p)).count();
        if present == expected.len() {
            Completion::Complete
        } else if present == 0 {
            Completion::Missing
        } else {
            Completion::Partial {
                present,
                expected: expected.len(),
            }
        }
    }

    /// True only when every expected file exists and is non-empty.
    pub fn is_complete(&self, identifier: &str) -> bool {
        self.completion(identifier) == Completion::Complete
    }
}

fn is_written(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

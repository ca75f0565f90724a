//! Anchor chaining state for one run. Owned by a single driver; never shared.

use super::settings::AnchorPolicy;
use std::path::{Path, PathBuf};

/// The reference image the next provider call receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorChain {
    /// Empty until the first fresh generation; fixed afterwards.
    FirstOutput { anchor: Option<PathBuf> },
    /// Starts at the configured anchor; follows the newest primary output.
    Chained { pointer: PathBuf },
}

impl AnchorChain {
    pub fn new(policy: &AnchorPolicy) -> Self {
        match policy {
            AnchorPolicy::FirstOutput => AnchorChain::FirstOutput { anchor: None },
            AnchorPolicy::Chained { anchor } => AnchorChain::Chained {
                pointer: anchor.clone(),
            },
        }
    }

    /// `None` means the next call is a fresh generation.
    pub fn reference(&self) -> Option<&Path> {
        match self {
            AnchorChain::FirstOutput { anchor } => anchor.as_deref(),
            AnchorChain::Chained { pointer } => Some(pointer.as_path()),
        }
    }

    /// An item was already complete on disk. Chained mode moves the pointer to its existing
    /// primary output; first-output mode only anchors on freshly generated images.
    pub fn record_skipped(&mut self, primary: &Path) {
        if let AnchorChain::Chained { pointer } = self {
            *pointer = primary.to_path_buf();
        }
    }

    /// An item was just generated and written.
    pub fn record_generated(&mut self, primary: &Path) {
        match self {
            AnchorChain::FirstOutput { anchor } => {
                if anchor.is_none() {
                    *anchor = Some(primary.to_path_buf());
                }
            }
            AnchorChain::Chained { pointer } => *pointer = primary.to_path_buf(),
        }
    }
}

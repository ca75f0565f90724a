//! Dry-run planning: what a run would do right now, without calling a provider.

use super::chain::AnchorChain;
use super::layout::{Completion, OutputLayout};
use super::settings::AnchorPolicy;
use crate::manifest::WorkItem;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum PlannedAction {
    Skip,
    /// `reference = None` is a fresh generation.
    Generate { reference: Option<PathBuf> },
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedItem {
    pub identifier: String,
    pub completion: Completion,
    pub action: PlannedAction,
    pub outputs: Vec<PathBuf>,
}

/// Walk the items in order the way the driver would, assuming every generation succeeds.
pub fn plan_run(items: &[WorkItem], layout: &OutputLayout, policy: &AnchorPolicy) -> Vec<PlannedItem> {
    let mut chain = AnchorChain::new(policy);
    items
        .iter()
        .map(|item| {
            let completion = layout.completion(&item.identifier);
            let primary = layout.primary_path(&item.identifier);
            let action = if completion == Completion::Complete {
                chain.record_skipped(&primary);
                PlannedAction::Skip
            } else {
                let reference = chain.reference().map(|p| p.to_path_buf());
                chain.record_generated(&primary);
                PlannedAction::Generate { reference }
            };
            PlannedItem {
                identifier: item.identifier.clone(),
                completion,
                action,
                outputs: layout.expected_paths(&item.identifier),
            }
        })
        .collect()
}

//! Property-based tests for output naming and anchor chaining

use assetforge::config::OutputFormat;
use assetforge::generation::{
    plan_run, AnchorChain, AnchorPolicy, OutputLayout, PlannedAction,
};
use assetforge::manifest::WorkItem;
use proptest::prelude::*;
use std::collections::HashSet;
use std::path::PathBuf;

fn items(count: usize) -> Vec<WorkItem> {
    (0..count)
        .map(|i| WorkItem {
            identifier: format!("item{}", i),
            instruction: format!("prompt {}", i),
            quality: None,
        })
        .collect()
}

proptest! {
    /// Every item gets exactly N distinct paths and the primary is always one of them
    #[test]
    fn test_expected_paths_shape(id in "[a-z][a-z0-9_-]{0,15}", n in 1u32..8) {
        let layout = OutputLayout::new(PathBuf::from("out"), n, OutputFormat::Png);
        let paths = layout.expected_paths(&id);
        prop_assert_eq!(paths.len(), n as usize);
        let unique: HashSet<_> = paths.iter().collect();
        prop_assert_eq!(unique.len(), paths.len());
        prop_assert_eq!(&paths[0], &layout.primary_path(&id));
    }

    /// First-output mode: once set, the anchor never changes
    #[test]
    fn test_first_output_anchor_is_stable(events in proptest::collection::vec(any::<bool>(), 1..30)) {
        let mut chain = AnchorChain::new(&AnchorPolicy::FirstOutput);
        let mut first_generated: Option<PathBuf> = None;
        for (i, generated) in events.iter().enumerate() {
            let primary = PathBuf::from(format!("out/item{}.png", i));
            if *generated {
                chain.record_generated(&primary);
                first_generated.get_or_insert(primary);
            } else {
                chain.record_skipped(&primary);
            }
            prop_assert_eq!(chain.reference(), first_generated.as_deref());
        }
    }

    /// Chained mode: the reference is always the most recent item's primary, or the seed
    #[test]
    fn test_chained_reference_is_previous_item(events in proptest::collection::vec(any::<bool>(), 0..30)) {
        let seed = PathBuf::from("anchor.png");
        let mut chain = AnchorChain::new(&AnchorPolicy::Chained { anchor: seed.clone() });
        let mut expected = seed;
        for (i, generated) in events.iter().enumerate() {
            prop_assert_eq!(chain.reference(), Some(expected.as_path()));
            let primary = PathBuf::from(format!("out/item{}.png", i));
            if *generated {
                chain.record_generated(&primary);
            } else {
                chain.record_skipped(&primary);
            }
            expected = primary;
        }
    }

    /// Planning over an empty output directory generates every item exactly once
    #[test]
    fn test_plan_generates_all_when_nothing_exists(count in 1usize..12, n in 1u32..4) {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(dir.path().to_path_buf(), n, OutputFormat::Webp);
        let plan = plan_run(&items(count), &layout, &AnchorPolicy::FirstOutput);

        prop_assert_eq!(plan.len(), count);
        prop_assert_eq!(&plan[0].action, &PlannedAction::Generate { reference: None });
        let anchor = layout.primary_path("item0");
        for planned in &plan[1..] {
            prop_assert_eq!(
                &planned.action,
                &PlannedAction::Generate { reference: Some(anchor.clone()) }
            );
        }
    }
}

//! Integration tests for batch asset generation

mod batch_driver;
mod openai_roundtrip;
mod test_utils;

pub use test_utils::{item_outputs, write_manifest, TestWorkspace};

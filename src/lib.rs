//! Assetforge: resumable batch generation of style-consistent image assets.
//!
//! Reads an ordered manifest of prompts, generates the missing images through an external
//! provider while chaining a style anchor between calls, and converts results to WebP.

pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod logging;
pub mod manifest;
pub mod optimize;
pub mod provider;

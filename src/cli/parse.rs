//! CLI parse: clap types for assetforge. No behavior; definitions only.

use crate::config::AnchorMode;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// assetforge - resumable batch generation of style-consistent image assets
#[derive(Parser)]
#[command(name = "assetforge")]
#[command(about = "Resumable batch generation of style-consistent image assets")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub verbose: bool,

    /// Disable logging
    #[arg(long)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate every missing asset listed in the manifest
    Generate(GenerateArgs),
    /// Show which manifest items are complete, partial, or pending
    Status {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Convert source images under a directory to WebP siblings
    Optimize {
        /// Directory to walk (default: optimize.root from config)
        root: Option<PathBuf>,
    },
    /// Print the effective configuration with secrets redacted
    Config {
        /// Output format (toml or json)
        #[arg(long, default_value = "toml")]
        format: String,
    },
}

/// Overrides for the `[generation]` config section.
#[derive(Args, Debug, Default, Clone)]
pub struct GenerateArgs {
    /// Manifest CSV (filename,prompt[,quality])
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Output directory
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Anchor image for chained mode
    #[arg(long)]
    pub anchor: Option<PathBuf>,

    /// Anchor policy (first-output or chained)
    #[arg(long)]
    pub mode: Option<AnchorMode>,

    /// Images generated per manifest row
    #[arg(long)]
    pub images_per_item: Option<u32>,

    /// Pause after each generated item, in seconds
    #[arg(long)]
    pub throttle_secs: Option<f64>,

    /// Show what would be generated without calling the provider
    #[arg(long)]
    pub dry_run: bool,

    /// Output format (text or json)
    #[arg(long, default_value = "text")]
    pub format: String,
}

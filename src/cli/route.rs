//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::parse::{Commands, GenerateArgs};
use crate::cli::presentation::{
    format_optimize_report_text, format_plan_text, format_run_summary_text, format_status_text,
};
use crate::config::{validation_failure, AssetConfig, ConfigLoader};
use crate::error::AssetError;
use crate::generation::{self, check_anchor, plan_run, BatchSettings, OutputLayout};
use crate::manifest::load_manifest;
use crate::optimize::optimize_images;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Runtime context for CLI execution: workspace root and the loaded configuration.
pub struct RunContext {
    workspace_root: PathBuf,
    config: AssetConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, AssetError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Ok(Self::with_config(workspace_root, config))
    }

    pub fn with_config(workspace_root: PathBuf, config: AssetConfig) -> Self {
        Self {
            workspace_root,
            config,
        }
    }

    pub fn config(&self) -> &AssetConfig {
        &self.config
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Execute a command and return its rendered output.
    pub fn execute(&self, command: &Commands) -> Result<String, AssetError> {
        match command {
            Commands::Generate(args) => self.handle_generate(args),
            Commands::Status { format } => self.handle_status(format),
            Commands::Optimize { root } => self.handle_optimize(root.as_deref()),
            Commands::Config { format } => self.handle_config(format),
        }
    }

    /// Configuration with `generate` flag overrides applied and validated.
    pub fn generation_config(&self, args: &GenerateArgs) -> Result<AssetConfig, AssetError> {
        let mut config = self.config.clone();
        let generation = &mut config.generation;
        if let Some(manifest) = &args.manifest {
            generation.manifest_path = manifest.clone();
        }
        if let Some(out_dir) = &args.out_dir {
            generation.output_dir = out_dir.clone();
        }
        if let Some(anchor) = &args.anchor {
            generation.anchor_path = Some(anchor.clone());
        }
        if let Some(mode) = args.mode {
            generation.anchor_mode = mode;
        }
        if let Some(n) = args.images_per_item {
            generation.images_per_item = n;
        }
        if let Some(secs) = args.throttle_secs {
            generation.throttle_secs = secs;
        }
        config.validate().map_err(|errors| validation_failure(&errors))?;
        Ok(config)
    }

    fn handle_generate(&self, args: &GenerateArgs) -> Result<String, AssetError> {
        let config = self.generation_config(args)?;

        if args.dry_run {
            let settings = BatchSettings::from_config(&config.generation, &self.workspace_root)?;
            let items = load_manifest(&settings.manifest_path)?;
            check_anchor(&settings.policy)?;
            let layout = layout_for(&settings);
            let plan = plan_run(&items, &layout, &settings.policy);
            return if args.format == "json" {
                to_json(&plan)
            } else {
                Ok(format_plan_text(&plan, &settings.output_dir))
            };
        }

        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| AssetError::Runtime(format!("Failed to create async runtime: {}", e)))?;
        let summary = runtime.block_on(generation::run(&config, &self.workspace_root))?;

        if args.format == "json" {
            to_json(&summary)
        } else {
            Ok(format_run_summary_text(&summary))
        }
    }

    fn handle_status(&self, format: &str) -> Result<String, AssetError> {
        let settings = BatchSettings::from_config(&self.config.generation, &self.workspace_root)?;
        let items = load_manifest(&settings.manifest_path)?;
        let layout = layout_for(&settings);
        let plan = plan_run(&items, &layout, &settings.policy);

        if format == "json" {
            to_json(&plan)
        } else {
            Ok(format_status_text(&plan, &settings.output_dir))
        }
    }

    fn handle_optimize(&self, root: Option<&Path>) -> Result<String, AssetError> {
        self.config
            .optimize
            .validate()
            .map_err(|e| AssetError::Configuration(format!("optimize: {}", e)))?;
        let root = root.unwrap_or(self.config.optimize.root.as_path());
        let root = if root.is_absolute() {
            root.to_path_buf()
        } else {
            self.workspace_root.join(root)
        };

        info!(root = %root.display(), "Optimizing images");
        let report = optimize_images(&root, &self.config.optimize)?;
        Ok(format_optimize_report_text(&report, &root))
    }

    fn handle_config(&self, format: &str) -> Result<String, AssetError> {
        self.config
            .validate()
            .map_err(|errors| validation_failure(&errors))?;
        let redacted = self.config.redacted();
        match format {
            "json" => to_json(&redacted),
            "toml" => toml::to_string_pretty(&redacted)
                .map_err(|e| AssetError::Configuration(format!("Failed to render config: {}", e))),
            other => Err(AssetError::Configuration(format!(
                "Unknown format '{}' (expected toml or json)",
                other
            ))),
        }
    }
}

fn layout_for(settings: &BatchSettings) -> OutputLayout {
    OutputLayout::new(
        settings.output_dir.clone(),
        settings.images_per_item,
        settings.output_format,
    )
}

fn to_json<T: Serialize>(value: &T) -> Result<String, AssetError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AssetError::Configuration(format!("Failed to render JSON: {}", e)))
}

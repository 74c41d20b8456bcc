//! `htmlbuild build` command implementation.

use std::path::PathBuf;

use clap::Args;
use htmlbuild_config::{CliSettings, Config};
use htmlbuild_core::{BuildPlan, Preprocessor};

use crate::batch;
use crate::error::CliError;
use crate::output::Output;
use crate::plan_file;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover htmlbuild.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directive tag name (overrides config).
    #[arg(long, env = "HTMLBUILD_TAG_NAME")]
    tag_name: Option<String>,

    /// Default build target (overrides config).
    #[arg(short, long, env = "HTMLBUILD_TARGET")]
    target: Option<String>,

    /// Base directory for destination paths (overrides config).
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Build plan output path (overrides config).
    #[arg(long)]
    plan: Option<PathBuf>,

    /// Seed the build plan from the existing plan file.
    #[arg(long)]
    merge: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            tag_name: self.tag_name,
            target: self.target,
            base_dir: self.base_dir,
            plan_path: self.plan,
            merge_existing: self.merge.then_some(true),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let files = config.require_files()?;
        let build = &config.build_resolved;

        if let Some(path) = &config.config_path {
            output.info(&format!("Config: {}", path.display()));
        }
        output.info(&format!("Target: {}", build.target));

        let mut plan = if build.merge_existing {
            plan_file::load_plan(&build.plan_path)?
        } else {
            BuildPlan::new()
        };

        let mut preprocessor = Preprocessor::new(config.preprocessor_config())?;
        let report = batch::run(&mut preprocessor, files, &mut plan);

        for file in &report.warnings {
            output.warning(&format!("Warnings in {}:", file.src.display()));
            for warning in &file.warnings {
                output.detail(warning);
            }
        }
        for failure in &report.failures {
            output.error(&format!("Failed {}: {}", failure.dest.display(), failure.error));
        }

        plan_file::save_plan(&build.plan_path, &plan)?;
        output.info(&format!("Plan: {}", build.plan_path.display()));

        if !report.failures.is_empty() {
            return Err(CliError::Batch {
                failed: report.failures.len(),
                total: report.total(),
            });
        }

        output.success(&format!(
            "Processed {} files ({} targets in plan)",
            report.written.len(),
            plan.targets().len()
        ));
        Ok(())
    }
}

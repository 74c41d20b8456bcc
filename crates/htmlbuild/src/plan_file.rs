//! Build plan persistence.
//!
//! The plan is stored as pretty-printed JSON with `concat`, `minify` and
//! `bundle` sections so downstream asset tooling can read it directly.

use std::fs;
use std::path::Path;

use htmlbuild_core::BuildPlan;

use crate::error::CliError;

/// Load a previously written plan.
///
/// A missing file yields an empty plan.
pub(crate) fn load_plan(path: &Path) -> Result<BuildPlan, CliError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No existing build plan");
            return Ok(BuildPlan::new());
        }
        Err(e) => return Err(e.into()),
    };

    serde_json::from_str(&content).map_err(|source| CliError::Plan {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `plan` to `path`, creating parent directories.
pub(crate) fn save_plan(path: &Path, plan: &BuildPlan) -> Result<(), CliError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let mut content = serde_json::to_string_pretty(plan).map_err(|source| CliError::Plan {
        path: path.to_path_buf(),
        source,
    })?;
    content.push('\n');
    fs::write(path, content)?;

    tracing::info!(path = %path.display(), targets = plan.targets().len(), "Build plan written");
    Ok(())
}

//! Batch processing of configured file mappings.
//!
//! Each mapping is processed independently: a file that cannot be read,
//! preprocessed or written is recorded as a failure and the batch moves on.
//! The plan only takes a file's contributions once its output is written.

use std::fs;
use std::path::{Path, PathBuf};

use htmlbuild_config::FileMapping;
use htmlbuild_core::{BuildPlan, Preprocessor};

use crate::error::CliError;

/// A mapping that could not be processed.
#[derive(Debug)]
pub(crate) struct FileFailure {
    /// Destination of the failed mapping.
    pub(crate) dest: PathBuf,
    pub(crate) error: CliError,
}

/// Warnings raised while processing one file.
#[derive(Debug)]
pub(crate) struct FileWarnings {
    pub(crate) src: PathBuf,
    pub(crate) warnings: Vec<String>,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub(crate) struct BatchReport {
    /// Destinations written.
    pub(crate) written: Vec<PathBuf>,
    pub(crate) failures: Vec<FileFailure>,
    pub(crate) warnings: Vec<FileWarnings>,
}

impl BatchReport {
    /// Number of mappings attempted.
    pub(crate) fn total(&self) -> usize {
        self.written.len() + self.failures.len()
    }
}

/// Process every mapping, accumulating into `plan`.
pub(crate) fn run(
    preprocessor: &mut Preprocessor,
    files: &[FileMapping],
    plan: &mut BuildPlan,
) -> BatchReport {
    let mut report = BatchReport::default();

    for mapping in files {
        match process_file(preprocessor, mapping, plan) {
            Ok(src) => {
                let warnings = preprocessor.warnings().to_vec();
                if !warnings.is_empty() {
                    report.warnings.push(FileWarnings {
                        src: src.to_path_buf(),
                        warnings,
                    });
                }
                report.written.push(mapping.dest.clone());
            }
            Err(error) => {
                tracing::error!(dest = %mapping.dest.display(), %error, "File failed");
                report.failures.push(FileFailure {
                    dest: mapping.dest.clone(),
                    error,
                });
            }
        }
    }

    report
}

fn process_file<'m>(
    preprocessor: &mut Preprocessor,
    mapping: &'m FileMapping,
    plan: &mut BuildPlan,
) -> Result<&'m Path, CliError> {
    let src = mapping.single_source().ok_or_else(|| {
        CliError::Validation(format!(
            "{}: expected exactly one source file, found {}",
            mapping.dest.display(),
            mapping.sources.len()
        ))
    })?;

    let input = fs::read_to_string(src).map_err(|e| with_path(e, "read", src))?;

    let mut staged = plan.clone();
    let html = preprocessor.process(&input, &mut staged)?;

    if let Some(parent) = mapping.dest.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| with_path(e, "create", parent))?;
    }
    fs::write(&mapping.dest, html).map_err(|e| with_path(e, "write", &mapping.dest))?;

    *plan = staged;
    tracing::info!(src = %src.display(), dest = %mapping.dest.display(), "File processed");
    Ok(src)
}

fn with_path(error: std::io::Error, action: &str, path: &Path) -> CliError {
    CliError::Io(std::io::Error::new(
        error.kind(),
        format!("failed to {action} {}: {error}", path.display()),
    ))
}

//! CLI error types.

use std::path::PathBuf;

use htmlbuild_config::ConfigError;
use htmlbuild_core::PreprocessError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Preprocess(#[from] PreprocessError),

    #[error("invalid build plan {}: {source}", path.display())]
    Plan {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Validation(String),

    #[error("{failed} of {total} files failed")]
    Batch { failed: usize, total: usize },
}

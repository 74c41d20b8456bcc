//! Build actions emitted by directive handlers.
//!
//! Handlers never touch the [`BuildPlan`](crate::BuildPlan) directly. They return
//! an ordered list of actions that the [`Accumulator`](crate::Accumulator)
//! applies synchronously.

use crate::plan::BundleOptions;

/// A single build-plan mutation or log notice.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildAction {
    /// Append `src` to the concatenation list of (`target`, `dest`).
    AddConcatSource {
        target: String,
        dest: String,
        src: String,
    },
    /// Append `src` to the minification list of (`target`, `dest`).
    AddMinifySource {
        target: String,
        dest: String,
        src: String,
    },
    /// Store module-bundle options for `target`.
    SetBundleOptions {
        target: String,
        options: BundleOptions,
    },
    /// Informational message. Never affects control flow.
    Notice { message: String, verbose: bool },
}

impl BuildAction {
    /// Create an [`AddConcatSource`](Self::AddConcatSource) action.
    #[must_use]
    pub fn concat(
        target: impl Into<String>,
        dest: impl Into<String>,
        src: impl Into<String>,
    ) -> Self {
        Self::AddConcatSource {
            target: target.into(),
            dest: dest.into(),
            src: src.into(),
        }
    }

    /// Create an [`AddMinifySource`](Self::AddMinifySource) action.
    #[must_use]
    pub fn minify(
        target: impl Into<String>,
        dest: impl Into<String>,
        src: impl Into<String>,
    ) -> Self {
        Self::AddMinifySource {
            target: target.into(),
            dest: dest.into(),
            src: src.into(),
        }
    }

    /// Create a [`SetBundleOptions`](Self::SetBundleOptions) action.
    #[must_use]
    pub fn bundle(target: impl Into<String>, options: BundleOptions) -> Self {
        Self::SetBundleOptions {
            target: target.into(),
            options,
        }
    }

    /// Create a notice shown at normal verbosity.
    #[must_use]
    pub fn notice(message: impl Into<String>) -> Self {
        Self::Notice {
            message: message.into(),
            verbose: false,
        }
    }

    /// Create a notice shown only in verbose output.
    #[must_use]
    pub fn verbose(message: impl Into<String>) -> Self {
        Self::Notice {
            message: message.into(),
            verbose: true,
        }
    }

    /// Whether this action mutates the build plan.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::Notice { .. })
    }
}

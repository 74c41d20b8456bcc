//! Preprocessing errors.

/// Fatal error while processing a document.
///
/// Any of these aborts the current file. Unregistered directive types are not
/// errors; they produce a warning instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreprocessError {
    /// Directive tag name cannot be turned into a marker pattern.
    #[error("Invalid directive tag name: {0:?}")]
    InvalidTagName(String),

    /// A directive that requires arguments was given none.
    #[error("Missing arguments for {directive}: {usage}")]
    MissingArgument {
        /// Directive type.
        directive: String,
        /// Expected argument syntax.
        usage: &'static str,
    },

    /// A tag lacks an attribute the directive needs.
    #[error("Tag missing {attribute} attribute: {tag}")]
    MissingAttribute {
        /// Attribute name.
        attribute: &'static str,
        /// Raw opening tag.
        tag: String,
    },

    /// Bundle options already exist for the target.
    #[error("A bundle config already exists for the target: {target}")]
    DuplicateTarget {
        /// Target name.
        target: String,
    },
}

//! Handler output types.

use crate::action::BuildAction;

/// Markup that replaces a directive block.
///
/// # Example
///
/// ```
/// use htmlbuild_core::Replacement;
///
/// let single = Replacement::text("<script src=\"app.js\"></script>");
/// assert!(!single.is_empty());
///
/// let lines = Replacement::lines(vec!["<script src=\"a.js\"></script>".to_owned()]);
/// assert!(!lines.is_empty());
///
/// assert!(Replacement::empty().is_empty());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Replacement {
    /// Used verbatim.
    Text(String),
    /// Joined with a newline followed by the block's indentation.
    Lines(Vec<String>),
}

impl Replacement {
    /// Create a verbatim replacement.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Create a line-list replacement.
    #[must_use]
    pub fn lines(lines: Vec<String>) -> Self {
        Self::Lines(lines)
    }

    /// The empty replacement.
    #[must_use]
    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    /// Whether the replacement renders to nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Lines(lines) => lines.is_empty(),
        }
    }

    /// Render with `indent` placed between lines.
    #[must_use]
    pub fn render(&self, indent: &str) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Lines(lines) => lines.join(&format!("\n{indent}")),
        }
    }
}

impl Default for Replacement {
    fn default() -> Self {
        Self::empty()
    }
}

/// Everything a handler produces for one block.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandlerOutput {
    /// Markup written in place of the block.
    pub replacement: Replacement,
    /// Build actions in emission order.
    pub actions: Vec<BuildAction>,
}

impl HandlerOutput {
    /// Output with no replacement and no actions.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Output with the given replacement and actions.
    #[must_use]
    pub fn new(replacement: Replacement, actions: Vec<BuildAction>) -> Self {
        Self {
            replacement,
            actions,
        }
    }
}

/// Build a `<script>` tag referencing `src`.
#[must_use]
pub fn script_tag(src: &str) -> String {
    format!(r#"<script src="{src}"></script>"#)
}

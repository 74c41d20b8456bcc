//! Directive type handlers.
//!
//! Built-in directive types form a closed set ([`DirectiveKind`]). Callers can
//! register their own [`DirectiveHandler`] for any type name, including the
//! built-in ones, and it takes precedence.

mod loader_bundle;
mod script_group;

pub use loader_bundle::LoaderBundleHandler;
pub use script_group::ScriptGroupHandler;

use crate::action::BuildAction;
use crate::context::HandlerContext;
use crate::error::PreprocessError;
use crate::output::{HandlerOutput, script_tag};
use crate::plan::BundleOptions;
use crate::scanner::Block;

/// Handler for one directive type.
///
/// Handlers inspect the block and return a replacement plus build actions.
/// They never mutate the build plan themselves.
///
/// # Thread Safety
///
/// Handlers implement `Send` only (not `Sync`) since each run gets its own
/// processor instance.
///
/// # Example
///
/// ```
/// use htmlbuild_core::{
///     Block, BuildAction, DirectiveHandler, HandlerContext, HandlerOutput, PreprocessError,
///     Replacement,
/// };
///
/// struct StripHandler;
///
/// impl DirectiveHandler for StripHandler {
///     fn name(&self) -> &str { "strip" }
///
///     fn handle(
///         &mut self,
///         block: &Block<'_>,
///         _ctx: &HandlerContext<'_>,
///     ) -> Result<HandlerOutput, PreprocessError> {
///         let notice = BuildAction::verbose(format!("Stripped {} bytes", block.contents.len()));
///         Ok(HandlerOutput::new(Replacement::empty(), vec![notice]))
///     }
/// }
/// ```
pub trait DirectiveHandler: Send {
    /// Directive type this handler answers to (e.g. `script-group`).
    fn name(&self) -> &str;

    /// Produce the replacement and build actions for a block.
    fn handle(
        &mut self,
        block: &Block<'_>,
        ctx: &HandlerContext<'_>,
    ) -> Result<HandlerOutput, PreprocessError>;
}

/// Built-in directive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// `script-loader-bundle` (alias `requirejs`).
    LoaderBundle,
    /// `script-group` (alias `js`).
    ScriptGroup,
    /// Any type without a built-in handler.
    Unregistered,
}

impl DirectiveKind {
    /// Canonical name of the module-bundle directive.
    pub const LOADER_BUNDLE: &'static str = "script-loader-bundle";
    /// Canonical name of the script-grouping directive.
    pub const SCRIPT_GROUP: &'static str = "script-group";

    /// Classify a directive type token.
    #[must_use]
    pub fn from_type(directive: &str) -> Self {
        match directive {
            Self::LOADER_BUNDLE | "requirejs" => Self::LoaderBundle,
            Self::SCRIPT_GROUP | "js" => Self::ScriptGroup,
            _ => Self::Unregistered,
        }
    }

    /// Canonical type name, if built in.
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::LoaderBundle => Some(Self::LOADER_BUNDLE),
            Self::ScriptGroup => Some(Self::SCRIPT_GROUP),
            Self::Unregistered => None,
        }
    }
}

/// Whether a script `src` is root-relative or carries a scheme.
///
/// Such sources are left to the page and never bundled.
#[must_use]
pub fn is_absolute_src(src: &str) -> bool {
    if src.starts_with('/') {
        return true;
    }
    src.split_once("://").is_some_and(|(scheme, _)| {
        !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}

/// Queue a module bundle and return its replacement tag.
///
/// Emits the bundle options for `target` and a minification request for the
/// resolved destination under `minify_target`.
fn push_bundle(
    ctx: &HandlerContext<'_>,
    entry: &str,
    dest: &str,
    target: &str,
    minify_target: &str,
    actions: &mut Vec<BuildAction>,
) -> String {
    let full = ctx.resolve_dest(dest);
    let tag = script_tag(dest);

    actions.push(BuildAction::verbose(format!("Added tag: {tag}")));
    actions.push(BuildAction::bundle(
        target,
        BundleOptions::for_entry(entry, full.clone()),
    ));
    actions.push(BuildAction::minify(minify_target, &full, &full));

    tag
}

/// Fetch the `src` of a tag, failing if absent.
fn require_src(tag: &crate::tags::Tag) -> Result<&str, PreprocessError> {
    tag.get("src").ok_or_else(|| PreprocessError::MissingAttribute {
        attribute: "src",
        tag: tag.html.clone(),
    })
}

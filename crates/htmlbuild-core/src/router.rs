//! Handler dispatch.

use crate::context::HandlerContext;
use crate::error::PreprocessError;
use crate::handler::{DirectiveHandler, DirectiveKind, LoaderBundleHandler, ScriptGroupHandler};
use crate::output::HandlerOutput;
use crate::scanner::Block;

/// Resolves and invokes the handler for each block.
///
/// Caller-registered handlers are checked first, then the built-in table.
/// Blocks of an unregistered type produce an empty output and a warning.
#[derive(Default)]
pub struct Router {
    overrides: Vec<Box<dyn DirectiveHandler>>,
    loader_bundle: LoaderBundleHandler,
    script_group: ScriptGroupHandler,
    warnings: Vec<String>,
}

impl Router {
    /// Create a router with only the built-in handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler that takes precedence for its type name.
    ///
    /// A later registration for the same name replaces the earlier one.
    pub fn register(&mut self, handler: Box<dyn DirectiveHandler>) {
        self.overrides.retain(|h| h.name() != handler.name());
        self.overrides.push(handler);
    }

    /// Whether a handler (override or built-in) exists for `directive`.
    #[must_use]
    pub fn is_registered(&self, directive: &str) -> bool {
        self.overrides.iter().any(|h| h.name() == directive)
            || DirectiveKind::from_type(directive) != DirectiveKind::Unregistered
    }

    /// Run the handler for `block`.
    ///
    /// # Errors
    ///
    /// Propagates the handler's error.
    pub fn dispatch(
        &mut self,
        block: &Block<'_>,
        ctx: &HandlerContext<'_>,
    ) -> Result<HandlerOutput, PreprocessError> {
        if let Some(handler) = self
            .overrides
            .iter_mut()
            .find(|h| h.name() == block.directive)
        {
            return handler.handle(block, ctx);
        }

        match DirectiveKind::from_type(block.directive) {
            DirectiveKind::LoaderBundle => self.loader_bundle.handle(block, ctx),
            DirectiveKind::ScriptGroup => self.script_group.handle(block, ctx),
            DirectiveKind::Unregistered => {
                tracing::warn!(
                    directive = block.directive,
                    line = ctx.line,
                    "Unregistered directive type, block removed"
                );
                self.warnings.push(format!(
                    "line {}: unregistered directive type {:?}, block removed",
                    ctx.line, block.directive
                ));
                Ok(HandlerOutput::empty())
            }
        }
    }

    /// Warnings raised since the last [`take_warnings`](Self::take_warnings).
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Drop collected warnings.
    pub fn clear_warnings(&mut self) {
        self.warnings.clear();
    }

    /// Drain collected warnings.
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }
}

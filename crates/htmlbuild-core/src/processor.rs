//! Document preprocessor.
//!
//! Ties the scanner, router, accumulator and assembler together for one file.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::assemble::Assembler;
use crate::context::HandlerContext;
use crate::error::PreprocessError;
use crate::handler::DirectiveHandler;
use crate::plan::{Accumulator, BuildPlan, BundleOverrides};
use crate::router::Router;
use crate::scanner::Scanner;

/// Default directive tag name.
pub const DEFAULT_TAG_NAME: &str = "htmlbuild";

/// Default build target.
pub const DEFAULT_TARGET: &str = "htmlbuild";

/// Configuration for the preprocessor.
#[derive(Debug, Clone)]
pub struct PreprocessorConfig {
    /// Directive tag name: `<!-- {tag_name}:type -->`.
    pub tag_name: String,
    /// Base directory joined with destination paths.
    pub base_dir: PathBuf,
    /// Default build target.
    pub target: String,
    /// Per-target bundle option fields that win over derived values.
    pub bundle_overrides: HashMap<String, BundleOverrides>,
}

impl Default for PreprocessorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PreprocessorConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tag_name: DEFAULT_TAG_NAME.to_owned(),
            base_dir: PathBuf::new(),
            target: DEFAULT_TARGET.to_owned(),
            bundle_overrides: HashMap::new(),
        }
    }

    /// Set the directive tag name.
    #[must_use]
    pub fn with_tag_name(mut self, tag_name: impl Into<String>) -> Self {
        self.tag_name = tag_name.into();
        self
    }

    /// Set the base directory for destination paths.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Set the default build target.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Set bundle option overrides for a target.
    #[must_use]
    pub fn with_bundle_overrides(
        mut self,
        target: impl Into<String>,
        overrides: BundleOverrides,
    ) -> Self {
        self.bundle_overrides.insert(target.into(), overrides);
        self
    }
}

/// Rewrites directive blocks and accumulates the build plan.
///
/// # Example
///
/// ```
/// use htmlbuild_core::{BuildPlan, Preprocessor, PreprocessorConfig};
///
/// let config = PreprocessorConfig::new().with_tag_name("build").with_base_dir("dist");
/// let mut processor = Preprocessor::new(config).unwrap();
/// let mut plan = BuildPlan::new();
///
/// let html = r#"<!-- build:script-group app.js -->
/// <script src="a.js"></script>
/// <script src="b.js"></script>
/// <!-- endbuild -->"#;
///
/// let output = processor.process(html, &mut plan).unwrap();
/// assert_eq!(output, r#"<script src="app.js"></script>"#);
/// assert_eq!(
///     plan.concat_sources("htmlbuild", "dist/app.js").unwrap(),
///     ["a.js", "b.js"]
/// );
/// ```
pub struct Preprocessor {
    config: PreprocessorConfig,
    scanner: Scanner,
    router: Router,
    warnings: Vec<String>,
}

impl Preprocessor {
    /// Create a preprocessor with the built-in handlers.
    ///
    /// # Errors
    ///
    /// Returns [`PreprocessError::InvalidTagName`] if the tag name is unusable.
    pub fn new(config: PreprocessorConfig) -> Result<Self, PreprocessError> {
        let scanner = Scanner::new(&config.tag_name)?;
        Ok(Self {
            config,
            scanner,
            router: Router::new(),
            warnings: Vec::new(),
        })
    }

    /// Register a handler that overrides the built-in one of the same name.
    #[must_use]
    pub fn with_handler<H: DirectiveHandler + 'static>(mut self, handler: H) -> Self {
        self.router.register(Box::new(handler));
        self
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &PreprocessorConfig {
        &self.config
    }

    /// Scanner in use.
    #[must_use]
    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    /// Rewrite `input` and record its build actions in `plan`.
    ///
    /// Plan changes are committed only if every block succeeds; on error
    /// `plan` is left as it was and no output is produced.
    ///
    /// # Errors
    ///
    /// Returns the first fatal handler or accumulator error.
    pub fn process(&mut self, input: &str, plan: &mut BuildPlan) -> Result<String, PreprocessError> {
        self.warnings.clear();
        // Discard anything left over from a failed run.
        self.router.clear_warnings();

        let mut staged = plan.clone();
        let mut accumulator = Accumulator::new(&mut staged, &self.config.bundle_overrides);
        let mut assembler = Assembler::new(input);

        for block in self.scanner.blocks(input) {
            let line = block.line_in(input);
            tracing::info!(
                directive = block.directive,
                args = block.args.unwrap_or_default(),
                line,
                "Block found"
            );
            accumulator.begin_block();

            let ctx = HandlerContext {
                base_dir: &self.config.base_dir,
                target: &self.config.target,
                line,
            };
            let output = self.router.dispatch(&block, &ctx)?;
            accumulator.apply_all(output.actions)?;

            for (kind, target, dest) in accumulator.touched() {
                tracing::debug!(?kind, build_target = target, dest, "Block touched destination");
            }
            assembler.push_block(&block, &output.replacement);
        }

        self.warnings.extend(self.router.take_warnings());
        for marker in self.scanner.unclosed(input) {
            tracing::warn!(
                directive = %marker.directive,
                line = marker.line,
                "Directive start marker has no end marker"
            );
            self.warnings.push(format!(
                "line {}: {}:{} has no matching end{} marker, left unchanged",
                marker.line,
                self.scanner.tag_name(),
                marker.directive,
                self.scanner.tag_name()
            ));
        }

        let output = assembler.finish();
        *plan = staged;
        tracing::debug!("Run complete");
        Ok(output)
    }

    /// Warnings from the last [`process`](Self::process) call.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

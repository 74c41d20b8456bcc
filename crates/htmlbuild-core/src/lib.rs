//! Build-time HTML preprocessing for script bundling.
//!
//! Scans HTML for comment-delimited directive blocks, replaces each block with
//! the markup its handler produces, and accumulates the asset-bundling
//! configuration (concatenation, minification and module-bundle settings)
//! that the rewritten page now depends on.
//!
//! # Architecture
//!
//! ```text
//! text ─▶ Scanner ─▶ Block ─▶ Router ─▶ DirectiveHandler ─┬─▶ Replacement ─▶ Assembler ─▶ text
//!                                                         └─▶ BuildAction ─▶ Accumulator ─▶ BuildPlan
//! ```
//!
//! Handlers return data; nothing is registered globally. The [`BuildPlan`] is
//! passed by reference into every [`Preprocessor::process`] call and stays
//! cumulative over a whole batch of files.
//!
//! # Directive Syntax
//!
//! ```html
//! <!-- htmlbuild:script-group js/app.js -->
//! <script src="js/a.js"></script>
//! <script src="js/b.js"></script>
//! <!-- endhtmlbuild -->
//! ```
//!
//! # Built-in Directives
//!
//! - `script-loader-bundle <entry> [<dest> [<target>]]` (alias `requirejs`)
//! - `script-group [<dest>]` (alias `js`)

mod action;
mod assemble;
mod context;
mod error;
mod handler;
mod output;
mod plan;
mod processor;
mod router;
mod scanner;
mod tags;

pub use action::BuildAction;
pub use assemble::Assembler;
pub use context::{HandlerContext, split_args};
pub use error::PreprocessError;
pub use handler::{
    DirectiveHandler, DirectiveKind, LoaderBundleHandler, ScriptGroupHandler, is_absolute_src,
};
pub use output::{HandlerOutput, Replacement, script_tag};
pub use plan::{Accumulator, BuildPlan, BundleOptions, BundleOverrides, DestinationMap, SourceKind};
pub use processor::{DEFAULT_TAG_NAME, DEFAULT_TARGET, Preprocessor, PreprocessorConfig};
pub use router::Router;
pub use scanner::{Block, Blocks, Scanner, UnclosedMarker};
pub use tags::{Tag, extract_tags};

//! Output assembly.
//!
//! Rebuilds a document from the untouched text between blocks and each
//! block's replacement.

use crate::output::Replacement;
use crate::scanner::Block;

/// Incremental document builder.
///
/// Blocks must be pushed in document order.
///
/// # Example
///
/// ```
/// use htmlbuild_core::{Assembler, Replacement, Scanner};
///
/// let html = "<head>\n  <!-- build:x -->old<!-- endbuild -->\n</head>";
/// let scanner = Scanner::new("build").unwrap();
///
/// let mut assembler = Assembler::new(html);
/// for block in scanner.blocks(html) {
///     assembler.push_block(&block, &Replacement::text("new"));
/// }
///
/// assert_eq!(assembler.finish(), "<head>\n  new\n</head>");
/// ```
pub struct Assembler<'t> {
    source: &'t str,
    output: String,
    cursor: usize,
}

impl<'t> Assembler<'t> {
    /// Start assembling output for `source`.
    #[must_use]
    pub fn new(source: &'t str) -> Self {
        Self {
            source,
            output: String::with_capacity(source.len()),
            cursor: 0,
        }
    }

    /// Append the text before `block`, its indentation, and its replacement.
    pub fn push_block(&mut self, block: &Block<'_>, replacement: &Replacement) {
        let start = block.start.max(self.cursor);
        self.output.push_str(&self.source[self.cursor..start]);
        self.output.push_str(block.indent);
        self.output.push_str(&replacement.render(block.indent));
        self.cursor = block.end.max(self.cursor);
    }

    /// Append the remaining text and return the document.
    #[must_use]
    pub fn finish(mut self) -> String {
        self.output.push_str(&self.source[self.cursor..]);
        self.output
    }
}

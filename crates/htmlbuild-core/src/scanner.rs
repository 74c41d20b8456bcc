//! Directive block scanning.
//!
//! Finds `<!-- TAG:type args -->contents<!-- endTAG -->` blocks in raw text.
//! Blocks never nest: the first end marker for the tag name closes the block.

use regex::{CaptureMatches, Regex};

use crate::error::PreprocessError;

/// Directive type token: no whitespace, hyphens only between other characters
/// so that a trailing `-->` still closes the marker.
const TYPE_PATTERN: &str = r"[^\s\-]+(?:-[^\s\-]+)*";

/// Directive arguments: the rest of the line, never running past `-->`.
const ARGS_PATTERN: &str = r"(?:[^\n\-]|-[^\n\-]|--[^\n>])+?";

/// A directive block found in the source text.
///
/// All string fields borrow from the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<'t> {
    /// Directive type token (e.g. `script-group`).
    pub directive: &'t str,
    /// Everything after the type up to the marker's closing delimiter.
    pub args: Option<&'t str>,
    /// Line-leading whitespace immediately before the start marker.
    pub indent: &'t str,
    /// Markup between the start and end markers.
    pub contents: &'t str,
    /// Byte offset of the block start (including indentation).
    pub start: usize,
    /// Byte offset just past the end marker.
    pub end: usize,
}

impl Block<'_> {
    /// 1-indexed line number of the block start within `text`.
    #[must_use]
    pub fn line_in(&self, text: &str) -> usize {
        line_at(text, self.start)
    }
}

/// A start marker that has no matching end marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnclosedMarker {
    /// Directive type of the dangling marker.
    pub directive: String,
    /// Byte offset of the marker.
    pub offset: usize,
    /// 1-indexed line of the marker.
    pub line: usize,
}

/// Scanner for directive blocks with a configurable tag name.
///
/// # Example
///
/// ```
/// use htmlbuild_core::Scanner;
///
/// let scanner = Scanner::new("build").unwrap();
/// let html = "<!-- build:script-group app.js --><script src=\"a.js\"></script><!-- endbuild -->";
/// let blocks: Vec<_> = scanner.blocks(html).collect();
///
/// assert_eq!(blocks.len(), 1);
/// assert_eq!(blocks[0].directive, "script-group");
/// assert_eq!(blocks[0].args, Some("app.js"));
/// ```
#[derive(Debug, Clone)]
pub struct Scanner {
    tag_name: String,
    block_re: Regex,
    start_re: Regex,
}

impl Scanner {
    /// Create a scanner for `<!-- {tag_name}:... -->` markers.
    ///
    /// # Errors
    ///
    /// Returns [`PreprocessError::InvalidTagName`] if the tag name is empty or
    /// contains whitespace.
    pub fn new(tag_name: &str) -> Result<Self, PreprocessError> {
        if tag_name.is_empty() || tag_name.chars().any(char::is_whitespace) {
            return Err(PreprocessError::InvalidTagName(tag_name.to_owned()));
        }

        let tag = regex::escape(tag_name);
        let start =
            format!(r"<!--[ \t]*{tag}:({TYPE_PATTERN})(?:[ \t]+({ARGS_PATTERN}))?[ \t]*-->");
        let block_re = Regex::new(&format!(
            r"(?m)(^[ \t]+)?{start}(?s:(.*?))<!--[ \t]*end{tag}[ \t]*-->"
        ))
        .map_err(|_| PreprocessError::InvalidTagName(tag_name.to_owned()))?;
        let start_re =
            Regex::new(&start).map_err(|_| PreprocessError::InvalidTagName(tag_name.to_owned()))?;

        Ok(Self {
            tag_name: tag_name.to_owned(),
            block_re,
            start_re,
        })
    }

    /// Directive tag name this scanner matches.
    #[must_use]
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// Lazily iterate the blocks of `text` in document order.
    ///
    /// Calling this again restarts the scan from the beginning.
    #[must_use]
    pub fn blocks<'r, 't>(&'r self, text: &'t str) -> Blocks<'r, 't> {
        Blocks {
            inner: self.block_re.captures_iter(text),
        }
    }

    /// Find start markers outside of any block.
    ///
    /// These markers have no end marker and are left in the output untouched.
    #[must_use]
    pub fn unclosed(&self, text: &str) -> Vec<UnclosedMarker> {
        let mut gaps = Vec::new();
        let mut last = 0;
        for block in self.blocks(text) {
            gaps.push((last, block.start));
            last = block.end;
        }
        gaps.push((last, text.len()));

        let mut markers = Vec::new();
        for (from, to) in gaps {
            for caps in self.start_re.captures_iter(&text[from..to]) {
                let (Some(whole), Some(directive)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let offset = from + whole.start();
                markers.push(UnclosedMarker {
                    directive: directive.as_str().to_owned(),
                    offset,
                    line: line_at(text, offset),
                });
            }
        }

        markers
    }
}

/// Iterator over the directive blocks of a text.
pub struct Blocks<'r, 't> {
    inner: CaptureMatches<'r, 't>,
}

impl<'t> Iterator for Blocks<'_, 't> {
    type Item = Block<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let caps = self.inner.next()?;
        let whole = caps.get(0)?;

        Some(Block {
            directive: caps.get(2).map_or("", |m| m.as_str()),
            args: caps.get(3).map(|m| m.as_str()),
            indent: caps.get(1).map_or("", |m| m.as_str()),
            contents: caps.get(4).map_or("", |m| m.as_str()),
            start: whole.start(),
            end: whole.end(),
        })
    }
}

/// 1-indexed line number of a byte offset.
fn line_at(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

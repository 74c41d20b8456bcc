//! Handler context.

use std::path::Path;

/// Run settings and source location passed to directive handlers.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use htmlbuild_core::HandlerContext;
///
/// let ctx = HandlerContext {
///     base_dir: Path::new("dist"),
///     target: "release",
///     line: 12,
/// };
///
/// assert_eq!(ctx.resolve_dest("app.js"), "dist/app.js");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext<'a> {
    /// Base directory joined with destination paths.
    pub base_dir: &'a Path,
    /// Default build target for the run.
    pub target: &'a str,
    /// Line where the block starts (1-indexed).
    pub line: usize,
}

impl HandlerContext<'_> {
    /// Resolve a destination path against the base directory.
    ///
    /// Segments are joined with `/` and normalized lexically: `.` is dropped
    /// and `..` removes the preceding segment. A leading `/` on `dest` does not
    /// escape the base directory.
    #[must_use]
    pub fn resolve_dest(&self, dest: &str) -> String {
        let base = self.base_dir.to_string_lossy();
        let rooted = base.starts_with('/');

        let mut segments: Vec<&str> = Vec::new();
        for segment in base.split('/').chain(dest.split('/')) {
            match segment {
                "" | "." => {}
                ".." => match segments.last() {
                    Some(&last) if last != ".." => {
                        segments.pop();
                    }
                    _ if rooted => {}
                    _ => segments.push(".."),
                },
                _ => segments.push(segment),
            }
        }

        let joined = segments.join("/");
        if rooted {
            format!("/{joined}")
        } else if joined.is_empty() {
            ".".to_owned()
        } else {
            joined
        }
    }
}

/// Split a directive argument string on whitespace.
///
/// A missing argument string yields no arguments.
#[must_use]
pub fn split_args(args: Option<&str>) -> Vec<&str> {
    args.map(|a| a.split_whitespace().collect())
        .unwrap_or_default()
}

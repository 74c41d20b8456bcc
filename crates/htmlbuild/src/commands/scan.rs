//! `htmlbuild scan` command implementation.

use std::path::PathBuf;

use clap::Args;
use htmlbuild_core::{DEFAULT_TAG_NAME, Router, Scanner};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the scan command.
#[derive(Args)]
pub(crate) struct ScanArgs {
    /// HTML file to scan.
    file: PathBuf,

    /// Directive tag name.
    #[arg(long, env = "HTMLBUILD_TAG_NAME", default_value = DEFAULT_TAG_NAME)]
    tag_name: String,
}

impl ScanArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let text = std::fs::read_to_string(&self.file)?;
        let scanner = Scanner::new(&self.tag_name)?;
        let router = Router::new();

        output.highlight(&self.file.display().to_string());

        let mut count = 0;
        for block in scanner.blocks(&text) {
            count += 1;
            let status = if router.is_registered(block.directive) {
                ""
            } else {
                " (unregistered)"
            };
            output.info(&format!(
                "line {}: {}{status}",
                block.line_in(&text),
                block.directive
            ));
            output.detail(&format!("args: {}", block.args.unwrap_or("-")));
            output.detail(&format!("indent: {:?}", block.indent));
        }

        for marker in scanner.unclosed(&text) {
            output.warning(&format!(
                "line {}: {} has no matching end{} marker",
                marker.line, marker.directive, self.tag_name
            ));
        }

        output.success(&format!("{count} blocks found"));
        Ok(())
    }
}

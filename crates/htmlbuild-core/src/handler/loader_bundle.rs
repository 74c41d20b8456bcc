//! Module-bundle directive: `script-loader-bundle`.
//!
//! ```html
//! <!-- htmlbuild:script-loader-bundle app/main dist/app.js release -->
//! <script src="vendor/require.js"></script>
//! <!-- endhtmlbuild -->
//! ```

use super::{DirectiveHandler, DirectiveKind, is_absolute_src, push_bundle, require_src};
use crate::action::BuildAction;
use crate::context::{HandlerContext, split_args};
use crate::error::PreprocessError;
use crate::output::{HandlerOutput, Replacement};
use crate::scanner::Block;
use crate::tags::extract_tags;

const USAGE: &str = "<entry-module> [<dest> [<target>]]";

/// Concatenates the block's scripts into one destination and bundles the
/// entry module's tree into it.
#[derive(Debug, Default)]
pub struct LoaderBundleHandler;

impl DirectiveHandler for LoaderBundleHandler {
    fn name(&self) -> &str {
        DirectiveKind::LOADER_BUNDLE
    }

    fn handle(
        &mut self,
        block: &Block<'_>,
        ctx: &HandlerContext<'_>,
    ) -> Result<HandlerOutput, PreprocessError> {
        let args = split_args(block.args);
        let Some((&entry, rest)) = args.split_first() else {
            return Err(PreprocessError::MissingArgument {
                directive: block.directive.to_owned(),
                usage: USAGE,
            });
        };

        let mut actions = vec![BuildAction::verbose(format!("Set main to {entry}"))];

        let dest = match rest.first() {
            Some(dest) => (*dest).to_owned(),
            None => format!("{entry}.js"),
        };
        let full = ctx.resolve_dest(&dest);
        if rest.first().is_some() {
            actions.push(BuildAction::verbose(format!("Set destination to {full}")));
        }

        let target = match rest.get(1) {
            Some(target) => {
                actions.push(BuildAction::verbose(format!("Set target to {target}")));
                *target
            }
            None => ctx.target,
        };

        let mut has_source = false;
        for tag in extract_tags("script", block.contents) {
            actions.push(BuildAction::verbose(format!("Parsing tag: {}", tag.html)));

            let src = require_src(&tag)?;
            if is_absolute_src(src) {
                actions.push(BuildAction::notice(format!(
                    "Skipping root or absolute URL: {}",
                    tag.html
                )));
                continue;
            }

            has_source = true;
            actions.push(BuildAction::concat(target, &full, src));
        }

        if !has_source {
            return Ok(HandlerOutput::new(Replacement::empty(), actions));
        }

        let tag = push_bundle(ctx, entry, &dest, target, target, &mut actions);
        Ok(HandlerOutput::new(Replacement::lines(vec![tag]), actions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::BundleOptions;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn ctx(base_dir: &str) -> HandlerContext<'_> {
        HandlerContext {
            base_dir: Path::new(base_dir),
            target: "default",
            line: 1,
        }
    }

    fn block<'t>(args: Option<&'t str>, contents: &'t str) -> Block<'t> {
        Block {
            directive: "script-loader-bundle",
            args,
            indent: "",
            contents,
            start: 0,
            end: 0,
        }
    }

    fn mutations(output: &HandlerOutput) -> Vec<BuildAction> {
        output
            .actions
            .iter()
            .filter(|a| a.is_mutation())
            .cloned()
            .collect()
    }

    #[test]
    fn test_missing_arguments() {
        let err = LoaderBundleHandler
            .handle(&block(None, r#"<script src="a.js"></script>"#), &ctx(""))
            .unwrap_err();

        assert!(matches!(err, PreprocessError::MissingArgument { .. }));
    }

    #[test]
    fn test_entry_only_defaults() {
        let output = LoaderBundleHandler
            .handle(
                &block(Some("main"), r#"<script src="require.js"></script>"#),
                &ctx(""),
            )
            .unwrap();

        assert_eq!(
            output.replacement,
            Replacement::lines(vec![r#"<script src="main.js"></script>"#.to_owned()])
        );
        assert_eq!(
            mutations(&output),
            vec![
                BuildAction::concat("default", "main.js", "require.js"),
                BuildAction::bundle(
                    "default",
                    BundleOptions {
                        base_directory: ".".to_owned(),
                        module_name: "main".to_owned(),
                        output_path: "main.js".to_owned(),
                        main_config_file: "main.js".to_owned(),
                        ..BundleOptions::default()
                    }
                ),
                BuildAction::minify("default", "main.js", "main.js"),
            ]
        );
    }

    #[test]
    fn test_dest_and_target_args() {
        let output = LoaderBundleHandler
            .handle(
                &block(
                    Some("app/main js/app.js release"),
                    r#"<script src="lib/require.js"></script>"#,
                ),
                &ctx("dist"),
            )
            .unwrap();

        assert_eq!(
            output.replacement,
            Replacement::lines(vec![r#"<script src="js/app.js"></script>"#.to_owned()])
        );
        assert_eq!(
            mutations(&output),
            vec![
                BuildAction::concat("release", "dist/js/app.js", "lib/require.js"),
                BuildAction::bundle(
                    "release",
                    BundleOptions::for_entry("app/main", "dist/js/app.js")
                ),
                BuildAction::minify("release", "dist/js/app.js", "dist/js/app.js"),
            ]
        );
    }

    #[test]
    fn test_absolute_sources_skipped() {
        let contents = r#"
            <script src="http://x/y.js"></script>
            <script src="/abs.js"></script>
            <script src="local.js"></script>
        "#;
        let output = LoaderBundleHandler
            .handle(&block(Some("main"), contents), &ctx(""))
            .unwrap();

        let concat: Vec<_> = mutations(&output)
            .into_iter()
            .filter(|a| matches!(a, BuildAction::AddConcatSource { .. }))
            .collect();
        assert_eq!(concat, vec![BuildAction::concat("default", "main.js", "local.js")]);

        let skipped = output
            .actions
            .iter()
            .filter(|a| {
                matches!(a, BuildAction::Notice { message, verbose: false }
                    if message.starts_with("Skipping root or absolute URL"))
            })
            .count();
        assert_eq!(skipped, 2);
    }

    #[test]
    fn test_only_absolute_sources_is_empty() {
        let output = LoaderBundleHandler
            .handle(
                &block(Some("main"), r#"<script src="https://cdn/x.js"></script>"#),
                &ctx(""),
            )
            .unwrap();

        assert!(output.replacement.is_empty());
        assert!(mutations(&output).is_empty());
    }

    #[test]
    fn test_no_scripts_is_empty() {
        let output = LoaderBundleHandler
            .handle(&block(Some("main"), "<p>nothing</p>"), &ctx(""))
            .unwrap();

        assert!(output.replacement.is_empty());
        assert!(mutations(&output).is_empty());
    }

    #[test]
    fn test_missing_src_is_fatal() {
        let err = LoaderBundleHandler
            .handle(
                &block(Some("main"), r#"<script type="text/javascript"></script>"#),
                &ctx(""),
            )
            .unwrap_err();

        assert_eq!(
            err,
            PreprocessError::MissingAttribute {
                attribute: "src",
                tag: r#"<script type="text/javascript">"#.to_owned(),
            }
        );
    }
}

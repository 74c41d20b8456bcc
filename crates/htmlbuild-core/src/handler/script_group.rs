//! Script-grouping directive: `script-group`.
//!
//! ```html
//! <!-- htmlbuild:script-group js/app.js -->
//! <script src="js/a.js"></script>
//! <script src="js/b.js"></script>
//! <script src="js/require.js" data-main="js/main" data-dest="js/main.min.js"></script>
//! <!-- endhtmlbuild -->
//! ```
//!
//! Relative scripts are concatenated into the destination given as argument.
//! Any tag with `data-main` additionally becomes its own module bundle; its
//! minification request stays under the run's default target.

use super::{DirectiveHandler, DirectiveKind, is_absolute_src, push_bundle, require_src};
use crate::action::BuildAction;
use crate::context::{HandlerContext, split_args};
use crate::error::PreprocessError;
use crate::output::{HandlerOutput, Replacement, script_tag};
use crate::scanner::Block;
use crate::tags::extract_tags;

/// Groups the block's relative scripts into one destination.
#[derive(Debug, Default)]
pub struct ScriptGroupHandler;

impl DirectiveHandler for ScriptGroupHandler {
    fn name(&self) -> &str {
        DirectiveKind::SCRIPT_GROUP
    }

    fn handle(
        &mut self,
        block: &Block<'_>,
        ctx: &HandlerContext<'_>,
    ) -> Result<HandlerOutput, PreprocessError> {
        let mut actions = Vec::new();
        let mut lines = Vec::new();

        let dest = split_args(block.args).first().map(|short| {
            let full = ctx.resolve_dest(short);
            actions.push(BuildAction::verbose(format!("Set destination to {full}")));
            ((*short).to_owned(), full)
        });

        let mut grouped = false;
        for tag in extract_tags("script", block.contents) {
            actions.push(BuildAction::verbose(format!("Parsing tag: {}", tag.html)));

            if let Some((short, full)) = &dest {
                let src = require_src(&tag)?;

                if is_absolute_src(src) {
                    actions.push(BuildAction::notice(format!(
                        "Skipping root or absolute URL: {}",
                        tag.html
                    )));
                } else {
                    if !grouped {
                        grouped = true;
                        let group_tag = script_tag(short);
                        actions.push(BuildAction::verbose(format!("Added tag: {group_tag}")));
                        actions.push(BuildAction::minify(ctx.target, full, full));
                        lines.push(group_tag);
                    }
                    actions.push(BuildAction::concat(ctx.target, full, src));
                }
            }

            if let Some(main) = tag.get("data-main") {
                let bundle_dest = tag.get("data-dest").unwrap_or(main);
                let bundle_target = tag.get("data-target").unwrap_or(ctx.target);
                lines.push(push_bundle(
                    ctx,
                    main,
                    bundle_dest,
                    bundle_target,
                    ctx.target,
                    &mut actions,
                ));
            }
        }

        Ok(HandlerOutput::new(Replacement::lines(lines), actions))
    }
}

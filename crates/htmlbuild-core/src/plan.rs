//! Build plan and its accumulator.
//!
//! The [`BuildPlan`] is the cumulative output of a whole batch: concatenation
//! and minification source lists per (target, destination), plus at most one
//! set of module-bundle options per target. It serializes to JSON so the
//! driver can persist it and hand it to the real tools:
//!
//! ```json
//! {
//!     "concat": {"release": {"dist/app.js": ["a.js", "b.js"]}},
//!     "minify": {"release": {"dist/app.js": ["dist/app.js"]}},
//!     "bundle": {"release": {"baseUrl": "app", "name": "main", "out": "dist/main.js", "mainConfigFile": "app/main.js"}}
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::action::BuildAction;
use crate::error::PreprocessError;

/// Destination path → ordered source paths.
pub type DestinationMap = BTreeMap<String, Vec<String>>;

/// Module-bundle options for one target.
///
/// Field names serialize as the module loader's optimizer options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BundleOptions {
    /// Directory the module tree is resolved from.
    #[serde(rename = "baseUrl")]
    pub base_directory: String,
    /// Entry module name.
    #[serde(rename = "name")]
    pub module_name: String,
    /// Output file of the bundle.
    #[serde(rename = "out")]
    pub output_path: String,
    /// Module loader configuration file.
    #[serde(rename = "mainConfigFile")]
    pub main_config_file: String,
    /// Additional optimizer options passed through unchanged.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl BundleOptions {
    /// Derive options for an entry module such as `app/main`.
    ///
    /// # Example
    ///
    /// ```
    /// use htmlbuild_core::BundleOptions;
    ///
    /// let options = BundleOptions::for_entry("app/main", "dist/main.js");
    /// assert_eq!(options.base_directory, "app");
    /// assert_eq!(options.module_name, "main");
    /// assert_eq!(options.main_config_file, "app/main.js");
    /// ```
    #[must_use]
    pub fn for_entry(entry: &str, output_path: impl Into<String>) -> Self {
        let path = Path::new(entry);
        let base_directory = match path.parent().map(|p| p.to_string_lossy()) {
            Some(parent) if !parent.is_empty() => parent.into_owned(),
            _ => ".".to_owned(),
        };
        let module_name = path
            .file_name()
            .map_or_else(|| entry.to_owned(), |name| name.to_string_lossy().into_owned());

        Self {
            base_directory,
            module_name,
            output_path: output_path.into(),
            main_config_file: format!("{entry}.js"),
            extra: BTreeMap::new(),
        }
    }

    /// Apply caller-specified fields on top of these options.
    #[must_use]
    pub fn merged(mut self, overrides: &BundleOverrides) -> Self {
        if let Some(value) = &overrides.base_directory {
            self.base_directory.clone_from(value);
        }
        if let Some(value) = &overrides.module_name {
            self.module_name.clone_from(value);
        }
        if let Some(value) = &overrides.output_path {
            self.output_path.clone_from(value);
        }
        if let Some(value) = &overrides.main_config_file {
            self.main_config_file.clone_from(value);
        }
        self.extra
            .extend(overrides.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }
}

/// Caller-specified bundle option fields for one target.
///
/// Every set field wins over the value the handler derived.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BundleOverrides {
    #[serde(rename = "baseUrl", default)]
    pub base_directory: Option<String>,
    #[serde(rename = "name", default)]
    pub module_name: Option<String>,
    #[serde(rename = "out", default)]
    pub output_path: Option<String>,
    #[serde(rename = "mainConfigFile", default)]
    pub main_config_file: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Cumulative bundling configuration keyed by target name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildPlan {
    /// Concatenation sources: target → destination → sources.
    #[serde(default)]
    pub concat: BTreeMap<String, DestinationMap>,
    /// Minification sources: target → destination → sources.
    #[serde(default)]
    pub minify: BTreeMap<String, DestinationMap>,
    /// Module-bundle options: target → options.
    #[serde(default)]
    pub bundle: BTreeMap<String, BundleOptions>,
}

impl BuildPlan {
    /// Create an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the plan holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.concat.is_empty() && self.minify.is_empty() && self.bundle.is_empty()
    }

    /// Concatenation sources for (`target`, `dest`).
    #[must_use]
    pub fn concat_sources(&self, target: &str, dest: &str) -> Option<&[String]> {
        self.concat
            .get(target)
            .and_then(|dests| dests.get(dest))
            .map(Vec::as_slice)
    }

    /// Minification sources for (`target`, `dest`).
    #[must_use]
    pub fn minify_sources(&self, target: &str, dest: &str) -> Option<&[String]> {
        self.minify
            .get(target)
            .and_then(|dests| dests.get(dest))
            .map(Vec::as_slice)
    }

    /// Bundle options for `target`.
    #[must_use]
    pub fn bundle_options(&self, target: &str) -> Option<&BundleOptions> {
        self.bundle.get(target)
    }

    /// All target names present in any section.
    #[must_use]
    pub fn targets(&self) -> BTreeSet<&str> {
        self.concat
            .keys()
            .chain(self.minify.keys())
            .chain(self.bundle.keys())
            .map(String::as_str)
            .collect()
    }
}

/// Source list kind tracked per block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SourceKind {
    Concat,
    Minify,
}

impl SourceKind {
    fn label(self) -> &'static str {
        match self {
            Self::Concat => "concat",
            Self::Minify => "minify",
        }
    }
}

/// Applies handler actions to a [`BuildPlan`].
///
/// Tracks which destinations the current block touched; call
/// [`begin_block`](Self::begin_block) before each block.
pub struct Accumulator<'a> {
    plan: &'a mut BuildPlan,
    overrides: &'a HashMap<String, BundleOverrides>,
    touched: BTreeSet<(SourceKind, String, String)>,
}

impl<'a> Accumulator<'a> {
    /// Create an accumulator over `plan` with per-target bundle overrides.
    pub fn new(plan: &'a mut BuildPlan, overrides: &'a HashMap<String, BundleOverrides>) -> Self {
        Self {
            plan,
            overrides,
            touched: BTreeSet::new(),
        }
    }

    /// Reset the per-block destination bookkeeping.
    pub fn begin_block(&mut self) {
        self.touched.clear();
    }

    /// Destinations touched since the last [`begin_block`](Self::begin_block).
    pub fn touched(&self) -> impl Iterator<Item = (SourceKind, &str, &str)> {
        self.touched
            .iter()
            .map(|(kind, target, dest)| (*kind, target.as_str(), dest.as_str()))
    }

    /// Apply actions in order, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns [`PreprocessError::DuplicateTarget`] when bundle options are set
    /// twice for one target.
    pub fn apply_all(&mut self, actions: Vec<BuildAction>) -> Result<(), PreprocessError> {
        for action in actions {
            self.apply(action)?;
        }
        Ok(())
    }

    /// Apply one action.
    ///
    /// # Errors
    ///
    /// Returns [`PreprocessError::DuplicateTarget`] when bundle options are set
    /// twice for one target.
    pub fn apply(&mut self, action: BuildAction) -> Result<(), PreprocessError> {
        match action {
            BuildAction::AddConcatSource { target, dest, src } => {
                self.add_source(SourceKind::Concat, target, dest, src);
            }
            BuildAction::AddMinifySource { target, dest, src } => {
                self.add_source(SourceKind::Minify, target, dest, src);
            }
            BuildAction::SetBundleOptions { target, options } => {
                self.set_bundle(target, options)?;
            }
            BuildAction::Notice { message, verbose } => {
                if verbose {
                    tracing::debug!("{message}");
                } else {
                    tracing::info!("{message}");
                }
            }
        }
        Ok(())
    }

    fn add_source(&mut self, kind: SourceKind, target: String, dest: String, src: String) {
        tracing::info!(
            build_target = %target,
            src = %src,
            dest = %dest,
            "Added {}",
            kind.label()
        );

        let section = match kind {
            SourceKind::Concat => &mut self.plan.concat,
            SourceKind::Minify => &mut self.plan.minify,
        };
        section
            .entry(target.clone())
            .or_default()
            .entry(dest.clone())
            .or_default()
            .push(src);

        if self.touched.insert((kind, target, dest)) {
            tracing::debug!(kind = kind.label(), "New destination for block");
        }
    }

    fn set_bundle(&mut self, target: String, options: BundleOptions) -> Result<(), PreprocessError> {
        if self.plan.bundle.contains_key(&target) {
            return Err(PreprocessError::DuplicateTarget { target });
        }

        let options = match self.overrides.get(&target) {
            Some(overrides) => options.merged(overrides),
            None => options,
        };

        tracing::info!(
            build_target = %target,
            src = %options.main_config_file,
            dest = %options.output_path,
            "Added bundle"
        );
        self.plan.bundle.insert(target, options);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn no_overrides() -> HashMap<String, BundleOverrides> {
        HashMap::new()
    }

    #[test]
    fn test_for_entry_bare_module() {
        let options = BundleOptions::for_entry("main", "main.js");

        assert_eq!(options.base_directory, ".");
        assert_eq!(options.module_name, "main");
        assert_eq!(options.output_path, "main.js");
        assert_eq!(options.main_config_file, "main.js");
    }

    #[test]
    fn test_for_entry_nested_module() {
        let options = BundleOptions::for_entry("js/app/main", "dist/app.js");

        assert_eq!(options.base_directory, "js/app");
        assert_eq!(options.module_name, "main");
        assert_eq!(options.main_config_file, "js/app/main.js");
    }

    #[test]
    fn test_concat_appends_in_order() {
        let mut plan = BuildPlan::new();
        let overrides = no_overrides();
        let mut acc = Accumulator::new(&mut plan, &overrides);

        acc.apply(BuildAction::concat("t", "out.js", "a.js")).unwrap();
        acc.apply(BuildAction::concat("t", "out.js", "b.js")).unwrap();
        acc.apply(BuildAction::concat("t", "out.js", "a.js")).unwrap();

        assert_eq!(
            plan.concat_sources("t", "out.js").unwrap(),
            ["a.js", "b.js", "a.js"]
        );
    }

    #[test]
    fn test_cumulative_across_blocks() {
        let mut plan = BuildPlan::new();
        let overrides = no_overrides();
        let mut acc = Accumulator::new(&mut plan, &overrides);

        acc.begin_block();
        acc.apply(BuildAction::concat("t", "out.js", "a.js")).unwrap();
        acc.begin_block();
        assert_eq!(acc.touched().count(), 0);
        acc.apply(BuildAction::concat("t", "out.js", "b.js")).unwrap();
        assert_eq!(acc.touched().count(), 1);

        assert_eq!(plan.concat_sources("t", "out.js").unwrap(), ["a.js", "b.js"]);
    }

    #[test]
    fn test_touched_tracks_kinds_separately() {
        let mut plan = BuildPlan::new();
        let overrides = no_overrides();
        let mut acc = Accumulator::new(&mut plan, &overrides);

        acc.begin_block();
        acc.apply(BuildAction::concat("t", "out.js", "a.js")).unwrap();
        acc.apply(BuildAction::concat("t", "out.js", "b.js")).unwrap();
        acc.apply(BuildAction::minify("t", "out.js", "out.js")).unwrap();

        let touched: Vec<_> = acc.touched().collect();
        assert_eq!(
            touched,
            vec![
                (SourceKind::Concat, "t", "out.js"),
                (SourceKind::Minify, "t", "out.js"),
            ]
        );
    }

    #[test]
    fn test_duplicate_bundle_target() {
        let mut plan = BuildPlan::new();
        let overrides = no_overrides();
        let mut acc = Accumulator::new(&mut plan, &overrides);

        acc.apply(BuildAction::bundle("t", BundleOptions::for_entry("a", "a.js")))
            .unwrap();
        let err = acc
            .apply(BuildAction::bundle("t", BundleOptions::for_entry("b", "b.js")))
            .unwrap_err();

        assert_eq!(
            err,
            PreprocessError::DuplicateTarget {
                target: "t".to_owned()
            }
        );
        assert_eq!(plan.bundle_options("t").unwrap().module_name, "a");
    }

    #[test]
    fn test_bundle_per_target() {
        let mut plan = BuildPlan::new();
        let overrides = no_overrides();
        let mut acc = Accumulator::new(&mut plan, &overrides);

        acc.apply(BuildAction::bundle("a", BundleOptions::for_entry("a", "a.js")))
            .unwrap();
        acc.apply(BuildAction::bundle("b", BundleOptions::for_entry("b", "b.js")))
            .unwrap();

        assert_eq!(plan.bundle.len(), 2);
    }

    #[test]
    fn test_bundle_overrides_win() {
        let mut plan = BuildPlan::new();
        let mut overrides = HashMap::new();
        overrides.insert(
            "release".to_owned(),
            BundleOverrides {
                base_directory: Some("src".to_owned()),
                extra: BTreeMap::from([("optimize".to_owned(), serde_json::json!("none"))]),
                ..BundleOverrides::default()
            },
        );
        let mut acc = Accumulator::new(&mut plan, &overrides);

        acc.apply(BuildAction::bundle(
            "release",
            BundleOptions::for_entry("app/main", "main.js"),
        ))
        .unwrap();

        let options = plan.bundle_options("release").unwrap();
        assert_eq!(options.base_directory, "src");
        assert_eq!(options.module_name, "main");
        assert_eq!(options.extra["optimize"], serde_json::json!("none"));
    }

    #[test]
    fn test_notice_does_not_mutate() {
        let mut plan = BuildPlan::new();
        let overrides = no_overrides();
        let mut acc = Accumulator::new(&mut plan, &overrides);

        acc.apply(BuildAction::notice("hello")).unwrap();
        acc.apply(BuildAction::verbose("details")).unwrap();

        assert!(plan.is_empty());
    }

    #[test]
    fn test_plan_json_shape() {
        let mut plan = BuildPlan::new();
        let overrides = no_overrides();
        let mut acc = Accumulator::new(&mut plan, &overrides);
        acc.apply(BuildAction::concat("t", "out.js", "a.js")).unwrap();
        acc.apply(BuildAction::bundle("t", BundleOptions::for_entry("app/main", "out.js")))
            .unwrap();

        let json = serde_json::to_value(&plan).unwrap();

        assert_eq!(json["concat"]["t"]["out.js"], serde_json::json!(["a.js"]));
        assert_eq!(json["bundle"]["t"]["baseUrl"], "app");
        assert_eq!(json["bundle"]["t"]["name"], "main");
        assert_eq!(json["bundle"]["t"]["out"], "out.js");
        assert_eq!(json["bundle"]["t"]["mainConfigFile"], "app/main.js");

        let restored: BuildPlan = serde_json::from_value(json).unwrap();
        assert_eq!(restored, plan);
    }

    #[test]
    fn test_targets() {
        let mut plan = BuildPlan::new();
        plan.concat.entry("a".to_owned()).or_default();
        plan.bundle
            .insert("b".to_owned(), BundleOptions::for_entry("m", "m.js"));

        assert_eq!(plan.targets().into_iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}

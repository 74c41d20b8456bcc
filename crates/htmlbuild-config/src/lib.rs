//! Configuration management for htmlbuild.
//!
//! Parses `htmlbuild.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Example
//!
//! ```toml
//! [build]
//! tag_name = "htmlbuild"
//! base_dir = "dist"
//! target = "release"
//! plan_path = ".htmlbuild/plan.json"
//!
//! [[files]]
//! src = "app/index.html"
//! dest = "dist/index.html"
//!
//! [targets.release.bundle]
//! optimize = "uglify2"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! String values support `${VAR}` and `${VAR:-default}`.
//!
//! Expanded fields:
//! - `build.tag_name`
//! - `build.base_dir`
//! - `build.target`
//! - `build.plan_path`
//! - `files[].src`, `files[].dest`

mod expand;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use htmlbuild_core::{BundleOverrides, DEFAULT_TAG_NAME, DEFAULT_TARGET, PreprocessorConfig};
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override directive tag name.
    pub tag_name: Option<String>,
    /// Override default build target.
    pub target: Option<String>,
    /// Override base directory for destination paths.
    pub base_dir: Option<PathBuf>,
    /// Override build plan output path.
    pub plan_path: Option<PathBuf>,
    /// Override seeding from an existing plan.
    pub merge_existing: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "htmlbuild.toml";

/// Default plan path relative to the config directory.
const DEFAULT_PLAN_PATH: &str = ".htmlbuild/plan.json";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings as parsed from TOML.
    build: BuildConfigRaw,
    /// Source → destination file mappings as parsed from TOML.
    files: Vec<FileMappingRaw>,
    /// Per-target settings.
    pub targets: HashMap<String, TargetConfig>,

    /// Resolved build settings (set after loading).
    #[serde(skip)]
    pub build_resolved: BuildConfig,
    /// Resolved file mappings (set after loading).
    #[serde(skip)]
    pub files_resolved: Vec<FileMapping>,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw build settings as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct BuildConfigRaw {
    tag_name: Option<String>,
    base_dir: Option<String>,
    target: Option<String>,
    plan_path: Option<String>,
    merge_existing: Option<bool>,
}

/// Resolved build settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Directive tag name.
    pub tag_name: String,
    /// Base directory joined with destination paths in the plan.
    ///
    /// Kept as written: it ends up verbatim in the persisted plan.
    pub base_dir: PathBuf,
    /// Default build target.
    pub target: String,
    /// Where the build plan is persisted.
    pub plan_path: PathBuf,
    /// Seed the plan from `plan_path` before processing.
    pub merge_existing: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            tag_name: DEFAULT_TAG_NAME.to_owned(),
            base_dir: PathBuf::new(),
            target: DEFAULT_TARGET.to_owned(),
            plan_path: PathBuf::from(DEFAULT_PLAN_PATH),
            merge_existing: false,
        }
    }
}

/// Raw file mapping as parsed from TOML.
#[derive(Debug, Deserialize)]
struct FileMappingRaw {
    src: SourceSpec,
    dest: String,
}

/// One source path or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SourceSpec {
    One(String),
    Many(Vec<String>),
}

impl SourceSpec {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(src) => vec![src],
            Self::Many(srcs) => srcs,
        }
    }
}

/// Resolved source → destination mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMapping {
    /// Source files. Processing requires exactly one.
    pub sources: Vec<PathBuf>,
    /// Destination file.
    pub dest: PathBuf,
}

impl FileMapping {
    /// The single source file, or `None` if zero or several were configured.
    #[must_use]
    pub fn single_source(&self) -> Option<&Path> {
        match self.sources.as_slice() {
            [src] => Some(src),
            _ => None,
        }
    }
}

/// Per-target configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Bundle option fields that win over derived values.
    pub bundle: Option<BundleOverrides>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`build.target`").
        field: String,
        /// Error message (e.g., "${`BUILD_TARGET`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `htmlbuild.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the result is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(tag_name) = &settings.tag_name {
            self.build_resolved.tag_name.clone_from(tag_name);
        }
        if let Some(target) = &settings.target {
            self.build_resolved.target.clone_from(target);
        }
        if let Some(base_dir) = &settings.base_dir {
            self.build_resolved.base_dir.clone_from(base_dir);
        }
        if let Some(plan_path) = &settings.plan_path {
            self.build_resolved.plan_path.clone_from(plan_path);
        }
        if let Some(merge_existing) = settings.merge_existing {
            self.build_resolved.merge_existing = merge_existing;
        }
    }

    /// Get the file mappings, requiring at least one.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if no `[[files]]` entry is configured.
    pub fn require_files(&self) -> Result<&[FileMapping], ConfigError> {
        if self.files_resolved.is_empty() {
            return Err(ConfigError::Validation(
                "at least one [[files]] entry is required".to_owned(),
            ));
        }
        Ok(&self.files_resolved)
    }

    /// Bundle overrides keyed by target name.
    #[must_use]
    pub fn bundle_overrides(&self) -> HashMap<String, BundleOverrides> {
        self.targets
            .iter()
            .filter_map(|(name, target)| {
                target
                    .bundle
                    .as_ref()
                    .map(|bundle| (name.clone(), bundle.clone()))
            })
            .collect()
    }

    /// Build the preprocessor configuration for this run.
    #[must_use]
    pub fn preprocessor_config(&self) -> PreprocessorConfig {
        PreprocessorConfig {
            tag_name: self.build_resolved.tag_name.clone(),
            base_dir: self.build_resolved.base_dir.clone(),
            target: self.build_resolved.target.clone(),
            bundle_overrides: self.bundle_overrides(),
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            build: BuildConfigRaw::default(),
            files: Vec::new(),
            targets: HashMap::new(),
            build_resolved: BuildConfig {
                plan_path: base.join(DEFAULT_PLAN_PATH),
                ..BuildConfig::default()
            },
            files_resolved: Vec::new(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let build = &self.build_resolved;

        require_non_empty(&build.tag_name, "build.tag_name")?;
        if !build
            .tag_name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ConfigError::Validation(format!(
                "build.tag_name may only contain letters, digits, '_' and '-': {:?}",
                build.tag_name
            )));
        }
        require_non_empty(&build.target, "build.target")?;

        for (name, target) in &self.targets {
            require_non_empty(name, "targets.<name>")?;
            if let Some(bundle) = &target.bundle
                && bundle.output_path.as_deref() == Some("")
            {
                return Err(ConfigError::Validation(format!(
                    "targets.{name}.bundle.out cannot be empty"
                )));
            }
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let build = &mut self.build;
        for (value, field) in [
            (&mut build.tag_name, "build.tag_name"),
            (&mut build.base_dir, "build.base_dir"),
            (&mut build.target, "build.target"),
            (&mut build.plan_path, "build.plan_path"),
        ] {
            if let Some(v) = value {
                *v = expand::expand_env(v, field)?;
            }
        }

        for file in &mut self.files {
            file.dest = expand::expand_env(&file.dest, "files.dest")?;
            match &mut file.src {
                SourceSpec::One(src) => *src = expand::expand_env(src, "files.src")?,
                SourceSpec::Many(srcs) => {
                    for src in srcs {
                        *src = expand::expand_env(src, "files.src")?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let defaults = BuildConfig::default();

        self.build_resolved = BuildConfig {
            tag_name: self.build.tag_name.clone().unwrap_or(defaults.tag_name),
            base_dir: self
                .build
                .base_dir
                .as_deref()
                .map_or(defaults.base_dir, PathBuf::from),
            target: self.build.target.clone().unwrap_or(defaults.target),
            plan_path: config_dir.join(self.build.plan_path.as_deref().unwrap_or(DEFAULT_PLAN_PATH)),
            merge_existing: self.build.merge_existing.unwrap_or(defaults.merge_existing),
        };

        self.files_resolved = std::mem::take(&mut self.files)
            .into_iter()
            .map(|file| FileMapping {
                sources: file
                    .src
                    .into_vec()
                    .into_iter()
                    .map(|src| config_dir.join(src))
                    .collect(),
                dest: config_dir.join(file.dest),
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));

        assert_eq!(config.build_resolved.tag_name, "htmlbuild");
        assert_eq!(config.build_resolved.target, "htmlbuild");
        assert_eq!(config.build_resolved.base_dir, PathBuf::new());
        assert_eq!(
            config.build_resolved.plan_path,
            PathBuf::from("/test/.htmlbuild/plan.json")
        );
        assert!(!config.build_resolved.merge_existing);
        assert!(config.files_resolved.is_empty());
    }

    #[test]
    fn test_parse_minimal_config() {
        let mut config: Config = toml::from_str("").unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.build_resolved.tag_name, "htmlbuild");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_build_config() {
        let toml = r#"
[build]
tag_name = "build"
base_dir = "public"
target = "release"
plan_path = "out/plan.json"
merge_existing = true
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.build_resolved,
            BuildConfig {
                tag_name: "build".to_owned(),
                base_dir: PathBuf::from("public"),
                target: "release".to_owned(),
                plan_path: PathBuf::from("/project/out/plan.json"),
                merge_existing: true,
            }
        );
    }

    #[test]
    fn test_resolve_files() {
        let toml = r#"
[[files]]
src = "app/index.html"
dest = "dist/index.html"

[[files]]
src = ["a.html", "b.html"]
dest = "dist/ab.html"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        let files = config.require_files().unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(
            files[0].single_source(),
            Some(Path::new("/project/app/index.html"))
        );
        assert_eq!(files[0].dest, PathBuf::from("/project/dist/index.html"));
        assert_eq!(files[1].sources.len(), 2);
        assert_eq!(files[1].single_source(), None);
    }

    #[test]
    fn test_require_files_empty() {
        let config = Config::default_with_base(Path::new("/test"));
        let err = config.require_files().unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("[[files]]"));
    }

    #[test]
    fn test_parse_bundle_overrides() {
        let toml = r#"
[targets.release.bundle]
mainConfigFile = "app/config.js"
optimize = "uglify2"
preserveLicenseComments = false

[targets.debug]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let overrides = config.bundle_overrides();

        assert_eq!(overrides.len(), 1);
        let release = &overrides["release"];
        assert_eq!(release.main_config_file.as_deref(), Some("app/config.js"));
        assert_eq!(release.base_directory, None);
        assert_eq!(release.extra["optimize"], serde_json::json!("uglify2"));
        assert_eq!(
            release.extra["preserveLicenseComments"],
            serde_json::json!(false)
        );
    }

    #[test]
    fn test_preprocessor_config() {
        let toml = r#"
[build]
tag_name = "build"
target = "release"

[targets.release.bundle]
optimize = "none"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));
        let pre = config.preprocessor_config();

        assert_eq!(pre.tag_name, "build");
        assert_eq!(pre.target, "release");
        assert!(pre.bundle_overrides.contains_key("release"));
    }

    #[test]
    fn test_invalid_tag_name() {
        let toml = r#"
[build]
tag_name = "my build"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));
        let err = config.validate().unwrap_err();

        assert!(err.to_string().contains("build.tag_name"));
    }

    #[test]
    fn test_empty_target() {
        let toml = r#"
[build]
target = ""
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            tag_name: Some("build".to_owned()),
            target: Some("release".to_owned()),
            base_dir: Some(PathBuf::from("public")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.build_resolved.tag_name, "build");
        assert_eq!(config.build_resolved.target, "release");
        assert_eq!(config.build_resolved.base_dir, PathBuf::from("public"));
        assert_eq!(
            config.build_resolved.plan_path,
            PathBuf::from("/test/.htmlbuild/plan.json")
        ); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let before = Config::default_with_base(Path::new("/test"));
        let mut config = Config::default_with_base(Path::new("/test"));

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.build_resolved, before.build_resolved);
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("HTMLBUILD_TEST_TARGET", "staging");
        }

        let toml = r#"
[build]
target = "${HTMLBUILD_TEST_TARGET}"
base_dir = "${HTMLBUILD_TEST_UNSET_DIR:-public}"

[[files]]
src = "${HTMLBUILD_TEST_UNSET_SRC:-index.html}"
dest = "dist/index.html"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.build_resolved.target, "staging");
        assert_eq!(config.build_resolved.base_dir, PathBuf::from("public"));
        assert_eq!(
            config.files_resolved[0].sources,
            vec![PathBuf::from("/project/index.html")]
        );

        unsafe {
            std::env::remove_var("HTMLBUILD_TEST_TARGET");
        }
    }

    #[test]
    fn test_expand_env_vars_unset() {
        let toml = r#"
[build]
plan_path = "${HTMLBUILD_TEST_UNSET_PLAN}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { ref field, .. } if field == "build.plan_path"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"
[build]
target = "release"

[[files]]
src = "index.html"
dest = "out/index.html"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.config_path, Some(path));
        assert_eq!(config.build_resolved.target, "release");
        assert_eq!(
            config.build_resolved.plan_path,
            dir.path().join(".htmlbuild/plan.json")
        );
        assert_eq!(config.files_resolved[0].dest, dir.path().join("out/index.html"));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let err = Config::load(Some(Path::new("/nonexistent/htmlbuild.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_validates_cli_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();

        let settings = CliSettings {
            target: Some(String::new()),
            ..Default::default()
        };
        let err = Config::load(Some(&path), Some(&settings)).unwrap_err();

        assert!(err.to_string().contains("build.target"));
    }
}

//! Project configuration management.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "assetstamp.toml";

/// Main configuration structure for assetstamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// External build step settings.
    #[serde(default)]
    pub build: BuildConfig,

    /// Publish settings.
    pub publish: PublishConfig,

    /// Assets to fingerprint, in publish order.
    #[serde(default)]
    pub assets: Vec<AssetConfig>,

    /// Static entries copied verbatim into the output directory.
    #[serde(default)]
    pub copy: Vec<CopyConfig>,

    /// Directory relative paths are resolved against.
    ///
    /// Set to the configuration file's directory on load.
    #[serde(skip)]
    pub root: PathBuf,
}

/// External build step configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Program and arguments, run without a shell.
    #[serde(default)]
    pub command: Option<Vec<String>>,

    /// Working directory for the command, relative to the project root.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

/// Publish configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Output directory. Cleared at the start of every publish.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// HTML template containing `{{ name }}` placeholders.
    pub template: PathBuf,

    /// File name of the rendered entry page inside the output directory.
    #[serde(default = "default_entry")]
    pub entry: String,

    /// Whether to write `asset-manifest.json`.
    #[serde(default)]
    pub manifest: bool,
}

/// A tracked asset that gets a fingerprinted file name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Logical name used as the template placeholder.
    pub name: String,

    /// Path to the compiled artifact.
    pub path: PathBuf,

    /// Base of the published file name. Defaults to the artifact's file name
    /// up to its first `.`.
    #[serde(default)]
    pub base: Option<String>,

    /// Whether `<path>.map` is published alongside the artifact.
    #[serde(default = "default_true")]
    pub source_map: bool,
}

/// A static file or directory copied unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyConfig {
    /// Source file or directory.
    pub from: PathBuf,

    /// Destination relative to the output directory.
    #[serde(default)]
    pub to: Option<PathBuf>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_entry() -> String {
    "index.html".to_string()
}

fn default_true() -> bool {
    true
}

impl AssetConfig {
    /// Path of the accompanying source map.
    pub fn source_map_path(&self) -> PathBuf {
        let mut raw = self.path.clone().into_os_string();
        raw.push(".map");
        PathBuf::from(raw)
    }
}

impl CopyConfig {
    /// Destination relative to the output directory.
    ///
    /// Falls back to the source's file name when `to` is unset.
    pub fn destination(&self) -> PathBuf {
        match &self.to {
            Some(to) => to.clone(),
            None => self
                .from
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.root = root_of(path);
        config.validate()?;
        tracing::debug!(
            path = %path.display(),
            assets = config.assets.len(),
            "loaded configuration"
        );
        Ok(config)
    }

    /// Load configuration, layering `ASSETSTAMP_*` environment variables over the file.
    ///
    /// Nested keys use a double underscore: `ASSETSTAMP_PUBLISH__OUTPUT_DIR=out`.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix("ASSETSTAMP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let mut config: Config = settings.try_deserialize()?;
        config.root = root_of(path);
        config.validate()?;
        tracing::debug!(
            path = %path.display(),
            assets = config.assets.len(),
            "loaded configuration"
        );
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.assets.is_empty() {
            return Err(CoreError::config("at least one [[assets]] entry is required"));
        }

        let mut seen = std::collections::HashSet::new();
        for asset in &self.assets {
            if !is_valid_name(&asset.name) {
                return Err(CoreError::config(format!(
                    "invalid asset name {:?}: use letters, digits, '_', '-' or '.'",
                    asset.name
                )));
            }
            if !seen.insert(asset.name.as_str()) {
                return Err(CoreError::config(format!(
                    "duplicate asset name: {}",
                    asset.name
                )));
            }
            if asset.path.as_os_str().is_empty() {
                return Err(CoreError::config(format!(
                    "assets.{}.path cannot be empty",
                    asset.name
                )));
            }
            if asset.base.as_deref().is_some_and(str::is_empty) {
                return Err(CoreError::config(format!(
                    "assets.{}.base cannot be empty",
                    asset.name
                )));
            }
        }

        if self.publish.template.as_os_str().is_empty() {
            return Err(CoreError::config("publish.template cannot be empty"));
        }

        let entry = Path::new(&self.publish.entry);
        if entry.file_name().is_none() || !stays_inside(entry) {
            return Err(CoreError::config(format!(
                "publish.entry must be a relative path inside the output directory: {}",
                self.publish.entry
            )));
        }

        if let Some(command) = &self.build.command {
            if command.first().is_none_or(|program| program.is_empty()) {
                return Err(CoreError::config("build.command cannot be empty"));
            }
        }

        for entry in &self.copy {
            if entry.from.as_os_str().is_empty() {
                return Err(CoreError::config("copy.from cannot be empty"));
            }
            let dest = entry.destination();
            if dest.as_os_str().is_empty() || !stays_inside(&dest) {
                return Err(CoreError::config(format!(
                    "copy destination must be a relative path inside the output directory: {}",
                    dest.display()
                )));
            }
        }

        Ok(())
    }

    /// Resolve a configured path against the project root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    /// Resolved output directory.
    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.publish.output_dir)
    }

    /// Logical names of all tracked assets, in configuration order.
    pub fn asset_names(&self) -> Vec<&str> {
        self.assets.iter().map(|a| a.name.as_str()).collect()
    }

    /// Every configured input path, resolved against the root.
    pub fn inputs(&self) -> Vec<PathBuf> {
        let mut inputs = vec![self.resolve(&self.publish.template)];
        for asset in &self.assets {
            inputs.push(self.resolve(&asset.path));
            if asset.source_map {
                inputs.push(self.resolve(&asset.source_map_path()));
            }
        }
        inputs.extend(self.copy.iter().map(|entry| self.resolve(&entry.from)));
        inputs
    }

    /// Inputs that live inside `dir` and would be destroyed by clearing it.
    ///
    /// Paths are compared after canonicalization; inputs that do not exist
    /// yet are compared as configured.
    pub fn inputs_within(&self, dir: &Path) -> Vec<PathBuf> {
        let dir = std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        self.inputs()
            .into_iter()
            .filter(|input| {
                let resolved =
                    std::fs::canonicalize(input).unwrap_or_else(|_| input.clone());
                resolved.starts_with(&dir)
            })
            .collect()
    }

    /// Report every configured input that does not exist on disk.
    ///
    /// Inputs produced by the build command may legitimately be missing
    /// before it runs.
    pub fn missing_inputs(&self) -> Vec<CoreError> {
        let mut missing = Vec::new();

        let template = self.resolve(&self.publish.template);
        if !template.is_file() {
            missing.push(CoreError::missing_input(template, "template not found"));
        }

        for asset in &self.assets {
            let path = self.resolve(&asset.path);
            if !path.is_file() {
                missing.push(CoreError::missing_input(
                    path,
                    format!("asset `{}` not found", asset.name),
                ));
            }
            if asset.source_map {
                let map = self.resolve(&asset.source_map_path());
                if !map.is_file() {
                    missing.push(CoreError::missing_input(
                        map,
                        format!("source map for `{}` not found", asset.name),
                    ));
                }
            }
        }

        for entry in &self.copy {
            let from = self.resolve(&entry.from);
            if !from.exists() {
                missing.push(CoreError::missing_input(from, "copy source not found"));
            }
        }

        missing
    }
}

fn root_of(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn stays_inside(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn create_test_config() -> String {
        r#"
[build]
command = ["npm", "run", "build"]

[publish]
output_dir = "out"
template = "web/index.html"
manifest = true

[[assets]]
name = "css"
path = "build/app.css"

[[assets]]
name = "js"
path = "build/app.js"
base = "bundle"
source_map = false

[[copy]]
from = "assets"

[[copy]]
from = "habitat.conf.sample.js"
to = "habitat.conf.js"
"#
        .to_string()
    }

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);
        let mut file = std::fs::File::create(&config_path).expect("create file");
        file.write_all(content.as_bytes()).expect("write");
        config_path
    }

    #[test]
    fn test_load_config() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = write_config(dir.path(), &create_test_config());

        let config = Config::load(&config_path).expect("load config");

        assert_eq!(
            config.build.command.as_deref(),
            Some(&["npm".to_string(), "run".to_string(), "build".to_string()][..])
        );
        assert_eq!(config.publish.output_dir, PathBuf::from("out"));
        assert_eq!(config.publish.template, PathBuf::from("web/index.html"));
        assert_eq!(config.publish.entry, "index.html");
        assert!(config.publish.manifest);
        assert_eq!(config.asset_names(), vec!["css", "js"]);
        assert!(config.assets[0].source_map);
        assert_eq!(config.assets[1].base.as_deref(), Some("bundle"));
        assert!(!config.assets[1].source_map);
        assert_eq!(config.copy.len(), 2);
        assert_eq!(config.root, dir.path());
    }

    #[test]
    fn test_config_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = write_config(
            dir.path(),
            r#"
[publish]
template = "index.html"

[[assets]]
name = "css"
path = "app.css"
"#,
        );

        let config = Config::load(&config_path).expect("load config");

        assert!(config.build.command.is_none());
        assert_eq!(config.publish.output_dir, PathBuf::from("dist"));
        assert_eq!(config.publish.entry, "index.html");
        assert!(!config.publish.manifest);
        assert!(config.copy.is_empty());
    }

    #[test]
    fn test_load_with_env_reads_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = write_config(dir.path(), &create_test_config());

        let config = Config::load_with_env(&config_path).expect("load config");

        assert_eq!(config.asset_names(), vec!["css", "js"]);
        assert_eq!(config.copy[1].destination(), PathBuf::from("habitat.conf.js"));
        assert_eq!(config.root, dir.path());
    }

    #[test]
    fn test_resolve_against_root() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = write_config(dir.path(), &create_test_config());
        let config = Config::load(&config_path).expect("load config");

        assert_eq!(config.output_dir(), dir.path().join("out"));
        assert_eq!(
            config.resolve(Path::new("build/app.css")),
            dir.path().join("build/app.css")
        );
    }

    #[test]
    fn test_source_map_path_and_destination() {
        let asset = AssetConfig {
            name: "css".to_string(),
            path: PathBuf::from("build/app.css"),
            base: None,
            source_map: true,
        };
        assert_eq!(asset.source_map_path(), PathBuf::from("build/app.css.map"));

        let copy = CopyConfig {
            from: PathBuf::from("vendor/icons"),
            to: None,
        };
        assert_eq!(copy.destination(), PathBuf::from("icons"));
    }

    #[test]
    fn test_duplicate_asset_name_rejected() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = write_config(
            dir.path(),
            r#"
[publish]
template = "index.html"

[[assets]]
name = "css"
path = "a.css"

[[assets]]
name = "css"
path = "b.css"
"#,
        );

        let err = Config::load(&config_path).unwrap_err();
        assert!(err.to_string().contains("duplicate asset name"));
    }

    #[test]
    fn test_invalid_asset_name_rejected() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = write_config(
            dir.path(),
            r#"
[publish]
template = "index.html"

[[assets]]
name = "my css"
path = "a.css"
"#,
        );

        let err = Config::load(&config_path).unwrap_err();
        assert!(err.to_string().contains("invalid asset name"));
    }

    #[test]
    fn test_no_assets_rejected() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = write_config(
            dir.path(),
            r#"
[publish]
template = "index.html"
"#,
        );

        let err = Config::load(&config_path).unwrap_err();
        assert!(err.to_string().contains("at least one"));
    }

    #[test]
    fn test_empty_build_command_rejected() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = write_config(
            dir.path(),
            r#"
[build]
command = []

[publish]
template = "index.html"

[[assets]]
name = "css"
path = "a.css"
"#,
        );

        let err = Config::load(&config_path).unwrap_err();
        assert!(err.to_string().contains("build.command"));
    }

    #[test]
    fn test_copy_escaping_output_rejected() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = write_config(
            dir.path(),
            r#"
[publish]
template = "index.html"

[[assets]]
name = "css"
path = "a.css"

[[copy]]
from = "assets"
to = "../elsewhere"
"#,
        );

        let err = Config::load(&config_path).unwrap_err();
        assert!(err.to_string().contains("inside the output directory"));
    }

    #[test]
    fn test_entry_escaping_output_rejected() {
        let dir = tempfile::tempdir().expect("create temp dir");
        for entry in ["../../x.html", "/tmp/x.html", "."] {
            let config_path = write_config(
                dir.path(),
                &format!(
                    r#"
[publish]
template = "index.html"
entry = "{entry}"

[[assets]]
name = "css"
path = "a.css"
"#
                ),
            );

            let err = Config::load(&config_path).unwrap_err();
            assert!(
                err.to_string().contains("publish.entry"),
                "{entry} was accepted"
            );
        }
    }

    #[test]
    fn test_nested_entry_accepted() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = write_config(
            dir.path(),
            r#"
[publish]
template = "index.html"
entry = "app/index.html"

[[assets]]
name = "css"
path = "a.css"
"#,
        );

        let config = Config::load(&config_path).expect("load config");
        assert_eq!(config.publish.entry, "app/index.html");
    }

    #[test]
    fn test_inputs_within_output_dir() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = write_config(
            dir.path(),
            r#"
[publish]
output_dir = "site"
template = "site/index.tpl.html"

[[assets]]
name = "css"
path = "build/app.css"
source_map = false

[[copy]]
from = "site/images"
to = "images"
"#,
        );
        std::fs::create_dir_all(dir.path().join("site/images")).expect("mkdir");
        std::fs::write(dir.path().join("site/index.tpl.html"), "{{ css }}").expect("write");

        let config = Config::load(&config_path).expect("load config");

        assert_eq!(config.inputs().len(), 3);
        let inside = config.inputs_within(&config.output_dir());
        assert_eq!(inside.len(), 2);
        assert!(inside.contains(&dir.path().join("site/index.tpl.html")));
        assert!(inside.contains(&dir.path().join("site/images")));
        assert!(config.inputs_within(&dir.path().join("dist")).is_empty());
    }

    #[test]
    fn test_missing_inputs_reported() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = write_config(dir.path(), &create_test_config());
        let config = Config::load(&config_path).expect("load config");

        // Nothing but the config file exists yet.
        let missing = config.missing_inputs();
        // template, css, css map, js, two copy sources
        assert_eq!(missing.len(), 6);

        std::fs::create_dir_all(dir.path().join("web")).expect("mkdir");
        std::fs::write(dir.path().join("web/index.html"), "{{ css }}").expect("write");
        std::fs::create_dir_all(dir.path().join("build")).expect("mkdir");
        std::fs::write(dir.path().join("build/app.css"), "body{}").expect("write");

        let missing = config.missing_inputs();
        assert_eq!(missing.len(), 4);
        assert!(
            missing
                .iter()
                .any(|e| e.to_string().contains("source map for `css`"))
        );
    }

    #[test]
    fn test_config_not_found() {
        let result = Config::load(Path::new("/nonexistent/assetstamp.toml"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }
}

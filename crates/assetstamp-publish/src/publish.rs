//! Publish orchestration.
//!
//! Coordinates the full publish: build command, fingerprinting, reference
//! rewriting and static copies.

use std::{
    collections::BTreeMap,
    fs,
    path::{Component, Path, PathBuf},
    time::Instant,
};

use assetstamp_core::Config;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    assets::{self, AssetError},
    command::{BuildCommand, CommandError},
    fingerprint::{fingerprint, publish_name, split_name},
    manifest::AssetManifest,
    template::{Template, TemplateError},
};

/// File name of the JSON manifest written when `publish.manifest` is set.
pub const MANIFEST_FILE: &str = "asset-manifest.json";

/// Publish errors.
#[derive(Debug, Error)]
pub enum PublishError {
    /// External build step failed.
    #[error("build command error: {0}")]
    Command(#[from] CommandError),

    /// Reading inputs or writing outputs failed.
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),

    /// Reference rewriting failed.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Manifest serialization failed.
    #[error("manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    /// Two outputs of the same publish would land on one path.
    #[error("output {path} would be written by both {first} and {second}")]
    OutputConflict {
        path: PathBuf,
        first: String,
        second: String,
    },

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),
}

/// Result type for publish operations.
pub type Result<T> = std::result::Result<T, PublishError>;

/// Publish statistics.
#[derive(Debug, Clone, Default)]
pub struct PublishStats {
    /// Number of fingerprinted assets written.
    pub assets: usize,

    /// Number of source maps written.
    pub source_maps: usize,

    /// Number of static files copied.
    pub static_files: usize,

    /// Path of the rendered entry page.
    pub entry: PathBuf,

    /// Logical name to published file name.
    pub manifest: AssetManifest,

    /// Publish duration in milliseconds.
    pub duration_ms: u64,
}

/// A fingerprinted asset ready to be written.
#[derive(Debug, Clone)]
pub struct PublishedAsset {
    /// Logical name.
    pub name: String,

    /// Resolved path of the compiled artifact.
    pub source: PathBuf,

    /// Content fingerprint.
    pub fingerprint: String,

    /// Published file name, `<base>-<fingerprint><ext>`.
    pub file_name: String,

    /// Published source map file name, if the asset has one.
    pub source_map: Option<String>,

    bytes: Vec<u8>,
    map_bytes: Option<Vec<u8>>,
}

/// Everything a publish writes, computed without touching the output tree.
#[derive(Debug, Clone)]
pub struct PublishPlan {
    /// Fingerprinted assets in configuration order.
    pub assets: Vec<PublishedAsset>,

    /// Mapping used to render the entry page.
    pub manifest: AssetManifest,

    /// Rendered entry page.
    pub entry_html: String,
}

/// Publisher that orchestrates the publish step.
#[derive(Debug)]
pub struct Publisher {
    config: Config,
    output_dir: PathBuf,
    run_build_command: bool,
}

impl Publisher {
    /// Create a new publisher writing to the configured output directory.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let output_dir = config.output_dir();
        Self {
            config,
            output_dir,
            run_build_command: true,
        }
    }

    /// Override the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Enable or disable the external build command.
    #[must_use]
    pub fn with_build_command(mut self, enabled: bool) -> Self {
        self.run_build_command = enabled;
        self
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Execute the full publish.
    pub fn publish(&self) -> Result<PublishStats> {
        let start = Instant::now();

        info!(
            root = %self.config.root.display(),
            output = %self.output_dir.display(),
            "starting publish"
        );

        // 1. Build
        if self.run_build_command {
            self.run_build()?;
        }

        // 2. Hash inputs and render the entry page in memory
        let plan = self.plan()?;

        // 3. Clear then rebuild the output directory
        self.guard_output_dir()?;
        assets::clean_dir(&self.output_dir)?;

        // 4. Write fingerprinted assets
        let mut stats = PublishStats::default();
        for asset in &plan.assets {
            let dest = self.output_dir.join(&asset.file_name);
            assets::write_file(&dest, &asset.bytes)?;
            stats.assets += 1;

            if let (Some(map_name), Some(map_bytes)) = (&asset.source_map, &asset.map_bytes) {
                assets::write_file(&self.output_dir.join(map_name), map_bytes)?;
                stats.source_maps += 1;
            }

            info!(
                name = %asset.name,
                file = %asset.file_name,
                "published asset"
            );
        }

        // 5. Write the entry page
        stats.entry = self.output_dir.join(&self.config.publish.entry);
        assets::write_file(&stats.entry, &plan.entry_html)?;
        debug!(path = %stats.entry.display(), "wrote entry page");

        // 6. Copy static entries
        stats.static_files = self.copy_static()?;

        // 7. Manifest
        if self.config.publish.manifest {
            let path = self.output_dir.join(MANIFEST_FILE);
            assets::write_file(&path, plan.manifest.to_json()?)?;
            debug!(path = %path.display(), "wrote asset manifest");
        }

        stats.manifest = plan.manifest;
        stats.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            assets = stats.assets,
            source_maps = stats.source_maps,
            static_files = stats.static_files,
            duration_ms = stats.duration_ms,
            "publish complete"
        );

        Ok(stats)
    }

    /// Compute fingerprints, the manifest and the rendered entry page.
    ///
    /// Reads inputs only; the output directory is left alone.
    pub fn plan(&self) -> Result<PublishPlan> {
        let mut manifest = AssetManifest::new();
        let mut published = Vec::with_capacity(self.config.assets.len());

        for asset in &self.config.assets {
            let source = self.config.resolve(&asset.path);
            let bytes = assets::read_file(&source)?;
            let digest = fingerprint(&bytes);

            let (default_base, ext) = split_name(&asset.path);
            let base = asset.base.clone().unwrap_or(default_base);
            let file_name = publish_name(&base, &ext, &digest);

            let (source_map, map_bytes) = if asset.source_map {
                let map_path = self.config.resolve(&asset.source_map_path());
                let map_bytes = assets::read_file(&map_path)?;
                let map_name = publish_name(&base, &format!("{ext}.map"), &digest);
                (Some(map_name), Some(map_bytes))
            } else {
                (None, None)
            };

            debug!(name = %asset.name, fingerprint = %digest, "fingerprinted asset");

            if manifest.add(&asset.name, &file_name).is_some() {
                return Err(PublishError::Config(format!(
                    "asset name used twice: {}",
                    asset.name
                )));
            }

            published.push(PublishedAsset {
                name: asset.name.clone(),
                source,
                fingerprint: digest,
                file_name,
                source_map,
                bytes,
                map_bytes,
            });
        }

        let template = Template::load(&self.config.resolve(&self.config.publish.template))?;
        let referenced = template.placeholders()?;
        for (name, _) in manifest.iter() {
            if !referenced.iter().any(|r| r == name) {
                warn!(
                    asset = name,
                    template = template.name(),
                    "asset is not referenced by the template"
                );
            }
        }
        let entry_html = template.render(&manifest)?;

        self.check_outputs(&published)?;

        Ok(PublishPlan {
            assets: published,
            manifest,
            entry_html,
        })
    }

    /// Run the configured build command, if there is one.
    fn run_build(&self) -> Result<()> {
        let Some(argv) = &self.config.build.command else {
            debug!("no build command configured");
            return Ok(());
        };

        let dir = match &self.config.build.working_dir {
            Some(dir) => self.config.resolve(dir),
            None => self.config.root.clone(),
        };

        BuildCommand::new(argv.clone(), dir)?.run()?;
        Ok(())
    }

    /// Copy every configured static entry into the output directory.
    fn copy_static(&self) -> Result<usize> {
        let mut count = 0;
        for entry in &self.config.copy {
            let from = self.config.resolve(&entry.from);
            let to = self.output_dir.join(entry.destination());
            count += assets::copy_entry(&from, &to)?;
        }
        Ok(count)
    }

    /// Fail if any two outputs (assets, maps, entry page, manifest, static
    /// copies) share a path inside the output directory.
    fn check_outputs(&self, published: &[PublishedAsset]) -> Result<()> {
        let mut owners: BTreeMap<PathBuf, String> = BTreeMap::new();
        let mut claim = |path: &Path, owner: String| -> Result<()> {
            let key = output_key(path);
            match owners.get(&key) {
                Some(first) => Err(PublishError::OutputConflict {
                    path: self.output_dir.join(&key),
                    first: first.clone(),
                    second: owner,
                }),
                None => {
                    owners.insert(key, owner);
                    Ok(())
                }
            }
        };

        claim(Path::new(""), "the output directory".to_string())?;
        for asset in published {
            claim(Path::new(&asset.file_name), format!("asset `{}`", asset.name))?;
            if let Some(map) = &asset.source_map {
                claim(Path::new(map), format!("source map of `{}`", asset.name))?;
            }
        }
        claim(Path::new(&self.config.publish.entry), "the entry page".to_string())?;
        if self.config.publish.manifest {
            claim(Path::new(MANIFEST_FILE), "the asset manifest".to_string())?;
        }

        for entry in &self.config.copy {
            let from = self.config.resolve(&entry.from);
            let dest = entry.destination();
            for relative in assets::copy_targets(&from)? {
                claim(
                    &dest.join(relative),
                    format!("static copy of {}", entry.from.display()),
                )?;
            }
        }

        Ok(())
    }

    /// Refuse to clear a directory that contains the project or any input.
    fn guard_output_dir(&self) -> Result<()> {
        if !self.output_dir.exists() {
            return Ok(());
        }

        let output = fs::canonicalize(&self.output_dir).map_err(|source| AssetError::Read {
            path: self.output_dir.clone(),
            source,
        })?;
        let root = fs::canonicalize(&self.config.root).map_err(|source| AssetError::Read {
            path: self.config.root.clone(),
            source,
        })?;

        if root.starts_with(&output) {
            return Err(PublishError::Config(format!(
                "output directory {} contains the project root; refusing to clear it",
                self.output_dir.display()
            )));
        }

        if let Some(input) = self.config.inputs_within(&self.output_dir).first() {
            return Err(PublishError::Config(format!(
                "output directory {} contains the input {}; refusing to clear it",
                self.output_dir.display(),
                input.display()
            )));
        }
        Ok(())
    }
}

/// Normalized form of a path relative to the output directory.
fn output_key(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect()
}

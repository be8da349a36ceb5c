//! Build command - publishes the fingerprinted bundle

use std::{path::Path, path::PathBuf, time::Instant};

use assetstamp_core::Config;
use assetstamp_publish::Publisher;
use color_eyre::eyre::{Result, WrapErr};

/// Flags accepted by `assetstamp build`.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Output directory overriding `publish.output_dir`.
    pub output: Option<PathBuf>,
    /// Skip the external build command.
    pub skip_build: bool,
    /// Only compute and print what would be published.
    pub dry_run: bool,
}

/// Run the build command.
pub fn run(config_path: &Path, options: &BuildOptions) -> Result<()> {
    let start = Instant::now();
    tracing::info!(?config_path, ?options, "Starting build");

    let config = Config::load_with_env(config_path).wrap_err("Failed to load configuration")?;
    tracing::debug!(?config, "Loaded configuration");

    let mut publisher = Publisher::new(config).with_build_command(!options.skip_build);
    if let Some(output) = &options.output {
        tracing::info!(output = %output.display(), "Overriding output directory from CLI");
        publisher = publisher.with_output_dir(output);
    }

    if options.dry_run {
        let plan = publisher.plan().wrap_err("Planning failed")?;

        println!();
        println!("  Dry run, nothing written.");
        println!();
        for asset in &plan.assets {
            println!(
                "  {:<8} {}  <- {}",
                asset.name,
                asset.file_name,
                asset.source.display()
            );
            if let Some(map) = &asset.source_map {
                println!("  {:<8} {map}", "");
            }
        }
        println!();
        println!("  Output:     {}", publisher.output_dir().display());
        println!();
        return Ok(());
    }

    let stats = publisher.publish().wrap_err("Publish failed")?;
    let duration = start.elapsed();

    println!();
    println!("  Publish completed successfully!");
    println!();
    for (name, file) in stats.manifest.iter() {
        println!("  {name:<8} {file}");
    }
    println!();
    println!("  Assets:       {}", stats.assets);
    println!("  Source maps:  {}", stats.source_maps);
    println!("  Static files: {}", stats.static_files);
    println!("  Entry page:   {}", stats.entry.display());
    println!();
    println!("  Duration:     {:.2}s", duration.as_secs_f64());
    println!("  Output:       {}", publisher.output_dir().display());
    println!();

    tracing::info!(?stats, ?duration, "Build completed successfully");

    Ok(())
}

//! assetstamp CLI
//!
//! Publishes compiled CSS/JS under content-hashed file names and rewrites the
//! entry page to reference them.
//!
//! This is the binary entry point. The command implementations are in `lib.rs`.

use clap::Parser;
use color_eyre::eyre::Result;

/// Command-line interface for assetstamp.
#[derive(Parser)]
#[command(
    name = "assetstamp",
    version,
    about = "Publish fingerprinted web assets and rewrite their references"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "ASSETSTAMP_CONFIG", default_value = "assetstamp.toml")]
    config: std::path::PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Run the build step and publish the fingerprinted bundle
    Build {
        /// Output directory (overrides publish.output_dir)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
        /// Do not run the configured build command
        #[arg(long)]
        skip_build: bool,
        /// Print what would be published without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate configuration, inputs and template placeholders
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
    /// Print the SHA-256 fingerprint of each file
    Hash {
        /// Files to hash
        #[arg(required = true)]
        files: Vec<std::path::PathBuf>,
    },
    /// Write a starter configuration and template into the current directory
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    assetstamp::init_tracing(cli.verbose);

    match cli.command {
        Commands::Build {
            output,
            skip_build,
            dry_run,
        } => {
            let options = assetstamp::cmd::build::BuildOptions {
                output,
                skip_build,
                dry_run,
            };
            assetstamp::cmd::build::run(&cli.config, &options)?;
        }
        Commands::Check { strict } => {
            assetstamp::cmd::check::run(&cli.config, strict)?;
        }
        Commands::Hash { files } => {
            assetstamp::cmd::hash::run(&files, &mut std::io::stdout().lock())?;
        }
        Commands::Init { force } => {
            assetstamp::cmd::init::run(std::path::Path::new("."), force)?;
        }
    }

    Ok(())
}

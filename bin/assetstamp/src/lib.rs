//! assetstamp CLI library
//!
//! Command implementations for the `assetstamp` binary, kept in a library so
//! they can be exercised directly from tests.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (build, check, hash, init)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use assetstamp::cmd;
//!
//! // Publish using ./assetstamp.toml
//! let options = cmd::build::BuildOptions::default();
//! cmd::build::run(Path::new("assetstamp.toml"), &options).unwrap();
//! ```

pub mod cmd;

pub use assetstamp_core::Config;
pub use assetstamp_publish::{PublishStats, Publisher};

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

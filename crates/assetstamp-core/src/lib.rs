//! assetstamp core library
//!
//! Configuration and error handling shared by the publisher and the CLI.

pub mod config;
pub mod error;

pub use config::{AssetConfig, BuildConfig, Config, CopyConfig, PublishConfig};
pub use error::{CoreError, Result};

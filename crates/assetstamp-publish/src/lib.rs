//! assetstamp publish library
//!
//! Content-addressed publishing of compiled web assets.
//!
//! # Modules
//!
//! - [`fingerprint`] - SHA-256 fingerprints and fingerprinted file names
//! - [`template`] - `{{ name }}` reference rewriting for the entry page
//! - [`manifest`] - Logical name to published file name mapping
//! - [`assets`] - Static file copying
//! - [`command`] - External build step
//! - [`publish`] - Publish orchestration

pub mod assets;
pub mod command;
pub mod fingerprint;
pub mod manifest;
pub mod publish;
pub mod template;

pub use assets::AssetError;
pub use command::{BuildCommand, CommandError};
pub use fingerprint::{fingerprint, fingerprint_file, publish_name, split_name};
pub use manifest::AssetManifest;
pub use publish::{PublishError, PublishPlan, PublishStats, PublishedAsset, Publisher};
pub use template::{Template, TemplateError, placeholders, render};

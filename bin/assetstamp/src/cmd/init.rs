//! Init command - write a starter configuration and entry template

use std::{fs, path::Path};

use assetstamp_core::config::DEFAULT_CONFIG_FILE;
use color_eyre::eyre::{Result, WrapErr, bail};

/// Starter configuration written by `assetstamp init`.
pub const STARTER_CONFIG: &str = r#"# assetstamp configuration

[build]
# Command that compiles build/app.css and build/app.js.
command = ["npm", "run", "build"]

[publish]
output_dir = "dist"
template = "index.html"
manifest = false

[[assets]]
name = "css"
path = "build/app.css"
base = "app"

[[assets]]
name = "js"
path = "build/app.js"
base = "app"

[[copy]]
from = "assets"
"#;

/// Starter entry page template.
pub const STARTER_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>App</title>
    <link rel="stylesheet" href="/{{ css }}">
</head>
<body>
    <div id="app"></div>
    <script src="/{{ js }}"></script>
</body>
</html>
"#;

/// Run the init command in `dir`.
pub fn run(dir: &Path, force: bool) -> Result<()> {
    tracing::info!(?dir, force, "Initializing project");

    let files = [
        (dir.join(DEFAULT_CONFIG_FILE), STARTER_CONFIG),
        (dir.join("index.html"), STARTER_TEMPLATE),
    ];

    if !force {
        if let Some((path, _)) = files.iter().find(|(path, _)| path.exists()) {
            bail!(
                "{} already exists (use --force to overwrite)",
                path.display()
            );
        }
    }

    fs::create_dir_all(dir).wrap_err("Failed to create directories")?;
    for (path, content) in &files {
        fs::write(path, content)
            .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(?path, "Created file");
        println!("Created: {}", path.display());
    }

    Ok(())
}

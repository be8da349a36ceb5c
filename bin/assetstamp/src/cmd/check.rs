//! Check command - validate configuration, inputs and template references

use std::path::Path;

use assetstamp_core::Config;
use assetstamp_publish::Template;
use color_eyre::eyre::{Result, bail};

/// Problems found while checking, split by severity.
#[derive(Debug, Default)]
struct CheckReport {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl CheckReport {
    fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Print the findings and decide the exit status.
    ///
    /// Warnings only fail the check in strict mode.
    fn finish(self, strict: bool) -> Result<()> {
        println!();
        println!("Summary:");
        println!("  Errors:   {}", self.errors.len());
        println!("  Warnings: {}", self.warnings.len());

        if !self.errors.is_empty() {
            println!();
            println!("Errors:");
            for err in &self.errors {
                println!("  ✗ {err}");
            }
        }

        if !self.warnings.is_empty() {
            println!();
            println!("Warnings:");
            for warn in &self.warnings {
                println!("  ⚠ {warn}");
            }
        }

        if !self.errors.is_empty() {
            bail!("Check failed with {} error(s)", self.errors.len());
        }
        if strict && !self.warnings.is_empty() {
            bail!(
                "Check failed with {} warning(s) (strict mode)",
                self.warnings.len()
            );
        }

        println!();
        println!("✓ Ready to publish");
        Ok(())
    }
}

/// Run the check command.
///
/// Validates the configuration, that every input exists and lives outside
/// the output directory, and that every template placeholder names a
/// configured asset. Writes nothing.
pub fn run(config_path: &Path, strict: bool) -> Result<()> {
    tracing::info!(?config_path, strict, "Checking configuration and inputs");

    let mut report = CheckReport::default();

    println!("Checking configuration...");
    let config = match Config::load_with_env(config_path) {
        Ok(c) => {
            println!("  ✓ Configuration valid");
            c
        }
        Err(e) => {
            println!("  ✗ Configuration invalid: {e}");
            bail!("Configuration error: {e}");
        }
    };

    println!("\nChecking inputs...");
    check_inputs(&config, &mut report);

    println!("\nChecking output directory...");
    check_output_dir(&config, &mut report);

    println!("\nChecking template references...");
    check_template(&config, &mut report);

    report.finish(strict)
}

/// Missing inputs are warnings when a build command will produce them.
fn check_inputs(config: &Config, report: &mut CheckReport) {
    let missing = config.missing_inputs();
    if missing.is_empty() {
        println!("  ✓ All inputs present");
        return;
    }

    let has_build_command = config.build.command.is_some();
    let template = config.resolve(&config.publish.template);
    for err in missing {
        let produced_by_build = has_build_command
            && !matches!(&err, assetstamp_core::CoreError::MissingInput { path, .. } if *path == template);
        if produced_by_build {
            report.warning(format!("{err} (may be produced by the build command)"));
        } else {
            report.error(err.to_string());
        }
    }
}

/// Publishing clears the output directory, so no input may live inside it.
fn check_output_dir(config: &Config, report: &mut CheckReport) {
    let output = config.output_dir();
    let inside = config.inputs_within(&output);
    if inside.is_empty() {
        println!("  ✓ {} holds no inputs", output.display());
        return;
    }

    for input in inside {
        report.error(format!(
            "{} is inside the output directory {} and would be deleted on publish",
            input.display(),
            output.display()
        ));
    }
}

fn check_template(config: &Config, report: &mut CheckReport) {
    let path = config.resolve(&config.publish.template);
    if !path.is_file() {
        // Already reported as a missing input.
        return;
    }

    let placeholders = match Template::load(&path).and_then(|t| t.placeholders()) {
        Ok(names) => names,
        Err(e) => {
            report.error(e.to_string());
            return;
        }
    };

    let names = config.asset_names();
    let mut ok = true;
    for placeholder in &placeholders {
        if !names.contains(&placeholder.as_str()) {
            report.error(format!(
                "{}: placeholder `{placeholder}` does not match any configured asset",
                path.display()
            ));
            ok = false;
        }
    }

    for name in names {
        if !placeholders.iter().any(|p| p == name) {
            report.warning(format!("asset `{name}` is not referenced by the template"));
        }
    }

    if ok {
        println!("  ✓ {} placeholder(s) resolve", placeholders.len());
    }
}

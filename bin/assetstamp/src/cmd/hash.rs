//! Hash command - print content fingerprints

use std::{io::Write, path::PathBuf};

use assetstamp_publish::fingerprint_file;
use color_eyre::eyre::{Result, WrapErr};

/// Run the hash command.
///
/// Writes `<sha256-hex>  <path>` per file, in argument order.
pub fn run(files: &[PathBuf], out: &mut impl Write) -> Result<()> {
    for file in files {
        let digest = fingerprint_file(file)
            .wrap_err_with(|| format!("Failed to hash {}", file.display()))?;
        writeln!(out, "{digest}  {}", file.display())?;
    }
    Ok(())
}

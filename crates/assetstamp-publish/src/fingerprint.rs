//! Content fingerprints and fingerprinted file names.

use std::{fs, io, path::Path};

use sha2::{Digest, Sha256};

/// Length of a fingerprint in hex characters.
pub const FINGERPRINT_LEN: usize = 64;

/// Lowercase hex SHA-256 digest of `bytes`.
#[must_use]
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Fingerprint the contents of the file at `path`.
pub fn fingerprint_file(path: &Path) -> io::Result<String> {
    let content = fs::read(path)?;
    Ok(fingerprint(&content))
}

/// Published file name: `<base>-<digest><ext>`.
///
/// `ext` carries its leading dot.
#[must_use]
pub fn publish_name(base: &str, ext: &str, digest: &str) -> String {
    format!("{base}-{digest}{ext}")
}

/// Split a path's file name into the default base and extension.
///
/// The base runs up to the first `.` and the extension is everything from
/// there on (`main.min.js` gives `main` and `.min.js`). A leading dot belongs
/// to the base. Names without a dot get an empty extension.
#[must_use]
pub fn split_name(path: &Path) -> (String, String) {
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    match name.char_indices().skip(1).find(|&(_, c)| c == '.') {
        Some((idx, _)) => (name[..idx].to_string(), name[idx..].to_string()),
        None => (name, String::new()),
    }
}

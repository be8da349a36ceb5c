//! Static file operations for the output tree.
//!
//! Copies auxiliary assets (images, fonts, vendored icon sets, runtime config
//! samples) verbatim and wraps the filesystem calls the publisher makes so
//! every failure names the path involved.

use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Asset processing errors.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Input file or directory could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output file or directory could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failed.
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Copy source does not exist.
    #[error("copy source not found: {0}")]
    NotFound(PathBuf),
}

/// Result type for asset operations.
pub type Result<T> = std::result::Result<T, AssetError>;

/// Read a whole input file.
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| AssetError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `bytes` to `path`, creating parent directories.
pub fn write_file(path: &Path, bytes: impl AsRef<[u8]>) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, bytes).map_err(|source| AssetError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Copy a single file, creating parent directories.
pub fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    if !source.is_file() {
        return Err(AssetError::NotFound(source.to_path_buf()));
    }
    ensure_parent(dest)?;
    fs::copy(source, dest).map_err(|err| AssetError::Write {
        path: dest.to_path_buf(),
        source: err,
    })?;
    Ok(())
}

/// Copy a file or a whole directory tree to `to`.
///
/// Returns the number of files copied. Hidden files are copied too.
pub fn copy_entry(from: &Path, to: &Path) -> Result<usize> {
    if from.is_file() {
        copy_file(from, to)?;
        debug!(src = %from.display(), dest = %to.display(), "copied file");
        return Ok(1);
    }

    if !from.is_dir() {
        return Err(AssetError::NotFound(from.to_path_buf()));
    }

    let mut count = 0;
    for entry in WalkDir::new(from).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|source| AssetError::Walk {
            path: from.to_path_buf(),
            source,
        })?;

        let relative = entry
            .path()
            .strip_prefix(from)
            .unwrap_or_else(|_| entry.path());
        let dest = to.join(relative);

        if entry.file_type().is_dir() {
            ensure_dir(&dest)?;
        } else if entry.path().is_file() {
            copy_file(entry.path(), &dest)?;
            count += 1;
            debug!(src = %entry.path().display(), dest = %dest.display(), "copied file");
        }
    }

    ensure_dir(to)?;
    Ok(count)
}

/// Files [`copy_entry`] would create, relative to its `to`.
///
/// A single-file source yields one empty path (the file lands at `to`).
pub fn copy_targets(from: &Path) -> Result<Vec<PathBuf>> {
    if from.is_file() {
        return Ok(vec![PathBuf::new()]);
    }

    if !from.is_dir() {
        return Err(AssetError::NotFound(from.to_path_buf()));
    }

    let mut targets = Vec::new();
    for entry in WalkDir::new(from).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|source| AssetError::Walk {
            path: from.to_path_buf(),
            source,
        })?;
        if entry.path().is_file() {
            let relative = entry.path().strip_prefix(from).unwrap_or_else(|_| entry.path());
            targets.push(relative.to_path_buf());
        }
    }
    Ok(targets)
}

/// Remove `path` if it exists, then recreate it empty.
pub fn clean_dir(path: &Path) -> Result<()> {
    if path.exists() {
        debug!(dir = %path.display(), "cleaning output directory");
        fs::remove_dir_all(path).map_err(|source| AssetError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    ensure_dir(path)
}

/// Create a directory if it doesn't exist.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| AssetError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_copy_tree() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();

        fs::create_dir_all(source.path().join("images/icons")).unwrap();
        fs::write(source.path().join("images/logo.svg"), "<svg/>").unwrap();
        fs::write(source.path().join("images/icons/star.png"), [0x89, b'P']).unwrap();
        fs::write(source.path().join(".htaccess"), "Deny from none").unwrap();
        fs::create_dir_all(source.path().join("empty")).unwrap();

        let target = dest.path().join("assets");
        let count = copy_entry(source.path(), &target).unwrap();

        assert_eq!(count, 3);
        assert_eq!(
            fs::read_to_string(target.join("images/logo.svg")).unwrap(),
            "<svg/>"
        );
        assert_eq!(
            fs::read(target.join("images/icons/star.png")).unwrap(),
            vec![0x89, b'P']
        );
        assert!(target.join(".htaccess").exists());
        assert!(target.join("empty").is_dir());
    }

    #[test]
    fn test_copy_single_file() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();

        let file = source.path().join("habitat.conf.sample.js");
        fs::write(&file, "window.config = {};").unwrap();

        let target = dest.path().join("nested/habitat.conf.js");
        assert_eq!(copy_entry(&file, &target).unwrap(), 1);
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "window.config = {};"
        );
    }

    #[test]
    fn test_copy_empty_dir() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();

        let target = dest.path().join("fixtures");
        assert_eq!(copy_entry(source.path(), &target).unwrap(), 0);
        assert!(target.is_dir());
    }

    #[test]
    fn test_copy_targets_match_copied_files() {
        let source = TempDir::new().unwrap();
        fs::create_dir_all(source.path().join("images")).unwrap();
        fs::create_dir_all(source.path().join("empty")).unwrap();
        fs::write(source.path().join("images/logo.svg"), "<svg/>").unwrap();
        fs::write(source.path().join("index.html"), "<p>static</p>").unwrap();

        let targets = copy_targets(source.path()).unwrap();
        assert_eq!(
            targets,
            vec![PathBuf::from("images/logo.svg"), PathBuf::from("index.html")]
        );

        let file = source.path().join("index.html");
        assert_eq!(copy_targets(&file).unwrap(), vec![PathBuf::new()]);
        assert!(matches!(
            copy_targets(&source.path().join("nope")),
            Err(AssetError::NotFound(_))
        ));
    }

    #[test]
    fn test_copy_missing_source() {
        let dest = TempDir::new().unwrap();
        let err = copy_entry(&dest.path().join("nope"), &dest.path().join("out")).unwrap_err();
        assert!(matches!(err, AssetError::NotFound(_)));
    }

    #[test]
    fn test_clean_dir_removes_stale_files() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("dist");
        fs::create_dir_all(out.join("old")).unwrap();
        fs::write(out.join("app-stale.css"), "old").unwrap();

        clean_dir(&out).unwrap();

        assert!(out.is_dir());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn test_write_and_read_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/c.txt");

        write_file(&path, b"hello").unwrap();
        assert_eq!(read_file(&path).unwrap(), b"hello");
    }

    #[test]
    fn test_read_missing_file_names_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.css");
        let err = read_file(&path).unwrap_err();
        assert!(err.to_string().contains("app.css"));
    }

    #[test]
    fn test_ensure_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b/c");

        assert!(!nested.exists());
        ensure_dir(&nested).unwrap();
        assert!(nested.exists());
    }
}

//! Static asset copying.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::builder::BuildError;

/// Destination of the static directory inside the output directory.
///
/// The directory keeps the stem of its own name (`assets` stays `assets`,
/// `static.v2` becomes `static`).
pub fn static_destination(source: &Path, output_dir: &Path) -> Result<PathBuf, BuildError> {
    let stem = match source.file_stem() {
        Some(stem) => stem.to_os_string(),
        None => {
            // `.` and `..` have no name of their own
            let canonical = source.canonicalize().map_err(|e| fs_error(source, e))?;
            canonical
                .file_stem()
                .map(|s| s.to_os_string())
                .ok_or_else(|| BuildError::Filesystem {
                    path: source.display().to_string(),
                    message: "static directory has no name".to_string(),
                })?
        }
    };

    Ok(output_dir.join(stem))
}

/// Copy the static directory into the output directory.
///
/// Existing files are overwritten and files only present at the destination
/// are left alone. Returns the number of files copied.
pub fn copy_static(source: &Path, output_dir: &Path) -> Result<usize, BuildError> {
    let destination = static_destination(source, output_dir)?;
    copy_tree(source, &destination)
}

/// Recursively merge `source` into `destination`.
pub fn copy_tree(source: &Path, destination: &Path) -> Result<usize, BuildError> {
    let mut copied = 0;

    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry.map_err(|e| BuildError::Filesystem {
            path: e.path().unwrap_or(source).display().to_string(),
            message: e.to_string(),
        })?;

        let relative = entry.path().strip_prefix(source).unwrap_or(entry.path());
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| fs_error(&target, e))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| fs_error(parent, e))?;
        }

        fs::copy(entry.path(), &target).map_err(|e| fs_error(&target, e))?;
        tracing::debug!("Copied {}", relative.display());
        copied += 1;
    }

    Ok(copied)
}

fn fs_error(path: &Path, err: std::io::Error) -> BuildError {
    BuildError::Filesystem {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

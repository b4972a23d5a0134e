//! Recursive file discovery relative to a base directory.

use crate::fs::FileSystem;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A discovered file: its absolute location plus its path relative to the
/// directory that was walked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub absolute_path: PathBuf,
    pub relative_path: PathBuf,
}

impl FileRef {
    /// Relative path with `/` separators, as used in URLs and generated code
    pub fn relative_url_path(&self) -> String {
        to_slash(&self.relative_path)
    }
}

/// Join path components with `/` regardless of the host separator.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Every file below `dir`, sorted by relative path.
///
/// A missing directory yields nothing: public and static directories are
/// optional inputs.
pub fn walk(fs: &dyn FileSystem, dir: &Path) -> Vec<FileRef> {
    if !fs.is_dir(dir) {
        debug!(dir = %dir.display(), "Directory absent, nothing to walk");
        return Vec::new();
    }

    let files = match fs.walk_files(dir) {
        Ok(files) => files,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Failed to walk directory");
            return Vec::new();
        }
    };

    let mut refs: Vec<FileRef> = files
        .into_iter()
        .filter_map(|absolute_path| {
            let relative_path = absolute_path.strip_prefix(dir).ok()?.to_path_buf();
            Some(FileRef {
                absolute_path,
                relative_path,
            })
        })
        .collect();

    refs.sort_by(|a, b| a.relative_url_path().cmp(&b.relative_url_path()));
    refs
}

//! Finds the directory inside a standalone build that actually holds the
//! server entry.
//!
//! Flat builds put `server.js` at the standalone root. Monorepo builds mirror
//! the workspace layout, so the entry sits at e.g. `apps/web/server.js` or
//! deeper.

use crate::error::PackError;
use crate::fs::FileSystem;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const SERVER_MARKER: &str = "server.js";
pub const INSTALL_DIR: &str = "node_modules";

/// Resolve the server root under `standalone_root`.
pub fn locate_server_root(fs: &dyn FileSystem, standalone_root: &Path) -> Result<PathBuf, PackError> {
    if !fs.is_dir(standalone_root) {
        return Err(PackError::StandaloneNotFound(standalone_root.to_path_buf()));
    }

    if fs.is_file(&standalone_root.join(SERVER_MARKER)) {
        debug!(server_root = %standalone_root.display(), "Flat standalone layout");
        return Ok(standalone_root.to_path_buf());
    }

    match search(fs, standalone_root) {
        Some(server_root) => {
            info!(
                server_root = %server_root.display(),
                nested = %server_root.strip_prefix(standalone_root).unwrap_or(&server_root).display(),
                "Found nested server root"
            );
            Ok(server_root)
        }
        None => Err(PackError::ServerNotFound {
            standalone_dir: standalone_root.to_path_buf(),
        }),
    }
}

/// Depth-first, children in name order, never entering `node_modules`.
fn search(fs: &dyn FileSystem, dir: &Path) -> Option<PathBuf> {
    let mut children: Vec<_> = fs
        .read_dir(dir)
        .ok()?
        .into_iter()
        .filter(|e| e.is_dir() && e.file_name() != INSTALL_DIR)
        .collect();
    children.sort_by(|a, b| a.name.cmp(&b.name));

    for child in children {
        if fs.is_file(&child.path.join(SERVER_MARKER)) {
            return Some(child.path);
        }
        if let Some(found) = search(fs, &child.path) {
            return Some(found);
        }
    }

    None
}

//! Where a package manager may have put a given package.
//!
//! npm and yarn install straight into `node_modules/<pkg>`. pnpm and bun's
//! isolated linker keep the real copy in a content store
//! (`node_modules/.pnpm/<flat>@<version>/node_modules/<pkg>`), where `<flat>`
//! is the package name with the scope separator replaced by `+`. The standalone
//! output traces files from wherever they were, so any of these may exist.

use crate::fs::FileSystem;
use crate::locator::INSTALL_DIR;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Store directories under `node_modules` that use the `<flat>@<version>` layout.
pub const ALIAS_STORES: &[&str] = &[".pnpm", ".bun"];

/// `@scope/name` becomes `@scope+name`; unscoped names are unchanged.
pub fn flatten_package_name(package: &str) -> String {
    package.replace('/', "+")
}

/// The default location used when a package is not installed anywhere.
pub fn canonical_location(root: &Path, package: &str) -> PathBuf {
    root.join(INSTALL_DIR).join(package)
}

/// Every existing install directory of `package` under `root`, direct install
/// first, then store entries in name order.
pub fn resolve_install_locations(fs: &dyn FileSystem, root: &Path, package: &str) -> Vec<PathBuf> {
    let mut locations = Vec::new();

    let direct = canonical_location(root, package);
    if fs.is_dir(&direct) {
        locations.push(direct);
    }

    let prefix = format!("{}@", flatten_package_name(package));
    for store in ALIAS_STORES {
        let store_dir = root.join(INSTALL_DIR).join(store);
        let Ok(entries) = fs.read_dir(&store_dir) else {
            continue;
        };

        let mut names: Vec<String> = entries
            .into_iter()
            .filter(|e| e.is_dir() && e.file_name().starts_with(&prefix))
            .map(|e| e.name)
            .collect();
        names.sort();

        for name in names {
            let candidate = store_dir.join(&name).join(INSTALL_DIR).join(package);
            if fs.is_dir(&candidate) {
                locations.push(candidate);
            }
        }
    }

    debug!(package, count = locations.len(), "Resolved install locations");
    locations
}

/// Like [`resolve_install_locations`], but never empty: falls back to the
/// canonical location so callers can still create files there.
pub fn install_locations_or_default(fs: &dyn FileSystem, root: &Path, package: &str) -> Vec<PathBuf> {
    let locations = resolve_install_locations(fs, root, package);
    if locations.is_empty() {
        vec![canonical_location(root, package)]
    } else {
        locations
    }
}

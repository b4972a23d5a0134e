//! The embed set: every file that goes into the binary, keyed by URL path.

use crate::walker::FileRef;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use tracing::warn;

/// URL prefix for shared static assets (`<distDir>/static`).
pub const STATIC_PREFIX: &str = "/_next/static/";
/// URL prefix for server-root runtime files.
pub const RUNTIME_PREFIX: &str = "/__bunpack/";
/// Mirror of traced `node_modules` files, relative to the server root.
pub const EXTERNAL_DIR: &str = ".next/__external";

const IDENTIFIER_TAIL: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Static,
    Public,
    Runtime,
}

impl AssetKind {
    /// URL path for a file relative to this kind's source directory.
    pub fn url_for(self, relative: &str) -> String {
        match self {
            AssetKind::Static => format!("{}{}", STATIC_PREFIX, relative),
            AssetKind::Public => format!("/{}", relative),
            AssetKind::Runtime => format!("{}{}", RUNTIME_PREFIX, relative),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry {
    pub file: FileRef,
    pub url_path: String,
    pub kind: AssetKind,
}

impl AssetEntry {
    /// `relative` is the path the URL is built from; for runtime files it is
    /// relative to the server root rather than to the walked directory.
    pub fn new(file: FileRef, kind: AssetKind, relative: &str) -> Self {
        Self {
            url_path: kind.url_for(relative),
            file,
            kind,
        }
    }

    pub fn disk_path(&self) -> String {
        disk_path_for(&self.url_path)
    }

    pub fn identifier(&self) -> String {
        asset_identifier(&self.url_path)
    }
}

/// Where a URL path is materialised at runtime, relative to the executable's
/// directory.
pub fn disk_path_for(url_path: &str) -> String {
    if let Some(rest) = url_path.strip_prefix(RUNTIME_PREFIX) {
        let external = format!("{}/", EXTERNAL_DIR);
        match rest.strip_prefix(&external) {
            Some(module) => format!("node_modules/{}", module),
            None => rest.to_string(),
        }
    } else if let Some(rest) = url_path.strip_prefix(STATIC_PREFIX) {
        format!(".next/static/{}", rest)
    } else {
        format!("public/{}", url_path.trim_start_matches('/'))
    }
}

/// Readable, collision-safe JS identifier for a URL path.
pub fn asset_identifier(url_path: &str) -> String {
    let digest = hex::encode(Sha256::digest(url_path.as_bytes()));
    let sanitized: String = url_path
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let sanitized = sanitized.trim_matches('_');

    let chars: Vec<char> = sanitized.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(IDENTIFIER_TAIL)..]
        .iter()
        .collect();

    format!("asset_{}_{}", &digest[..8], tail)
}

/// Ordered embed set with unique URL paths.
#[derive(Debug, Default)]
pub struct AssetManifest {
    entries: Vec<AssetEntry>,
    urls: HashSet<String>,
    duplicates: usize,
}

impl AssetManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry unless its URL is already taken. The first registration
    /// wins.
    pub fn insert(&mut self, entry: AssetEntry) -> bool {
        if self.urls.contains(&entry.url_path) {
            warn!(
                url = %entry.url_path,
                path = %entry.file.absolute_path.display(),
                "Duplicate asset URL, keeping the first file"
            );
            self.duplicates += 1;
            return false;
        }

        self.urls.insert(entry.url_path.clone());
        self.entries.push(entry);
        true
    }

    pub fn extend_files(&mut self, kind: AssetKind, files: Vec<FileRef>) {
        for file in files {
            let relative = file.relative_url_path();
            self.insert(AssetEntry::new(file, kind, &relative));
        }
    }

    pub fn entries(&self) -> &[AssetEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn count(&self, kind: AssetKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use yare::parameterized;

    fn file(rel: &str) -> FileRef {
        FileRef {
            absolute_path: PathBuf::from("/src").join(rel),
            relative_path: PathBuf::from(rel),
        }
    }

    #[parameterized(
        runtime = { "/__bunpack/.next/BUILD_ID", ".next/BUILD_ID" },
        runtime_chunk = { "/__bunpack/.next/server/chunks/1.js", ".next/server/chunks/1.js" },
        external = { "/__bunpack/.next/__external/next/dist/a.js", "node_modules/next/dist/a.js" },
        static_asset = { "/_next/static/chunks/main.js", ".next/static/chunks/main.js" },
        public = { "/images/logo.svg", "public/images/logo.svg" },
    )]
    fn test_disk_path_for(url: &str, expected: &str) {
        assert_eq!(disk_path_for(url), expected);
    }

    #[test]
    fn test_url_for_kinds() {
        assert_eq!(AssetKind::Static.url_for("css/a.css"), "/_next/static/css/a.css");
        assert_eq!(AssetKind::Public.url_for("robots.txt"), "/robots.txt");
        assert_eq!(AssetKind::Runtime.url_for(".next/BUILD_ID"), "/__bunpack/.next/BUILD_ID");
    }

    #[test]
    fn test_identifier_shape() {
        let id = asset_identifier("/_next/static/chunks/main-abc.js");
        assert!(id.starts_with("asset_"));
        assert!(id.ends_with("_next_static_chunks_main_abc_js"));
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    }

    #[test]
    fn test_identifier_truncates_long_paths() {
        let long = format!("/{}/file.js", "segment".repeat(20));
        let id = asset_identifier(&long);
        assert_eq!(id.len(), "asset_".len() + 8 + 1 + IDENTIFIER_TAIL);
        assert!(id.ends_with("file_js"));
    }

    #[test]
    fn test_identifier_distinguishes_paths_that_sanitize_alike() {
        let a = asset_identifier("/a-b.js");
        let b = asset_identifier("/a_b.js");
        assert_ne!(a, b);
    }

    #[test]
    fn test_identifier_with_non_ascii_path() {
        let id = asset_identifier("/fonts/ünïcode ✓.woff2");
        assert!(id.is_ascii());
    }

    #[test]
    fn test_first_registration_wins() {
        let mut manifest = AssetManifest::new();
        manifest.extend_files(AssetKind::Public, vec![file("robots.txt")]);
        let dup = AssetEntry::new(file("other/robots.txt"), AssetKind::Public, "robots.txt");

        assert!(!manifest.insert(dup));
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.duplicates(), 1);
        assert_eq!(
            manifest.entries()[0].file.absolute_path,
            PathBuf::from("/src/robots.txt")
        );
    }

    #[test]
    fn test_count_by_kind() {
        let mut manifest = AssetManifest::new();
        manifest.extend_files(AssetKind::Static, vec![file("a.js"), file("b.js")]);
        manifest.extend_files(AssetKind::Public, vec![file("c.png")]);

        assert_eq!(manifest.count(AssetKind::Static), 2);
        assert_eq!(manifest.count(AssetKind::Public), 1);
        assert_eq!(manifest.count(AssetKind::Runtime), 0);
    }
}

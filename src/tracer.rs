//! Traces `next/dist/*` files that server chunks `require` at runtime.
//!
//! Webpack leaves some requires of Next internals as plain runtime calls, so
//! neither the standalone file trace nor Bun's bundler sees them. Starting from
//! the literal specifiers in `.next/server/chunks`, this walks the require
//! graph inside `node_modules` and returns every file reached.

use crate::fs::FileSystem;
use crate::locator::INSTALL_DIR;
use crate::walker::walk;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};

/// Only specifiers under this prefix are traced.
pub const TRACE_NAMESPACE: &str = "next/dist/";
/// Package that owns [`TRACE_NAMESPACE`].
pub const NAMESPACE_PACKAGE: &str = "next";
/// Server chunks, relative to the server root.
pub const CHUNKS_DIR: &str = ".next/server/chunks";

const RESOLVED_EXTENSIONS: &[&str] = &[".js", ".json", ".cjs", ".mjs"];

fn require_regex() -> &'static Regex {
    static REQUIRE_REGEX: OnceLock<Regex> = OnceLock::new();
    REQUIRE_REGEX.get_or_init(|| {
        Regex::new(r#"require\(\s*["']([^"'\s]+)["']\s*\)"#).expect("Invalid require regex")
    })
}

/// Every `require("...")` argument in `source`, in order of appearance.
pub fn require_calls(source: &str) -> impl Iterator<Item = &str> {
    require_regex()
        .captures_iter(source)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
}

/// Append `.js` unless the specifier already names a loadable file type.
pub fn with_js_suffix(specifier: &str) -> String {
    if RESOLVED_EXTENSIONS.iter().any(|ext| specifier.ends_with(ext)) {
        specifier.to_string()
    } else {
        format!("{}.js", specifier)
    }
}

/// Resolve `relative` (`./x`, `../x`) against the directory of `from`, both
/// expressed as `node_modules`-relative specifiers. `None` if the result would
/// leave `node_modules`.
pub fn join_relative(from: &str, relative: &str) -> Option<String> {
    let mut segments: Vec<&str> = from.split('/').collect();
    segments.pop();

    for part in relative.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

/// Static require-graph walker rooted at a `node_modules` directory.
pub struct ExternalModuleTracer<'a> {
    fs: &'a dyn FileSystem,
    modules_root: PathBuf,
}

impl<'a> ExternalModuleTracer<'a> {
    pub fn new(fs: &'a dyn FileSystem, standalone_root: &Path) -> Self {
        Self {
            fs,
            modules_root: standalone_root.join(INSTALL_DIR),
        }
    }

    pub fn modules_root(&self) -> &Path {
        &self.modules_root
    }

    /// Namespaced specifiers required by any file under `chunks_dir`.
    pub fn seeds(&self, chunks_dir: &Path) -> BTreeSet<String> {
        let mut seeds = BTreeSet::new();

        for file in walk(self.fs, chunks_dir) {
            let Ok(source) = self.fs.read_to_string(&file.absolute_path) else {
                continue;
            };
            seeds.extend(
                require_calls(&source)
                    .filter(|s| s.starts_with(TRACE_NAMESPACE))
                    .map(str::to_string),
            );
        }

        debug!(count = seeds.len(), dir = %chunks_dir.display(), "Collected trace seeds");
        seeds
    }

    /// Concrete file keys a specifier may stand for. A directory expands to its
    /// manifest followed by its `index.js`.
    fn candidates(&self, specifier: &str) -> Vec<String> {
        let specifier = specifier.trim_end_matches('/');

        if RESOLVED_EXTENSIONS.iter().any(|ext| specifier.ends_with(ext)) {
            return vec![specifier.to_string()];
        }

        let as_file = with_js_suffix(specifier);
        if self.fs.is_file(&self.modules_root.join(&as_file)) {
            return vec![as_file];
        }

        if self.fs.is_dir(&self.modules_root.join(specifier)) {
            return vec![
                format!("{}/package.json", specifier),
                format!("{}/index.js", specifier),
            ];
        }

        vec![as_file]
    }

    /// Specifiers to follow from a file: relative requires resolved against
    /// it, and namespaced requires as written. Everything else is left to the
    /// bundler or the runtime.
    fn dependencies(&self, key: &str, source: &str) -> Vec<String> {
        require_calls(source)
            .filter_map(|request| {
                if request.starts_with("./") || request.starts_with("../") {
                    join_relative(key, request)
                } else if request.starts_with(TRACE_NAMESPACE) {
                    Some(request.to_string())
                } else {
                    None
                }
            })
            .collect()
    }

    /// Transitive closure of `seeds`. Missing files are dropped; cycles end at
    /// the visited check.
    pub fn closure(&self, seeds: impl IntoIterator<Item = String>) -> BTreeSet<String> {
        let mut visited = BTreeSet::new();
        let mut pending: Vec<String> = seeds.into_iter().collect();

        while let Some(specifier) = pending.pop() {
            for key in self.candidates(&specifier) {
                if visited.contains(&key) {
                    continue;
                }

                let path = self.modules_root.join(&key);
                if !self.fs.is_file(&path) {
                    debug!(module = %key, "Traced module not on disk, skipping");
                    continue;
                }
                visited.insert(key.clone());

                if key.ends_with(".json") {
                    continue;
                }
                match self.fs.read_to_string(&path) {
                    Ok(source) => pending.extend(self.dependencies(&key, &source)),
                    Err(e) => debug!(module = %key, error = %e, "Could not read traced module"),
                }
            }
        }

        visited
    }
}

/// Seeds from the server root's chunks, closed over the standalone root's
/// `node_modules`.
pub fn trace_external_modules(
    fs: &dyn FileSystem,
    standalone_root: &Path,
    server_root: &Path,
) -> BTreeSet<String> {
    let tracer = ExternalModuleTracer::new(fs, standalone_root);
    let seeds = tracer.seeds(&server_root.join(CHUNKS_DIR));
    if seeds.is_empty() {
        return BTreeSet::new();
    }

    let closure = tracer.closure(seeds);
    info!(count = closure.len(), "Traced external modules");
    closure
}

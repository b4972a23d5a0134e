//! Turns a standalone Next build into the two files Bun compiles: the asset
//! registry and the bootstrap entry point.

pub mod bootstrap;
pub mod manifest;
pub mod registry;

pub use bootstrap::{extract_config, render_bootstrap, BOOTSTRAP_FILE};
pub use manifest::{AssetEntry, AssetKind, AssetManifest, EXTERNAL_DIR};
pub use registry::{render_registry, REGISTRY_FILE};

use crate::context::BuildContext;
use crate::error::PackError;
use crate::fs::FileSystem;
use crate::locator::{locate_server_root, INSTALL_DIR, SERVER_MARKER};
use crate::patch::patch_require_resolution;
use crate::stubs::synthesize_stubs;
use crate::tracer::{trace_external_modules, NAMESPACE_PACKAGE};
use crate::walker::walk;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Build metadata directory, relative to the server root and the project.
pub const META_DIR: &str = ".next";
/// Directories under the server root's metadata directory never embedded.
const RUNTIME_EXCLUDES: &[&str] = &["cache"];

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub standalone_dir: PathBuf,
    pub dist_dir: PathBuf,
    pub project_dir: PathBuf,
}

impl GenerateRequest {
    /// Conventional layout: `<project>/.next` with `standalone/` inside it.
    pub fn for_project(project_dir: PathBuf, dist_dir: Option<PathBuf>) -> Self {
        let dist_dir = dist_dir.unwrap_or_else(|| project_dir.join(META_DIR));
        Self {
            standalone_dir: dist_dir.join("standalone"),
            dist_dir,
            project_dir,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub standalone_root: PathBuf,
    pub server_root: PathBuf,
    pub static_assets: usize,
    pub public_assets: usize,
    pub runtime_assets: usize,
    pub external_modules: usize,
    pub skipped_static: usize,
    pub duplicate_urls: usize,
    pub stubs_written: usize,
    pub patches_applied: usize,
    pub registry_file: PathBuf,
    pub bootstrap_file: PathBuf,
}

impl GenerationReport {
    pub fn total_assets(&self) -> usize {
        self.static_assets + self.public_assets + self.runtime_assets
    }
}

fn is_excluded_runtime_file(relative: &Path) -> bool {
    let mut components = relative.components();
    let first = components.next().and_then(|c| c.as_os_str().to_str());
    components.next().is_some() && first.is_some_and(|dir| RUNTIME_EXCLUDES.contains(&dir))
}

/// Copy the traced closure, plus the namespace package's manifest, from
/// `node_modules` into the server root's external mirror. Returns the copied
/// specifiers.
pub fn mirror_external_modules(
    fs: &dyn FileSystem,
    standalone_root: &Path,
    server_root: &Path,
    closure: &BTreeSet<String>,
) -> Result<Vec<String>, PackError> {
    let modules_root = standalone_root.join(INSTALL_DIR);
    let mirror_root = server_root.join(EXTERNAL_DIR);

    let mut specifiers: Vec<String> = closure.iter().cloned().collect();
    let root_manifest = format!("{}/package.json", NAMESPACE_PACKAGE);
    if !closure.is_empty()
        && !closure.contains(&root_manifest)
        && fs.is_file(&modules_root.join(&root_manifest))
    {
        specifiers.push(root_manifest);
    }

    for specifier in &specifiers {
        let to = mirror_root.join(specifier);
        fs.copy(&modules_root.join(specifier), &to)
            .map_err(|e| PackError::filesystem(&to, e))?;
    }

    debug!(count = specifiers.len(), mirror = %mirror_root.display(), "Mirrored external modules");
    Ok(specifiers)
}

/// Runs the whole generation pipeline and writes the registry and bootstrap
/// into the server root.
pub fn generate(fs: &dyn FileSystem, request: &GenerateRequest) -> Result<GenerationReport, PackError> {
    let start = Instant::now();
    let standalone_root = request.standalone_dir.as_path();

    let server_root = locate_server_root(fs, standalone_root)?;

    // Validate the config before touching the tree so a format mismatch leaves
    // nothing behind.
    let server_file = server_root.join(SERVER_MARKER);
    let server_source = fs
        .read_to_string(&server_file)
        .map_err(|_| PackError::ConfigExtractionFailed {
            server_file: server_file.clone(),
        })?;
    let config_literal = extract_config(&server_source).ok_or_else(|| PackError::ConfigExtractionFailed {
        server_file: server_file.clone(),
    })?;

    let stubs_written = synthesize_stubs(fs, standalone_root);
    let patches_applied = patch_require_resolution(fs, standalone_root);

    // The mirror lives under the runtime directory, so it must exist before
    // that directory is walked.
    let closure = trace_external_modules(fs, standalone_root, &server_root);
    let external = mirror_external_modules(fs, standalone_root, &server_root, &closure)?;

    let context = BuildContext::load(fs, &request.dist_dir);
    let static_files = walk(fs, &request.dist_dir.join("static"));
    let public_files = walk(fs, &request.project_dir.join("public"));
    let runtime_files: Vec<_> = walk(fs, &server_root.join(META_DIR))
        .into_iter()
        .filter(|f| !is_excluded_runtime_file(&f.relative_path))
        .collect();

    let mut manifest = AssetManifest::new();
    let skipped_static = match context.as_ref().and_then(|c| c.cdn_prefix()) {
        Some(prefix) => {
            info!(
                count = static_files.len(),
                asset_prefix = prefix,
                "Skipping static assets served from CDN"
            );
            static_files.len()
        }
        None => {
            manifest.extend_files(AssetKind::Static, static_files);
            0
        }
    };
    manifest.extend_files(AssetKind::Public, public_files);
    for file in runtime_files {
        let relative = format!("{}/{}", META_DIR, file.relative_url_path());
        manifest.insert(AssetEntry::new(file, AssetKind::Runtime, &relative));
    }

    let registry_file = server_root.join(REGISTRY_FILE);
    fs.write(&registry_file, &render_registry(&manifest, &server_root))
        .map_err(|e| PackError::filesystem(&registry_file, e))?;

    let bootstrap_file = server_root.join(BOOTSTRAP_FILE);
    fs.write(&bootstrap_file, &render_bootstrap(config_literal, &manifest))
        .map_err(|e| PackError::filesystem(&bootstrap_file, e))?;

    let report = GenerationReport {
        standalone_root: standalone_root.to_path_buf(),
        static_assets: manifest.count(AssetKind::Static),
        public_assets: manifest.count(AssetKind::Public),
        runtime_assets: manifest.count(AssetKind::Runtime),
        external_modules: external.len(),
        skipped_static,
        duplicate_urls: manifest.duplicates(),
        stubs_written,
        patches_applied,
        registry_file,
        bootstrap_file,
        server_root,
    };

    info!(
        server_root = %report.server_root.display(),
        assets = report.total_assets(),
        external_modules = report.external_modules,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Generated embed manifest and bootstrap"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    const SERVER_JS: &str = "const nextConfig = {\"env\":{}}\nrequire('next')\n";

    fn flat_project() -> MockFileSystem {
        let fs = MockFileSystem::with_root(PathBuf::from("/app"));
        fs.add_file(".next/standalone/server.js", SERVER_JS);
        fs.add_file(".next/standalone/.next/BUILD_ID", "build-1");
        fs.add_file(".next/standalone/.next/cache/fetch/x", "cached");
        fs.add_file(".next/static/chunks/main.js", "main");
        fs.add_file("public/favicon.ico", "ico");
        fs
    }

    fn request() -> GenerateRequest {
        GenerateRequest::for_project(PathBuf::from("/app"), None)
    }

    #[test]
    fn test_for_project_layout() {
        let request = request();
        assert_eq!(request.dist_dir, PathBuf::from("/app/.next"));
        assert_eq!(request.standalone_dir, PathBuf::from("/app/.next/standalone"));
    }

    #[test]
    fn test_generate_flat() {
        let fs = flat_project();
        let report = generate(&fs, &request()).unwrap();

        assert_eq!(report.server_root, PathBuf::from("/app/.next/standalone"));
        assert_eq!(report.static_assets, 1);
        assert_eq!(report.public_assets, 1);
        assert_eq!(report.runtime_assets, 1);

        let registry = fs.content(&report.registry_file).unwrap();
        assert!(registry.contains("\"/_next/static/chunks/main.js\""));
        assert!(registry.contains("\"/favicon.ico\""));
        assert!(registry.contains("\"/__bunpack/.next/BUILD_ID\""));
        assert!(!registry.contains("cache/fetch"));

        let bootstrap = fs.content(&report.bootstrap_file).unwrap();
        assert!(bootstrap.contains("{\"env\":{}}"));
        assert!(bootstrap.contains("import { assets } from \"./assets.generated.js\";"));
    }

    #[test]
    fn test_config_missing_writes_nothing() {
        let fs = MockFileSystem::with_root(PathBuf::from("/app"));
        fs.add_file(".next/standalone/server.js", "require('next')");

        let err = generate(&fs, &request()).unwrap_err();
        assert!(matches!(err, PackError::ConfigExtractionFailed { .. }));
        assert!(!fs.exists(Path::new("/app/.next/standalone/server-entry.js")));
        assert!(!fs.exists(Path::new("/app/.next/standalone/assets.generated.js")));
        assert!(!fs.exists(Path::new("/app/.next/standalone/node_modules")));
    }

    #[test]
    fn test_cdn_prefix_skips_static() {
        let fs = flat_project();
        fs.add_file(
            ".next/bun-compile-ctx.json",
            r#"{"distDir":"/app/.next","projectDir":"/app","assetPrefix":"https://cdn.example.com"}"#,
        );

        let report = generate(&fs, &request()).unwrap();
        assert_eq!(report.static_assets, 0);
        assert_eq!(report.skipped_static, 1);
        assert_eq!(report.public_assets, 1);

        let registry = fs.content(&report.registry_file).unwrap();
        assert!(!registry.contains("/_next/static/"));
    }

    #[test]
    fn test_mirror_includes_namespace_manifest() {
        let fs = MockFileSystem::with_root(PathBuf::from("/s"));
        fs.add_file("node_modules/next/package.json", "{}");
        fs.add_file("node_modules/next/dist/a.js", "a");

        let closure: BTreeSet<String> = ["next/dist/a.js".to_string()].into_iter().collect();
        let copied =
            mirror_external_modules(&fs, Path::new("/s"), Path::new("/s/apps/web"), &closure).unwrap();

        assert_eq!(copied, vec!["next/dist/a.js", "next/package.json"]);
        assert_eq!(
            fs.content("/s/apps/web/.next/__external/next/dist/a.js").as_deref(),
            Some("a")
        );
        assert!(fs.is_file(Path::new("/s/apps/web/.next/__external/next/package.json")));
        assert!(!fs.exists(Path::new("/s/.next/__external")));
    }

    #[test]
    fn test_empty_closure_mirrors_nothing() {
        let fs = MockFileSystem::with_root(PathBuf::from("/s"));
        fs.add_file("node_modules/next/package.json", "{}");

        let copied =
            mirror_external_modules(&fs, Path::new("/s"), Path::new("/s"), &BTreeSet::new()).unwrap();
        assert!(copied.is_empty());
    }
}

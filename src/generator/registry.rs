//! `assets.generated.js`: one file-embedding import per asset and the
//! URL → handle map the bootstrap reads from.

use super::manifest::AssetManifest;
use crate::walker::to_slash;
use std::fmt::Write;
use std::path::{Component, Path, PathBuf};

pub const REGISTRY_FILE: &str = "assets.generated.js";
pub const REGISTRY_EXPORT: &str = "assets";

pub(crate) const GENERATED_HEADER: &str = "// Generated by bunpack. Do not edit.\n";

/// `target` as an ES module specifier relative to `base_dir` (`./x`, `../x`).
pub fn relative_import(base_dir: &Path, target: &Path) -> String {
    let base: Vec<Component> = base_dir.components().collect();
    let target: Vec<Component> = target.components().collect();

    let common = base
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base.len() {
        relative.push("..");
    }
    for component in &target[common..] {
        relative.push(component.as_os_str());
    }

    let relative = to_slash(&relative);
    if relative.starts_with("../") {
        relative
    } else {
        format!("./{}", relative)
    }
}

/// JSON string literal, which is also a valid JS string literal.
pub(crate) fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

pub fn render_registry(manifest: &AssetManifest, server_root: &Path) -> String {
    let mut out = String::from(GENERATED_HEADER);

    for entry in manifest.entries() {
        let specifier = relative_import(server_root, &entry.file.absolute_path);
        let _ = writeln!(
            out,
            "import {} from {} with {{ type: \"file\" }};",
            entry.identifier(),
            js_string(&specifier)
        );
    }

    let _ = writeln!(out, "\nexport const {} = {{", REGISTRY_EXPORT);
    for entry in manifest.entries() {
        let _ = writeln!(out, "  {}: {},", js_string(&entry.url_path), entry.identifier());
    }
    out.push_str("};\n");

    out
}

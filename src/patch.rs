//! Version-guarded text patches for installed host-framework files.
//!
//! Next's require hook resolves a handful of packages eagerly at startup.
//! Inside a compiled binary there is no dependency tree to resolve against,
//! so the lookup throws before the server ever listens. The patch wraps the
//! resolver so a failed lookup yields `""` instead.

use crate::fs::FileSystem;
use crate::install::resolve_install_locations;
use anyhow::Result;
use std::path::Path;
use tracing::{debug, info};

pub const HOST_PACKAGE: &str = "next";
pub const REQUIRE_HOOK_PATH: &str = "dist/server/require-hook.js";

pub const REQUIRE_HOOK_FRAGMENT: &str =
    "const resolve = process.env.NEXT_MINIMAL ? __non_webpack_require__.resolve : require.resolve;";

pub const REQUIRE_HOOK_REPLACEMENT: &str = "const __bunpackResolve = process.env.NEXT_MINIMAL ? __non_webpack_require__.resolve : require.resolve;\nconst resolve = (request, options) => {\n  try {\n    return __bunpackResolve(request, options);\n  } catch {\n    return \"\";\n  }\n};";

/// Replace `known_fragment` with `replacement` in `path` if the fragment is
/// present. Returns whether the file was rewritten.
pub fn apply_known_patch(
    fs: &dyn FileSystem,
    path: &Path,
    known_fragment: &str,
    replacement: &str,
) -> Result<bool> {
    let content = fs.read_to_string(path)?;
    if !content.contains(known_fragment) {
        return Ok(false);
    }

    let patched = content.replacen(known_fragment, replacement, 1);
    fs.write(path, &patched)?;
    Ok(true)
}

/// Make the require hook tolerate missing packages in every installed copy of
/// Next. Returns how many files were patched.
pub fn patch_require_resolution(fs: &dyn FileSystem, standalone_root: &Path) -> usize {
    let mut applied = 0;

    for location in resolve_install_locations(fs, standalone_root, HOST_PACKAGE) {
        let target = location.join(REQUIRE_HOOK_PATH);
        if !fs.is_file(&target) {
            continue;
        }

        match apply_known_patch(fs, &target, REQUIRE_HOOK_FRAGMENT, REQUIRE_HOOK_REPLACEMENT) {
            Ok(true) => {
                debug!(path = %target.display(), "Patched require hook");
                applied += 1;
            }
            Ok(false) => debug!(
                path = %target.display(),
                "Require hook fragment not found (already patched or unsupported Next version)"
            ),
            Err(e) => debug!(path = %target.display(), error = %e, "Could not patch require hook"),
        }
    }

    if applied > 0 {
        info!(count = applied, "Patched require hook");
    }
    applied
}

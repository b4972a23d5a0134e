//! Placeholder modules for code the compiled server references but never runs.
//!
//! The standalone trace leaves out dev-server modules and optional
//! dependencies because they sit behind runtime guards. Bun's compiler still
//! resolves every `require` it can see, so each one needs a file on disk.

use crate::fs::FileSystem;
use crate::install::install_locations_or_default;
use std::path::Path;
use tracing::{debug, info};

/// A module that must exist on disk but is never executed.
#[derive(Debug, Clone, Copy)]
pub struct ModuleStub {
    pub package: &'static str,
    pub subpath: &'static str,
    pub content: &'static str,
}

pub const MODULE_STUBS: &[ModuleStub] = &[
    ModuleStub {
        package: "next",
        subpath: "dist/server/dev/next-dev-server.js",
        content: "\"use strict\";\nmodule.exports = { default: class NextDevServer {} };\n",
    },
    ModuleStub {
        package: "next",
        subpath: "dist/server/lib/router-utils/setup-dev-bundler.js",
        content: "\"use strict\";\nmodule.exports = {\n  setupDevBundler() {\n    throw new Error(\"dev bundler is not available in a compiled server\");\n  },\n};\n",
    },
    ModuleStub {
        package: "next",
        subpath: "dist/server/dev/hot-reloader-webpack.js",
        content: "\"use strict\";\nmodule.exports = { default: class HotReloaderWebpack {} };\n",
    },
    ModuleStub {
        package: "critters",
        subpath: "index.js",
        content: "\"use strict\";\nmodule.exports = class Critters {\n  constructor() {}\n  process(html) {\n    return html;\n  }\n};\n",
    },
    ModuleStub {
        package: "@opentelemetry/api",
        subpath: "index.js",
        content: "\"use strict\";\nmodule.exports = {};\n",
    },
];

/// Write every stub in [`MODULE_STUBS`] that is missing. Returns how many
/// files were created.
pub fn synthesize_stubs(fs: &dyn FileSystem, standalone_root: &Path) -> usize {
    synthesize(fs, standalone_root, MODULE_STUBS)
}

pub(crate) fn synthesize(fs: &dyn FileSystem, standalone_root: &Path, stubs: &[ModuleStub]) -> usize {
    let mut written = 0;

    for stub in stubs {
        for location in install_locations_or_default(fs, standalone_root, stub.package) {
            let target = location.join(stub.subpath);
            if fs.exists(&target) {
                continue;
            }

            match fs.write(&target, stub.content) {
                Ok(()) => {
                    debug!(path = %target.display(), "Wrote module stub");
                    written += 1;
                }
                Err(e) => debug!(path = %target.display(), error = %e, "Skipped module stub"),
            }
        }
    }

    if written > 0 {
        info!(count = written, "Created module stubs");
    }
    written
}

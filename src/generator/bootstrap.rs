//! `server-entry.js`: the program the binary runs.
//!
//! It restores the Next config captured at build time, extracts any embedded
//! asset that is not already on disk next to the executable, and starts the
//! Next server with settings read once from the environment.

use super::manifest::AssetManifest;
use super::registry::{js_string, GENERATED_HEADER, REGISTRY_EXPORT, REGISTRY_FILE};
use std::fmt::Write;

pub const BOOTSTRAP_FILE: &str = "server-entry.js";

/// Marker preceding the serialized config in Next's standalone `server.js`.
pub const CONFIG_MARKER: &str = "const nextConfig = ";

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HOSTNAME: &str = "0.0.0.0";

/// The object literal assigned to `nextConfig` in a standalone server file.
pub fn extract_config(server_source: &str) -> Option<&str> {
    let start = server_source.find(CONFIG_MARKER)? + CONFIG_MARKER.len();
    let line = server_source[start..].lines().next()?.trim_end();
    let literal = line.strip_suffix(';').unwrap_or(line).trim();

    if literal.is_empty() {
        None
    } else {
        Some(literal)
    }
}

pub fn render_bootstrap(config_literal: &str, manifest: &AssetManifest) -> String {
    let mut out = String::from(GENERATED_HEADER);

    let _ = writeln!(
        out,
        "import {{ {} }} from {};",
        REGISTRY_EXPORT,
        js_string(&format!("./{}", REGISTRY_FILE))
    );
    out.push_str(
        r#"import { existsSync, mkdirSync } from "node:fs";
import path from "node:path";

const baseDir = path.dirname(process.execPath);
process.chdir(baseDir);
process.env.NODE_ENV = "production";

"#,
    );

    let _ = writeln!(out, "const nextConfig = {};", config_literal);
    out.push_str("process.env.__NEXT_PRIVATE_STANDALONE_CONFIG = JSON.stringify(nextConfig);\n\n");

    out.push_str("const extractionPaths = {\n");
    for entry in manifest.entries() {
        let _ = writeln!(
            out,
            "  {}: {},",
            js_string(&entry.url_path),
            js_string(&entry.disk_path())
        );
    }
    out.push_str("};\n\n");

    let _ = write!(
        out,
        r#"function readInteger(value) {{
  return typeof value === "string" && /^\d+$/.test(value) ? Number(value) : undefined;
}}

function readServerSettings(env) {{
  const port = readInteger(env.PORT);
  return Object.freeze({{
    port: port === undefined || port > {max_port} ? {port} : port,
    hostname: env.HOSTNAME || {hostname},
    keepAliveTimeout: readInteger(env.KEEP_ALIVE_TIMEOUT),
  }});
}}

async function extractAssets() {{
  for (const [url, diskPath] of Object.entries(extractionPaths)) {{
    const target = path.join(baseDir, diskPath);
    if (existsSync(target)) continue;
    mkdirSync(path.dirname(target), {{ recursive: true }});
    await Bun.write(target, Bun.file({export}[url]));
  }}
}}

async function main(settings) {{
  await extractAssets();
  const {{ startServer }} = require("next/dist/server/lib/start-server");
  await startServer({{
    dir: baseDir,
    isDev: false,
    config: nextConfig,
    hostname: settings.hostname,
    port: settings.port,
    allowRetry: false,
    keepAliveTimeout: settings.keepAliveTimeout,
  }});
}}

main(readServerSettings(process.env)).catch((err) => {{
  console.error("Failed to start server:", err);
  process.exit(1);
}});
"#,
        port = DEFAULT_PORT,
        max_port = u16::MAX,
        hostname = js_string(DEFAULT_HOSTNAME),
        export = REGISTRY_EXPORT,
    );

    out
}

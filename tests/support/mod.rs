//! Builds throwaway Next.js standalone trees on disk.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const SERVER_JS: &str = r#"const path = require('path')
const dir = path.join(__dirname)
process.env.NODE_ENV = 'production'
const nextConfig = {"env":{},"distDir":"./.next","output":"standalone"}
process.env.__NEXT_PRIVATE_STANDALONE_CONFIG = JSON.stringify(nextConfig)
require('next')
"#;

pub fn get_bunpack_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_bunpack"))
}

/// A project directory laid out like `next build` with standalone output.
pub struct NextProject {
    _dir: TempDir,
    root: PathBuf,
}

impl NextProject {
    pub fn empty() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let root = dir.path().canonicalize().expect("Failed to canonicalize temp dir");
        Self { _dir: dir, root }
    }

    /// Server at the root of the standalone tree.
    pub fn flat() -> Self {
        Self::with_app_dir("")
    }

    /// Server nested under `app_dir` inside the standalone tree, as in a
    /// workspace build.
    pub fn with_app_dir(app_dir: &str) -> Self {
        let project = Self::empty();
        let server_root = project.standalone().join(app_dir);

        project.write_abs(&server_root.join("server.js"), SERVER_JS);
        project.write_abs(&server_root.join(".next/BUILD_ID"), "build-1");
        project.write_abs(
            &server_root.join(".next/server/pages/index.html"),
            "<html></html>",
        );
        project.write_abs(&server_root.join(".next/cache/fetch-cache/abc"), "cached");
        project.write(".next/static/chunks/main-abc.js", "console.log('main')");
        project.write(".next/static/css/app.css", "body{}");
        project.write("public/favicon.ico", "ico");
        project.write("public/images/logo.svg", "<svg/>");
        project.write(".next/standalone/node_modules/next/package.json", r#"{"name":"next"}"#);
        project
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn standalone(&self) -> PathBuf {
        self.root.join(".next/standalone")
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.root.join(rel);
        self.write_abs(&path, content);
        path
    }

    fn write_abs(&self, path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(path, content).expect("Failed to write fixture file");
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.root.join(rel))
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", rel, e))
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.root.join(rel).exists()
    }

    /// A server chunk requiring a Next internal, and that internal's own
    /// relative and directory requires.
    pub fn add_traced_internals(&self, app_dir: &str) {
        let chunks = format!(".next/standalone/{}/.next/server/chunks", app_dir)
            .replace("//", "/");
        self.write(
            &format!("{}/123.js", chunks),
            r#"module.exports = () => require("next/dist/server/lib/trace/tracer")"#,
        );

        let next = ".next/standalone/node_modules/next";
        self.write(
            &format!("{}/dist/server/lib/trace/tracer.js", next),
            r#"const c = require("./constants"); const s = require("next/dist/shared/lib/utils");"#,
        );
        self.write(&format!("{}/dist/server/lib/trace/constants.js", next), "exports.A = 1;");
        self.write(&format!("{}/dist/shared/lib/utils/package.json", next), "{}");
        self.write(&format!("{}/dist/shared/lib/utils/index.js", next), "exports.u = 1;");
    }
}

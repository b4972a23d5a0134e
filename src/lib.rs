//! bunpack - package a Next.js standalone build as a single Bun executable
//!
//! Next's `output: "standalone"` mode produces a server tree that still needs
//! `node_modules`, the static output and the `public/` directory next to it.
//! bunpack closes that gap: it finds the server inside the standalone tree,
//! prepares the installed packages for bundling, traces the Next internals the
//! server loads at runtime, and writes two JavaScript files next to
//! `server.js`:
//!
//! - `assets.generated.js`, the registry mapping every served URL to an
//!   embedded file
//! - `server-entry.js`, the bootstrap that extracts those files beside the
//!   executable on first start and launches the Next server
//!
//! `bun build --compile` then turns the bootstrap into one binary.
//!
//! # Example Usage
//!
//! ```no_run
//! use bunpack::{generate, GenerateRequest, RealFileSystem};
//! use std::path::PathBuf;
//!
//! let request = GenerateRequest::for_project(PathBuf::from("/srv/site"), None);
//! let report = generate(&RealFileSystem, &request).expect("generation failed");
//! println!("embedded {} assets", report.total_assets());
//! ```
//!
//! # Project Structure
//!
//! - [`locator`]: finds the directory holding `server.js`
//! - [`stubs`], [`patch`], [`install`]: node_modules preparation
//! - [`tracer`]: runtime require-graph of Next internals
//! - [`generator`]: manifest, registry and bootstrap emission
//! - [`compiler`]: `bun build --compile` invocation
//! - [`cli`]: command-line front end

pub mod cli;
pub mod compiler;
pub mod config;
pub mod context;
pub mod error;
pub mod fs;
pub mod generator;
pub mod install;
pub mod locator;
pub mod patch;
pub mod stubs;
pub mod tracer;
pub mod util;
pub mod walker;

pub use compiler::{BunCompiler, CompileOptions, CompileRequest, Compiler};
pub use config::{ConfigError, PackConfig};
pub use context::BuildContext;
pub use error::PackError;
pub use fs::{FileSystem, MockFileSystem, RealFileSystem};
pub use generator::{generate, AssetKind, AssetManifest, GenerateRequest, GenerationReport};
pub use locator::locate_server_root;
pub use tracer::trace_external_modules;
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

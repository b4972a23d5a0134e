//! Configuration management for bunpack
//!
//! Settings are loaded from environment variables with sensible defaults;
//! command-line flags override them in the CLI layer.
//!
//! # Environment Variables
//!
//! - `BUNPACK_BUN_PATH`: Bun executable used to compile - default: "bun"
//! - `BUNPACK_OUTFILE`: Output binary, relative to the project unless absolute - default: "server"
//! - `BUNPACK_TARGET`: Cross-compilation target such as `bun-linux-x64` - default: host
//! - `BUNPACK_LOG_LEVEL`: Logging level - default: "info"
//! - `BUNPACK_LOG_JSON`: Emit JSON logs (true|false) - default: "false"
//!
//! # Example
//!
//! ```no_run
//! use bunpack::PackConfig;
//!
//! let config = PackConfig::default();
//! config.validate().expect("Invalid configuration");
//! println!("compiling with {}", config.bun_path);
//! ```

use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_BUN_PATH: &str = "bun";
const DEFAULT_OUTFILE: &str = "server";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// Failed to parse configuration value
    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone)]
pub struct PackConfig {
    /// Compiler executable
    pub bun_path: String,

    /// Output binary path
    pub outfile: PathBuf,

    /// Optional `bun-*` compile target
    pub target: Option<String>,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// JSON log output
    pub log_json: bool,
}

impl Default for PackConfig {
    /// Loads `BUNPACK_*` variables, falling back to defaults for anything
    /// unset or unparsable.
    fn default() -> Self {
        Self::from_env().unwrap_or_else(|_| Self {
            bun_path: DEFAULT_BUN_PATH.to_string(),
            outfile: PathBuf::from(DEFAULT_OUTFILE),
            target: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_json: false,
        })
    }
}

impl PackConfig {
    /// Strict variant of [`Default`]: malformed values are errors.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bun_path = env::var("BUNPACK_BUN_PATH").unwrap_or_else(|_| DEFAULT_BUN_PATH.to_string());

        let outfile = env::var("BUNPACK_OUTFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTFILE));

        let target = env::var("BUNPACK_TARGET")
            .ok()
            .filter(|t| !t.trim().is_empty());

        let log_level = env::var("BUNPACK_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let log_json = match env::var("BUNPACK_LOG_JSON") {
            Ok(v) => v.parse::<bool>().map_err(|e| ConfigError::ParseError {
                field: "BUNPACK_LOG_JSON".to_string(),
                error: e.to_string(),
            })?,
            Err(_) => false,
        };

        Ok(Self {
            bun_path,
            outfile,
            target,
            log_level,
            log_json,
        })
    }

    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any validation fails
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bun_path.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Bun executable path cannot be empty".to_string(),
            ));
        }

        if self.outfile.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Output file cannot be empty".to_string(),
            ));
        }

        if let Some(target) = &self.target {
            if !target.starts_with("bun-") {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid compile target: {}. Targets look like bun-linux-x64 or bun-darwin-arm64",
                    target
                )));
            }
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    /// Output binary location for a project.
    pub fn outfile_for(&self, project_dir: &Path) -> PathBuf {
        if self.outfile.is_absolute() {
            self.outfile.clone()
        } else {
            project_dir.join(&self.outfile)
        }
    }
}

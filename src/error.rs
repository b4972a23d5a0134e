use std::path::PathBuf;
use thiserror::Error;

/// Fatal pipeline failures.
///
/// Best-effort steps (stub synthesis, runtime patches) never produce one of
/// these; they log and move on.
#[derive(Error, Debug)]
pub enum PackError {
    #[error("Standalone build output not found: {0} (is `output: \"standalone\"` set in next.config?)")]
    StandaloneNotFound(PathBuf),

    #[error("No server.js found under {standalone_dir} (searched all subdirectories except node_modules)")]
    ServerNotFound { standalone_dir: PathBuf },

    #[error("Could not extract the embedded Next.js config from {server_file}; the standalone server format is not supported")]
    ConfigExtractionFailed { server_file: PathBuf },

    #[error("Filesystem operation failed on {path}: {message}")]
    Filesystem { path: PathBuf, message: String },

    #[error("Failed to launch compiler '{program}': {message}")]
    CompilerUnavailable { program: String, message: String },

    #[error("Compiler exited with {}", describe_status(.status))]
    CompileFailed { status: Option<i32> },
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

impl PackError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, err: anyhow::Error) -> Self {
        PackError::Filesystem {
            path: path.into(),
            message: format!("{:#}", err),
        }
    }
}

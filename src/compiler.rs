//! Compiles the generated entry point into a single executable.

use crate::error::PackError;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    pub entry_file: PathBuf,
    pub output_file: PathBuf,
    pub working_dir: PathBuf,
    pub extra_flags: Vec<String>,
}

/// Flags for `bun build --compile` beyond the entry and output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub target: Option<String>,
    pub minify: bool,
    pub sourcemap: bool,
    pub bytecode: bool,
    pub passthrough: Vec<String>,
}

impl CompileOptions {
    pub fn to_flags(&self) -> Vec<String> {
        let mut flags = Vec::new();
        if let Some(target) = &self.target {
            flags.push(format!("--target={}", target));
        }
        if self.minify {
            flags.push("--minify".to_string());
        }
        if self.sourcemap {
            flags.push("--sourcemap".to_string());
        }
        if self.bytecode {
            flags.push("--bytecode".to_string());
        }
        flags.extend(self.passthrough.iter().cloned());
        flags
    }
}

pub trait Compiler {
    fn compile(&self, request: &CompileRequest) -> Result<(), PackError>;
}

pub struct BunCompiler {
    program: String,
}

impl BunCompiler {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(request: &CompileRequest) -> Vec<String> {
        let mut args = vec![
            "build".to_string(),
            request.entry_file.to_string_lossy().to_string(),
            "--compile".to_string(),
            "--outfile".to_string(),
            request.output_file.to_string_lossy().to_string(),
        ];
        args.extend(request.extra_flags.iter().cloned());
        args
    }
}

impl Default for BunCompiler {
    fn default() -> Self {
        Self::new("bun")
    }
}

impl Compiler for BunCompiler {
    fn compile(&self, request: &CompileRequest) -> Result<(), PackError> {
        let args = Self::args(request);
        debug!(program = %self.program, ?args, cwd = %request.working_dir.display(), "Invoking compiler");

        let status = Command::new(&self.program)
            .args(&args)
            .current_dir(&request.working_dir)
            .status()
            .map_err(|e| PackError::CompilerUnavailable {
                program: self.program.clone(),
                message: e.to_string(),
            })?;

        if !status.success() {
            return Err(PackError::CompileFailed {
                status: status.code(),
            });
        }

        info!(output = %request.output_file.display(), "Compiled executable");
        Ok(())
    }
}

//! Command handlers. Each returns the process exit code.

use crate::cli::commands::{BuildArgs, ContextArgs, GenerateArgs, ProjectArgs, TraceArgs};
use crate::cli::output::{BuildReport, OutputFormat, OutputFormatter, TraceReport};
use crate::compiler::{BunCompiler, CompileOptions, CompileRequest, Compiler};
use crate::config::PackConfig;
use crate::context::BuildContext;
use crate::error::PackError;
use crate::fs::{FileSystem, RealFileSystem};
use crate::generator::{generate, GenerateRequest};
use crate::locator::locate_server_root;
use crate::tracer::trace_external_modules;

use anyhow::{bail, Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Resolve the project directory and dist directory from the command line.
/// A relative `--dist-dir` is taken relative to the project.
pub fn resolve_request(args: &ProjectArgs) -> Result<GenerateRequest> {
    let project_dir = match &args.project_path {
        Some(path) => path.clone(),
        None => env::current_dir().context("Failed to get current directory")?,
    };

    let fs = RealFileSystem;
    if !fs.exists(&project_dir) {
        bail!("Project path does not exist: {}", project_dir.display());
    }
    if !fs.is_dir(&project_dir) {
        bail!("Project path is not a directory: {}", project_dir.display());
    }

    let project_dir = fs
        .canonicalize(&project_dir)
        .with_context(|| format!("Failed to canonicalize {}", project_dir.display()))?;
    debug!("Canonicalized project path: {}", project_dir.display());

    let dist_dir = args.dist_dir.as_ref().map(|dir| {
        if dir.is_absolute() {
            dir.clone()
        } else {
            project_dir.join(dir)
        }
    });

    Ok(GenerateRequest::for_project(project_dir, dist_dir))
}

fn emit(output: Result<String>) -> i32 {
    match output {
        Ok(text) => {
            println!("{}", text.trim_end());
            0
        }
        Err(e) => {
            error!("Failed to format output: {}", e);
            1
        }
    }
}

pub fn handle_generate(args: &GenerateArgs, quiet: bool) -> i32 {
    let request = match resolve_request(&args.project) {
        Ok(request) => request,
        Err(e) => {
            error!("{:#}", e);
            return 1;
        }
    };

    info!("Generating bundle inputs for {}", request.project_dir.display());

    let report = match generate(&RealFileSystem, &request) {
        Ok(report) => report,
        Err(e) => {
            error!("Generation failed: {}", e);
            return 1;
        }
    };

    let format: OutputFormat = args.format.into();
    if quiet && format == OutputFormat::Human {
        return 0;
    }
    emit(OutputFormatter::new(format).format_generation(&report))
}

/// Command-line values override `BUNPACK_*` environment settings.
fn build_config(args: &BuildArgs) -> Result<PackConfig> {
    let env_config = PackConfig::default();
    let outfile = match &args.outfile {
        Some(path) if path.is_relative() => env::current_dir()
            .context("Failed to get current directory")?
            .join(path),
        Some(path) => path.clone(),
        None => env_config.outfile.clone(),
    };

    let config = PackConfig {
        bun_path: args.bun.clone().unwrap_or(env_config.bun_path),
        outfile,
        target: args.target.clone().or(env_config.target),
        ..env_config
    };
    config.validate()?;
    Ok(config)
}

/// Generate, then compile the bootstrap with `compiler`.
pub fn run_build(
    fs: &dyn FileSystem,
    compiler: &dyn Compiler,
    request: &GenerateRequest,
    output_file: PathBuf,
    options: &CompileOptions,
) -> Result<BuildReport, PackError> {
    let generation = generate(fs, request)?;

    let compile = CompileRequest {
        entry_file: generation.bootstrap_file.clone(),
        output_file: output_file.clone(),
        working_dir: generation.server_root.clone(),
        extra_flags: options.to_flags(),
    };
    compiler.compile(&compile)?;

    Ok(BuildReport {
        generation,
        executable: output_file,
    })
}

pub fn handle_build(args: &BuildArgs, quiet: bool) -> i32 {
    let request = match resolve_request(&args.project) {
        Ok(request) => request,
        Err(e) => {
            error!("{:#}", e);
            return 1;
        }
    };

    let config = match build_config(args) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            eprintln!("\nPlease check your environment variables and command-line arguments.");
            return 1;
        }
    };

    let options = CompileOptions {
        target: config.target.clone(),
        minify: args.minify,
        sourcemap: args.sourcemap,
        bytecode: args.bytecode,
        passthrough: args.passthrough.clone(),
    };
    let output_file = config.outfile_for(&request.project_dir);
    let compiler = BunCompiler::new(config.bun_path.clone());

    info!(
        "Building {} with {}",
        output_file.display(),
        compiler.program()
    );

    let report = match run_build(&RealFileSystem, &compiler, &request, output_file, &options) {
        Ok(report) => report,
        Err(e @ PackError::CompilerUnavailable { .. }) => {
            error!("{}", e);
            eprintln!("\nInstall Bun from https://bun.sh or point --bun / BUNPACK_BUN_PATH at it.");
            return 1;
        }
        Err(e) => {
            error!("Build failed: {}", e);
            return 1;
        }
    };

    let format: OutputFormat = args.format.into();
    if quiet && format == OutputFormat::Human {
        return 0;
    }
    emit(OutputFormatter::new(format).format_build(&report))
}

/// Trace without touching the build tree.
pub fn trace_report(fs: &dyn FileSystem, standalone_root: &Path) -> Result<TraceReport, PackError> {
    let server_root = locate_server_root(fs, standalone_root)?;
    let modules = trace_external_modules(fs, standalone_root, &server_root)
        .into_iter()
        .collect();
    Ok(TraceReport {
        server_root,
        modules,
    })
}

pub fn handle_trace(args: &TraceArgs) -> i32 {
    let request = match resolve_request(&args.project) {
        Ok(request) => request,
        Err(e) => {
            error!("{:#}", e);
            return 1;
        }
    };

    let report = match trace_report(&RealFileSystem, &request.standalone_dir) {
        Ok(report) => report,
        Err(e) => {
            error!("Trace failed: {}", e);
            return 1;
        }
    };

    info!("Traced {} external modules", report.modules.len());
    emit(OutputFormatter::new(args.format.into()).format_trace(&report))
}

pub fn handle_context(args: &ContextArgs, quiet: bool) -> i32 {
    let request = match resolve_request(&args.project) {
        Ok(request) => request,
        Err(e) => {
            error!("{:#}", e);
            return 1;
        }
    };

    let context = BuildContext::new(
        request.dist_dir.clone(),
        request.project_dir.clone(),
        args.asset_prefix.clone(),
    );

    let path = match context.write(&RealFileSystem) {
        Ok(path) => path,
        Err(e) => {
            error!("Failed to write build context: {:#}", e);
            return 1;
        }
    };

    info!("Build context written to {}", path.display());
    if quiet {
        return 0;
    }
    emit(OutputFormatter::new(OutputFormat::Human).format_context(&context, &path))
}

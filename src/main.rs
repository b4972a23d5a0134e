use bunpack::cli::commands::{CliArgs, Commands};
use bunpack::cli::handlers::{handle_build, handle_context, handle_generate, handle_trace};
use bunpack::util::logging::{init_logging, parse_level, LoggingConfig};
use bunpack::{PackConfig, NAME, VERSION};

use clap::Parser;
use std::process;
use tracing::{debug, Level};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("{} v{} starting", NAME, VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Generate(generate_args) => handle_generate(generate_args, args.quiet),
        Commands::Build(build_args) => handle_build(build_args, args.quiet),
        Commands::Trace(trace_args) => handle_trace(trace_args),
        Commands::Context(context_args) => handle_context(context_args, args.quiet),
    };

    process::exit(exit_code);
}

/// Flags win over `BUNPACK_LOG_LEVEL`; `BUNPACK_LOG_JSON` selects JSON output.
fn init_logging_from_args(args: &CliArgs) {
    let pack = PackConfig::default();

    let level = if let Some(level_str) = &args.log_level {
        parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        parse_level(&pack.log_level)
    };

    init_logging(LoggingConfig::for_cli(level, pack.log_json, args.verbose));
}

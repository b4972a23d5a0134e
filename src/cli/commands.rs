use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Package a Next.js standalone build into a single Bun executable
#[derive(Parser, Debug)]
#[command(
    name = "bunpack",
    about = "Package a Next.js standalone build into a single Bun executable",
    version,
    author,
    long_about = "bunpack embeds a Next.js standalone build (server code, static files, public \
                  files and runtime-required Next internals) into one Bun-compiled binary. \
                  The binary extracts its assets next to itself on first run and starts the server."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Generate the asset registry and entry point",
        long_about = "Locates the server inside the standalone build, prepares node_modules \
                      (module stubs, require-hook patch), traces runtime-required Next internals \
                      and writes assets.generated.js and server-entry.js next to server.js.\n\n\
                      Examples:\n  \
                      bunpack generate\n  \
                      bunpack generate apps/web --format json"
    )]
    Generate(GenerateArgs),

    #[command(
        about = "Generate and compile the executable",
        long_about = "Runs `generate`, then compiles server-entry.js with `bun build --compile`.\n\n\
                      Examples:\n  \
                      bunpack build\n  \
                      bunpack build --outfile dist/site --target bun-linux-x64 --minify\n  \
                      bunpack build -- --define process.env.FOO=\\\"bar\\\""
    )]
    Build(BuildArgs),

    #[command(
        about = "List the Next internals that would be embedded",
        long_about = "Traces runtime require() calls from the server chunks into node_modules \
                      without modifying the build.\n\n\
                      Examples:\n  \
                      bunpack trace\n  \
                      bunpack trace --format json"
    )]
    Trace(TraceArgs),

    #[command(
        about = "Record build context next to the build output",
        long_about = "Writes bun-compile-ctx.json into the dist directory. When an asset prefix \
                      is recorded, static files are assumed to be served from that CDN and are \
                      not embedded.\n\n\
                      Examples:\n  \
                      bunpack context --asset-prefix https://cdn.example.com"
    )]
    Context(ContextArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to the Next.js project (defaults to current directory)"
    )]
    pub project_path: Option<PathBuf>,

    #[arg(
        long,
        value_name = "DIR",
        help = "Next.js dist directory, relative to the project (defaults to .next)"
    )]
    pub dist_dir: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Output binary (defaults to BUNPACK_OUTFILE or ./server in the project)"
    )]
    pub outfile: Option<PathBuf>,

    #[arg(long, value_name = "TARGET", help = "Bun compile target, e.g. bun-linux-x64")]
    pub target: Option<String>,

    #[arg(long, value_name = "PATH", help = "Bun executable to compile with")]
    pub bun: Option<String>,

    #[arg(long, help = "Minify the bundled code")]
    pub minify: bool,

    #[arg(long, help = "Embed a sourcemap")]
    pub sourcemap: bool,

    #[arg(long, help = "Precompile to bytecode for faster startup")]
    pub bytecode: bool,

    #[arg(last = true, value_name = "BUN_FLAGS", help = "Extra flags passed to bun build")]
    pub passthrough: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct TraceArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ContextArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[arg(long, value_name = "PREFIX", help = "CDN prefix static assets are served from")]
    pub asset_prefix: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

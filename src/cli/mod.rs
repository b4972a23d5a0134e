pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{BuildArgs, CliArgs, Commands, ContextArgs, GenerateArgs, TraceArgs};
pub use output::{BuildReport, OutputFormat, OutputFormatter, TraceReport};

//! Output formatting for command results
//!
//! Reports go to stdout either as pretty JSON (for scripts and CI) or as
//! human-readable text. Logs never pass through here; they go to stderr.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::context::BuildContext;
use crate::generator::GenerationReport;

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// Human-readable formatted text
    Human,
}

/// Result of `bunpack trace`
#[derive(Debug, Clone, Serialize)]
pub struct TraceReport {
    pub server_root: PathBuf,
    pub modules: Vec<String>,
}

/// Result of `bunpack build`
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub generation: GenerationReport,
    pub executable: PathBuf,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_generation(&self, report: &GenerationReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report)
                .context("Failed to serialize generation report to JSON"),
            OutputFormat::Human => Ok(self.generation_human("\u{2713} Bundle Inputs Generated", report)),
        }
    }

    pub fn format_build(&self, report: &BuildReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(report).context("Failed to serialize build report to JSON")
            }
            OutputFormat::Human => {
                let mut output = self.generation_human("\u{2713} Executable Built", &report.generation);
                output.push_str(&format!("\nExecutable:    {}\n", report.executable.display()));
                Ok(output)
            }
        }
    }

    pub fn format_trace(&self, report: &TraceReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(report).context("Failed to serialize trace report to JSON")
            }
            OutputFormat::Human => {
                let mut output = String::new();
                output.push_str("External Next Modules\n");
                output.push_str(RULE);
                output.push_str("\n\n");
                output.push_str(&format!("Server Root:   {}\n", report.server_root.display()));
                output.push_str(&format!("Modules:       {}\n", report.modules.len()));

                if !report.modules.is_empty() {
                    output.push('\n');
                    for (i, module) in report.modules.iter().enumerate() {
                        let connector = if i == report.modules.len() - 1 {
                            "\u{2514}"
                        } else {
                            "\u{251C}"
                        };
                        output.push_str(&format!("{}\u{2500} {}\n", connector, module));
                    }
                }
                Ok(output)
            }
        }
    }

    pub fn format_context(&self, context: &BuildContext, written_to: &Path) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(context).context("Failed to serialize build context to JSON")
            }
            OutputFormat::Human => {
                let mut output = format!("\u{2713} Build context written to {}\n", written_to.display());
                match context.cdn_prefix() {
                    Some(prefix) => output.push_str(&format!(
                        "Static assets will be served from {} and not embedded\n",
                        prefix
                    )),
                    None => output.push_str("Static assets will be embedded\n"),
                }
                Ok(output)
            }
        }
    }

    fn generation_human(&self, title: &str, report: &GenerationReport) -> String {
        let mut output = String::new();
        output.push_str(title);
        output.push('\n');
        output.push_str(RULE);
        output.push_str("\n\n");

        output.push_str(&format!("Server Root:   {}\n", report.server_root.display()));
        output.push_str(&format!("Entry Point:   {}\n", report.bootstrap_file.display()));
        output.push_str(&format!("Registry:      {}\n\n", report.registry_file.display()));

        output.push_str(&format!("Embedded Assets: {}\n", report.total_assets()));
        output.push_str(&format!("\u{251C}\u{2500} Static:   {}\n", report.static_assets));
        output.push_str(&format!("\u{251C}\u{2500} Public:   {}\n", report.public_assets));
        output.push_str(&format!(
            "\u{2514}\u{2500} Runtime:  {} ({} external modules)\n",
            report.runtime_assets, report.external_modules
        ));

        if report.skipped_static > 0 {
            output.push_str(&format!(
                "\n{} static assets left to the CDN\n",
                report.skipped_static
            ));
        }
        if report.duplicate_urls > 0 {
            output.push_str(&format!(
                "\n\u{26A0} {} duplicate URLs ignored (first registration kept)\n",
                report.duplicate_urls
            ));
        }
        output
    }
}

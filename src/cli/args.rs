//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    check::CheckArgs, completions::CompletionsArgs, config::ConfigCommands,
    import::ImportCommands, init::InitArgs, quote::QuoteArgs, status::StatusArgs,
    validate::ValidateArgs, zip::ZipArgs,
};

#[derive(Parser)]
#[command(name = "rateq")]
#[command(author, version, about = "Shipping rate quotes from a plain-text rate book")]
#[command(long_about = "Resolve shipping quotes across carrier channels from warehouse, \
destination ZIP and package size, using rate tables kept as plain YAML files.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .rateq/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new rate book project with sample data
    Init(InitArgs),

    /// Quote a package on every channel
    Quote(QuoteArgs),

    /// Check a package against the compliance families
    Check(CheckArgs),

    /// Show location and zones for a destination ZIP
    Zip(ZipArgs),

    /// Import rate data
    #[command(subcommand)]
    Import(ImportCommands),

    /// Show a summary of the rate book
    Status(StatusArgs),

    /// Check the rate book for configuration problems
    Validate(ValidateArgs),

    /// Inspect and edit configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable tables
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
}

impl OutputFormat {
    /// Resolve `auto` against the configured default format
    pub fn resolve(self, default_format: Option<&str>) -> Self {
        if self != OutputFormat::Auto {
            return self;
        }
        default_format
            .and_then(|f| OutputFormat::from_str(f, true).ok())
            .unwrap_or(OutputFormat::Auto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_format_resolution() {
        assert_eq!(OutputFormat::Auto.resolve(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::Csv.resolve(Some("json")), OutputFormat::Csv);
        assert_eq!(OutputFormat::Auto.resolve(Some("bogus")), OutputFormat::Auto);
        assert_eq!(OutputFormat::Auto.resolve(None), OutputFormat::Auto);
    }
}

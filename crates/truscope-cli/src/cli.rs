//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};

/// TruScope CLI - Verify claims through tiered evidence gathering.
#[derive(Debug, Parser)]
#[command(name = "truscope")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "TRUSCOPE_CONFIG")]
    pub config: Option<String>,

    /// JSON file of raw provider payloads backing the providers offline
    #[arg(long, global = true, env = "TRUSCOPE_FIXTURES")]
    pub fixtures: Option<String>,

    /// Ollama model used for synthesis (overrides the config file)
    #[arg(long, global = true, env = "TRUSCOPE_OLLAMA_MODEL")]
    pub ollama_model: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (score and verdict only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Verify a single claim
    Check(CheckArgs),

    /// Verify every claim in a file (one per line)
    Batch(BatchArgs),

    /// Inspect or create the configuration file
    Config(ConfigArgs),
}

/// Arguments for the check command.
#[derive(Debug, Parser)]
pub struct CheckArgs {
    /// Claim text
    pub claim: String,

    /// Where the claim was published (e.g. "news article", "social media")
    #[arg(long)]
    pub context: Option<String>,
}

/// Arguments for the batch command.
#[derive(Debug, Parser)]
pub struct BatchArgs {
    /// File with one claim per line; blank lines and lines starting with '#' are skipped
    pub file: String,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the configuration file path
    Path,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

//! CLI interface and argument parsing

pub mod commands;

use clap::{Parser, Subcommand};

/// Veil - deterministic text anonymization
#[derive(Parser, Debug)]
#[command(name = "veil")]
#[command(version, about, long_about = None)]
#[command(author = "Veil Contributors")]
pub struct Cli {
    /// Path to configuration file (defaults apply when it does not exist)
    #[arg(short, long, default_value = "veil.toml", env = "VEIL_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "VEIL_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Anonymize a text file and print the result JSON
    Anonymize(commands::anonymize::AnonymizeArgs),

    /// Restore original values using a mapping
    Deanonymize(commands::deanonymize::DeanonymizeArgs),

    /// Print the spans that would be replaced
    Analyze(commands::analyze::AnalyzeArgs),

    /// Anonymize many independent files concurrently
    Batch(commands::batch::BatchArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}

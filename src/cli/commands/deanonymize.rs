//! Deanonymize command implementation

use super::{read_input, read_mapping, write_output, EXIT_SUCCESS};
use crate::anonymization::{deanonymize, diff_segments};
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the deanonymize command
#[derive(Args, Debug)]
pub struct DeanonymizeArgs {
    /// Anonymized text file (`-` for stdin)
    #[arg(short, long)]
    pub input: String,

    /// Mapping returned by the anonymize command
    #[arg(short, long)]
    pub mapping: PathBuf,

    /// Write here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Treat the input as the original text and print the change segments as JSON
    #[arg(long)]
    pub diff: bool,
}

impl DeanonymizeArgs {
    /// Execute the deanonymize command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        let text = read_input(&self.input)?;
        let mapping = read_mapping(&self.mapping)?;

        tracing::info!(entries = mapping.len(), diff = self.diff, "Reversing mapping");

        let content = if self.diff {
            serde_json::to_string_pretty(&diff_segments(&text, &mapping))?
        } else {
            deanonymize(&text, &mapping).context("Failed to restore text")?
        };
        write_output(self.output.as_deref(), &content)?;

        Ok(EXIT_SUCCESS)
    }
}

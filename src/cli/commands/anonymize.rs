//! Anonymize command implementation

use super::{
    prepare_engine, read_input, read_mapping, write_output, EXIT_ANONYMIZATION_FAILURE,
    EXIT_SUCCESS,
};
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the anonymize command
#[derive(Args, Debug)]
pub struct AnonymizeArgs {
    /// Input text file (`-` for stdin)
    #[arg(short, long)]
    pub input: String,

    /// Mapping accumulated from earlier chunks of the same document
    #[arg(short, long)]
    pub mapping: Option<PathBuf>,

    /// Write the result JSON here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty-print the result JSON
    #[arg(long)]
    pub pretty: bool,

    /// Split the input at paragraph breaks into chunks of at most this many
    /// characters (4000 when given without a value)
    #[arg(
        long,
        num_args = 0..=1,
        default_missing_value = "4000",
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub chunk_size: Option<usize>,
}

impl AnonymizeArgs {
    /// Execute the anonymize command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let (_, engine) = match prepare_engine(config_path) {
            Ok(prepared) => prepared,
            Err(code) => return Ok(code),
        };

        let text = read_input(&self.input)?;
        let existing = match self.mapping {
            Some(ref path) => Some(read_mapping(path)?),
            None => None,
        };

        tracing::info!(
            input = %self.input,
            chunk_continuation = existing.is_some(),
            chunk_size = ?self.chunk_size,
            "Anonymizing input"
        );

        let outcome = match self.chunk_size {
            Some(max_chars) => engine.anonymize_document(&text, max_chars, existing.as_deref()),
            None => engine.anonymize(&text, existing.as_deref()),
        };

        let result = match outcome {
            Ok(result) => result,
            Err(e) if e.is_anonymization_failure() => {
                eprintln!("Anonymization failed: {e}");
                return Ok(EXIT_ANONYMIZATION_FAILURE);
            }
            Err(e) => return Err(e).context("Anonymization failed"),
        };

        let json = if self.pretty {
            serde_json::to_string_pretty(&result)?
        } else {
            serde_json::to_string(&result)?
        };
        write_output(self.output.as_deref(), &json)?;

        Ok(EXIT_SUCCESS)
    }
}

//! Analyze command implementation

use super::{prepare_engine, read_input, EXIT_ANONYMIZATION_FAILURE, EXIT_SUCCESS};
use crate::anonymization::Span;
use anyhow::Context;
use clap::Args;
use serde::Serialize;

/// Arguments for the analyze command
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Input text file (`-` for stdin)
    #[arg(short, long)]
    pub input: String,

    /// Include the matched text of each span
    #[arg(long)]
    pub show_text: bool,
}

#[derive(Serialize)]
struct AnalyzedSpan<'a> {
    #[serde(flatten)]
    span: &'a Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

impl AnalyzeArgs {
    /// Execute the analyze command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let (_, engine) = match prepare_engine(config_path) {
            Ok(prepared) => prepared,
            Err(code) => return Ok(code),
        };

        let text = read_input(&self.input)?;

        let spans = match engine.analyze(&text) {
            Ok(spans) => spans,
            Err(e) if e.is_anonymization_failure() => {
                eprintln!("Analysis failed: {e}");
                return Ok(EXIT_ANONYMIZATION_FAILURE);
            }
            Err(e) => return Err(e).context("Analysis failed"),
        };

        let rendered: Vec<AnalyzedSpan<'_>> = spans
            .iter()
            .map(|span| AnalyzedSpan {
                span,
                text: if self.show_text { span.text(&text) } else { None },
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&rendered)?);
        Ok(EXIT_SUCCESS)
    }
}

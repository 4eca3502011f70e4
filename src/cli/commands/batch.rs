//! Batch command implementation
//!
//! Anonymizes independent documents concurrently. Each document gets its own
//! call to the engine, so no replacement state is shared between them.

use super::{prepare_engine, EXIT_ANONYMIZATION_FAILURE, EXIT_SUCCESS};
use crate::anonymization::{AnonymizationEngine, AnonymizationResult, BatchReport};
use anyhow::Context;
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;

/// Arguments for the batch command
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Text files to anonymize
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Directory receiving one `<name>.anonymized.json` per input
    #[arg(short = 'd', long)]
    pub output_dir: PathBuf,

    /// Also write the batch report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Override batch.max_concurrency
    #[arg(long)]
    pub max_concurrency: Option<usize>,
}

struct DocumentOutcome {
    document: String,
    result: Result<(AnonymizationResult, u64), String>,
}

impl BatchArgs {
    /// Execute the batch command
    ///
    /// Stops scheduling new documents once `shutdown_signal` flips to true;
    /// documents already running are abandoned.
    pub async fn execute(
        &self,
        config_path: &str,
        mut shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let (config, engine) = match prepare_engine(config_path) {
            Ok(prepared) => prepared,
            Err(code) => return Ok(code),
        };

        let max_concurrency = self
            .max_concurrency
            .unwrap_or(config.batch.max_concurrency)
            .max(1);
        let timeout = Duration::from_secs(config.batch.document_timeout_secs);

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| {
                format!(
                    "Failed to create output directory: {}",
                    self.output_dir.display()
                )
            })?;

        tracing::info!(
            documents = self.files.len(),
            max_concurrency,
            timeout_secs = timeout.as_secs(),
            "Starting batch"
        );

        let engine = Arc::new(engine);
        let semaphore = Arc::new(Semaphore::new(max_concurrency));
        let mut tasks = JoinSet::new();

        for path in &self.files {
            let engine = Arc::clone(&engine);
            let semaphore = Arc::clone(&semaphore);
            let path = path.clone();
            let output_dir = self.output_dir.clone();

            tasks.spawn(async move {
                let document = path.display().to_string();
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => process_document(engine, &path, &output_dir, timeout).await,
                    Err(e) => Err(format!("Semaphore closed: {e}")),
                };
                DocumentOutcome { document, result }
            });
        }

        let total = self.files.len();
        let mut report = BatchReport::new();
        let mut interrupted = false;

        loop {
            tokio::select! {
                joined = tasks.join_next() => {
                    let Some(joined) = joined else { break };
                    match joined {
                        Ok(outcome) => record(&mut report, outcome),
                        Err(e) if e.is_cancelled() => continue,
                        Err(e) => report.add_failure("<task>", format!("Task failed: {e}")),
                    }
                    crate::log_batch_processing!(report.total_documents, total);
                }
                changed = shutdown_signal.changed(), if !interrupted => {
                    if changed.is_ok() && *shutdown_signal.borrow() {
                        tracing::warn!(
                            remaining = tasks.len(),
                            "Shutdown requested, abandoning remaining documents"
                        );
                        interrupted = true;
                        tasks.abort_all();
                    } else if changed.is_err() {
                        interrupted = true;
                    }
                }
            }
        }

        print!("{}", report.format_console());

        if let Some(ref path) = self.report {
            report
                .write_to_file(path)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
        }

        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failed(),
            entities = report.total_entities,
            "Batch completed"
        );

        if report.failed() > 0 || report.total_documents < total {
            Ok(EXIT_ANONYMIZATION_FAILURE)
        } else {
            Ok(EXIT_SUCCESS)
        }
    }
}

fn record(report: &mut BatchReport, outcome: DocumentOutcome) {
    match outcome.result {
        Ok((result, elapsed_ms)) => report.add_result(&result, elapsed_ms),
        Err(error) => {
            tracing::warn!(document = %outcome.document, error = %error, "Document failed");
            report.add_failure(outcome.document, error);
        }
    }
}

async fn process_document(
    engine: Arc<AnonymizationEngine>,
    path: &Path,
    output_dir: &Path,
    timeout: Duration,
) -> Result<(AnonymizationResult, u64), String> {
    let started = Instant::now();

    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("Failed to read input: {e}"))?;

    let work = tokio::task::spawn_blocking(move || engine.anonymize(&text, None));
    let result = match tokio::time::timeout(timeout, work).await {
        Ok(Ok(Ok(result))) => result,
        Ok(Ok(Err(e))) => return Err(e.to_string()),
        Ok(Err(e)) => return Err(format!("Worker failed: {e}")),
        Err(_) => return Err(format!("Timed out after {}s", timeout.as_secs())),
    };

    let json = serde_json::to_string_pretty(&result).map_err(|e| e.to_string())?;
    let destination = output_dir.join(output_name(path));
    tokio::fs::write(&destination, json)
        .await
        .map_err(|e| format!("Failed to write {}: {e}", destination.display()))?;

    Ok((result, started.elapsed().as_millis() as u64))
}

fn output_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    format!("{stem}.anonymized.json")
}

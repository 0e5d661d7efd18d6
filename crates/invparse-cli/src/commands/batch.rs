//! Batch processing command for multiple text files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use invparse_core::invoice::{InvoiceParser, RuleBasedParser};
use invparse_core::models::config::InvparseConfig;
use invparse_core::models::invoice::Invoice;

use super::process::{build_invoice, csv_record, format_invoice, OutputFormat, CSV_HEADER};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching `.txt` files
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    invoice: Option<Invoice>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = Arc::new(super::load_config(config_path)?);

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let parser = Arc::new(RuleBasedParser::new().with_config(config.extraction.clone()));
    let mut results = Vec::with_capacity(files.len());

    // Parsing is CPU-bound: run each file on the blocking pool, `jobs` at a time
    for chunk in files.chunks(args.jobs.max(1)) {
        let mut handles = Vec::with_capacity(chunk.len());

        for path in chunk {
            let path = path.clone();
            let parser = parser.clone();
            let config = config.clone();

            handles.push(tokio::task::spawn_blocking(move || {
                let file_start = Instant::now();
                let outcome = process_single_file(&path, &parser, &config);
                (path, outcome, file_start.elapsed().as_millis() as u64)
            }));
        }

        for handle in handles {
            let (path, outcome, processing_time_ms) = handle.await?;

            match outcome {
                Ok(invoice) => results.push(ProcessResult {
                    path,
                    invoice: Some(invoice),
                    error: None,
                    processing_time_ms,
                }),
                Err(e) => {
                    let error_msg = e.to_string();
                    if args.continue_on_error {
                        warn!("Failed to process {}: {}", path.display(), error_msg);
                        results.push(ProcessResult {
                            path,
                            invoice: None,
                            error: Some(error_msg),
                            processing_time_ms,
                        });
                    } else {
                        error!("Failed to process {}: {}", path.display(), error_msg);
                        overall_pb.abandon();
                        anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                    }
                }
            }

            overall_pb.inc(1);
        }
    }

    overall_pb.finish_and_clear();

    let successful: Vec<_> = results.iter().filter(|r| r.invoice.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        for result in &successful {
            if let Some(invoice) = &result.invoice {
                let output_name = result
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("invoice");
                let output_path =
                    output_dir.join(format!("{}.{}", output_name, args.format.extension()));

                let content = format_invoice(invoice, args.format, config.output.pretty_json)?;
                fs::write(&output_path, content)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    eprintln!();
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for result in &failed {
            eprintln!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_single_file(
    path: &Path,
    parser: &RuleBasedParser,
    config: &InvparseConfig,
) -> anyhow::Result<Invoice> {
    let text = fs::read_to_string(path)?;
    if text.trim().is_empty() {
        anyhow::bail!("File contains no text");
    }

    let result = parser.parse(&text);
    Ok(build_invoice(&result, path, config))
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["filename", "status"];
    header.extend(CSV_HEADER);
    header.extend(["processing_time_ms", "error"]);
    wtr.write_record(&header)?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        let mut record = vec![filename.to_string()];
        match &result.invoice {
            Some(invoice) => {
                record.push("success".to_string());
                record.extend(csv_record(invoice));
            }
            None => {
                record.push("error".to_string());
                record.extend(CSV_HEADER.iter().map(|_| String::new()));
            }
        }
        record.push(result.processing_time_ms.to_string());
        record.push(result.error.clone().unwrap_or_default());

        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

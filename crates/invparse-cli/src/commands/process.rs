//! Process command - extract fields from a single text file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use invparse_core::invoice::{ExtractionResult, InvoiceParser, RuleBasedParser};
use invparse_core::models::config::InvparseConfig;
use invparse_core::models::invoice::{Invoice, SourceInfo, SourceKind};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input text file, or `-` for stdin
    #[arg(required = true)]
    input: PathBuf,

    #[command(flatten)]
    output: OutputArgs,
}

/// Output options shared by commands that print one invoice.
#[derive(Args)]
pub struct OutputArgs {
    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show extraction confidence scores
    #[arg(long)]
    show_confidence: bool,

    /// Validate extracted data
    #[arg(long)]
    validate: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = super::load_config(config_path)?;
    let text = super::read_input(&args.input)?;

    info!("Processing file: {}", args.input.display());

    let parser = RuleBasedParser::new().with_config(config.extraction.clone());
    let result = parser.parse(&text);
    let invoice = build_invoice(&result, &args.input, &config);

    write_invoice(&invoice, &result, &args.output, &config)?;

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Assemble the stored invoice record for one parsed input.
pub fn build_invoice(result: &ExtractionResult, input: &Path, config: &InvparseConfig) -> Invoice {
    let source = if super::is_stdin(input) {
        SourceInfo::default()
    } else {
        let filename = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        SourceInfo {
            kind: filename
                .as_deref()
                .map(SourceKind::from_filename)
                .unwrap_or_default(),
            filename,
        }
    };

    Invoice::from_fields(
        result.fields.clone(),
        result.subtotal,
        result.tax,
        config.output.default_currency.clone(),
        source,
    )
}

/// Print or save one invoice according to the output options.
pub fn write_invoice(
    invoice: &Invoice,
    result: &ExtractionResult,
    args: &OutputArgs,
    config: &InvparseConfig,
) -> anyhow::Result<()> {
    // Validate if requested
    if args.validate {
        let issues = invoice.validate();
        if !issues.is_empty() {
            eprintln!("{}", style("Validation issues:").yellow());
            for issue in &issues {
                eprintln!("  - {}", issue);
            }
        }
    }

    let output = format_invoice(invoice, args.format, config.output.pretty_json)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output.trim_end());
    }

    if args.show_confidence {
        eprintln!();
        for (field, confidence) in &result.field_confidence {
            eprintln!(
                "{} {}: {:.0}%",
                style("ℹ").blue(),
                field,
                confidence * 100.0
            );
        }
        for warning in &result.warnings {
            eprintln!("{} {}", style("!").yellow(), warning);
        }
    }

    Ok(())
}

pub fn format_invoice(invoice: &Invoice, format: OutputFormat, pretty: bool) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if pretty => Ok(serde_json::to_string_pretty(invoice)?),
        OutputFormat::Json => Ok(serde_json::to_string(invoice)?),
        OutputFormat::Csv => format_csv(invoice),
        OutputFormat::Text => Ok(format_text(invoice)),
    }
}

/// Column names of the per-invoice CSV.
pub const CSV_HEADER: [&str; 10] = [
    "id",
    "vendor",
    "invoice_number",
    "invoice_date",
    "due_date",
    "subtotal",
    "tax",
    "total",
    "currency",
    "source",
];

/// Values of one invoice in [`CSV_HEADER`] order; absent fields are empty.
pub fn csv_record(invoice: &Invoice) -> [String; 10] {
    [
        invoice.id.clone(),
        invoice.vendor.clone(),
        invoice.invoice_number.clone().unwrap_or_default(),
        invoice.invoice_date.map(|d| d.to_string()).unwrap_or_default(),
        invoice.due_date.map(|d| d.to_string()).unwrap_or_default(),
        invoice.subtotal.map(|a| a.to_string()).unwrap_or_default(),
        invoice.tax.map(|a| a.to_string()).unwrap_or_default(),
        invoice.total.map(|a| a.to_string()).unwrap_or_default(),
        invoice.currency.clone(),
        invoice.source.filename.clone().unwrap_or_default(),
    ]
}

fn format_csv(invoice: &Invoice) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(CSV_HEADER)?;
    wtr.write_record(csv_record(invoice))?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(invoice: &Invoice) -> String {
    let mut output = String::new();

    output.push_str(&format!("Vendor: {}\n", invoice.vendor));
    output.push_str(&format!(
        "Invoice: {}\n",
        invoice.invoice_number.as_deref().unwrap_or("-")
    ));
    if let Some(date) = invoice.invoice_date {
        output.push_str(&format!("Date: {}\n", date));
    }
    output.push('\n');

    output.push_str("Summary:\n");
    if let Some(subtotal) = invoice.subtotal {
        output.push_str(&format!("  Subtotal: {} {}\n", subtotal, invoice.currency));
    }
    if let Some(tax) = invoice.tax {
        output.push_str(&format!("  Tax:      {} {}\n", tax, invoice.currency));
    }
    match invoice.total {
        Some(total) => output.push_str(&format!("  Total:    {} {}\n", total, invoice.currency)),
        None => output.push_str("  Total:    -\n"),
    }

    if let Some(due_date) = invoice.due_date {
        output.push_str(&format!("\nPayment due: {}\n", due_date));
    }

    output
}

//! Reconcile command - check a preliminary parse against its raw text.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use tracing::info;

use invparse_core::invoice::{InvoiceParser, RuleBasedParser};
use invparse_core::models::invoice::PartialInvoice;

use super::process::{build_invoice, write_invoice, OutputArgs};

/// Arguments for the reconcile command.
#[derive(Args)]
pub struct ReconcileArgs {
    /// Input text file, or `-` for stdin
    #[arg(required = true)]
    input: PathBuf,

    /// JSON file with the preliminary parse
    #[arg(long)]
    prior: Option<PathBuf>,

    /// Preliminary vendor (overrides --prior)
    #[arg(long)]
    vendor: Option<String>,

    /// Preliminary invoice number (overrides --prior)
    #[arg(long)]
    invoice_number: Option<String>,

    #[command(flatten)]
    output: OutputArgs,
}

pub async fn run(args: ReconcileArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let prior = load_prior(&args)?;
    let text = super::read_input(&args.input)?;

    info!("Reconciling {} against its text", args.input.display());

    let parser = RuleBasedParser::new().with_config(config.extraction.clone());
    let result = parser.reconcile(&prior, &text);
    let invoice = build_invoice(&result, &args.input, &config);

    write_invoice(&invoice, &result, &args.output, &config)
}

fn load_prior(args: &ReconcileArgs) -> anyhow::Result<PartialInvoice> {
    let mut prior = match &args.prior {
        Some(path) => {
            let content = fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
            serde_json::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Invalid prior parse in {}: {}", path.display(), e))?
        }
        None => PartialInvoice::default(),
    };

    if let Some(vendor) = &args.vendor {
        prior.vendor = Some(vendor.clone());
    }
    if let Some(invoice_number) = &args.invoice_number {
        prior.invoice_number = Some(invoice_number.clone());
    }

    Ok(prior)
}

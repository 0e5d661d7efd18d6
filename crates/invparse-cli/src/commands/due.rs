//! Due command - list invoices whose payment falls due soon.

use std::fs;

use chrono::{Days, Local, NaiveDate};
use clap::Args;
use console::style;
use glob::glob;
use tracing::{info, warn};

use invparse_core::invoice::{InvoiceParser, RuleBasedParser};
use invparse_core::models::invoice::Invoice;

use super::process::{build_invoice, csv_record, OutputFormat, CSV_HEADER};

/// Arguments for the due command.
#[derive(Args)]
pub struct DueArgs {
    /// Glob pattern matching `.txt` files
    #[arg(required = true)]
    input: String,

    /// Look-ahead window in days
    #[arg(short, long, default_value = "7")]
    days: i64,

    /// Reference date, YYYY-MM-DD (default: today)
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

pub async fn run(args: DueArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    if args.days < 0 {
        anyhow::bail!("--days must not be negative");
    }
    let until = u64::try_from(args.days)
        .ok()
        .and_then(|days| today.checked_add_days(Days::new(days)));
    let Some(until) = until else {
        anyhow::bail!("--days {} reaches past the supported date range", args.days);
    };

    let parser = RuleBasedParser::new().with_config(config.extraction.clone());
    let mut due: Vec<Invoice> = Vec::new();

    for path in glob(&args.input)?.filter_map(|r| r.ok()) {
        if !path.extension().is_some_and(|e| e.eq_ignore_ascii_case("txt")) {
            continue;
        }

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        let invoice = build_invoice(&parser.parse(&text), &path, &config);
        if invoice.is_due_within(today, args.days) {
            due.push(invoice);
        }
    }

    due.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.id.cmp(&b.id)));

    info!(
        "{} invoices due between {} and {}",
        due.len(),
        today,
        until
    );

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&due)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            wtr.write_record(CSV_HEADER)?;
            for invoice in &due {
                wtr.write_record(csv_record(invoice))?;
            }
            wtr.flush()?;
        }
        OutputFormat::Text => print_table(&due, today, args.days),
    }

    Ok(())
}

fn print_table(due: &[Invoice], today: NaiveDate, days: i64) {
    if due.is_empty() {
        println!(
            "{} No invoices due within {} days of {}",
            style("ℹ").blue(),
            days,
            today
        );
        return;
    }

    for invoice in due {
        let due_date = invoice
            .due_date
            .map(|d| d.to_string())
            .unwrap_or_default();
        let total = invoice
            .total
            .map(|t| format!("{} {}", t, invoice.currency))
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{}  {:<30}  {:<16}  {:>14}",
            style(due_date).yellow(),
            invoice.vendor,
            invoice.invoice_number.as_deref().unwrap_or("-"),
            total
        );
    }
}

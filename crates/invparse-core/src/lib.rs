//! Core library for heuristic invoice field extraction.
//!
//! This crate provides:
//! - Rule-based extraction of vendor, invoice number, dates and totals from
//!   raw OCR or PDF text
//! - Reconciliation of an upstream parse against the text it came from
//! - Invoice data models and JSON configuration
//!
//! Extraction never fails: a field that cannot be found is absent, and the
//! vendor falls back to a configurable placeholder.

pub mod error;
pub mod invoice;
pub mod models;

pub use error::{InvparseError, Result};
pub use invoice::{ExtractionResult, InvoiceParser, RuleBasedParser};
pub use models::config::{ExtractionConfig, InvparseConfig, OutputConfig};
pub use models::invoice::{Invoice, ParsedInvoiceFields, PartialInvoice, SourceInfo, SourceKind};

/// Parse invoice fields from raw text with default settings.
pub fn parse_invoice_text(text: &str) -> ParsedInvoiceFields {
    RuleBasedParser::new().parse(text).fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_invoice_text() {
        let fields = parse_invoice_text("acme widgets llc\nInvoice No. 20931\nTotal Due: $5.00 $50.00");

        assert_eq!(fields.vendor, "Acme Widgets LLC");
        assert_eq!(fields.invoice_number.as_deref(), Some("20931"));
        assert_eq!(fields.total.map(|t| t.to_string()), Some("50.00".to_string()));
    }

    #[test]
    fn test_garbage_input() {
        let fields = parse_invoice_text("@@@ ### !!!\n\u{0}\u{1}");

        assert_eq!(fields.vendor, "Unknown Vendor");
        assert!(fields.invoice_number.is_none());
        assert!(fields.invoice_date.is_none());
        assert!(fields.due_date.is_none());
        assert!(fields.total.is_none());
    }
}

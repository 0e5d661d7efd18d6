//! Reconciliation of a preliminary parse with its raw text.
//!
//! An upstream parse (a model, a previous run, a human) may already carry
//! values. Vendor and invoice number are re-derived from the text and the
//! upstream value survives only when it looks valid on its own or when the
//! text yields nothing. Dates and total are kept when present and filled in
//! from the text otherwise.

use tracing::debug;

use crate::models::config::ExtractionConfig;
use crate::models::invoice::PartialInvoice;

use super::parser::{ExtractionResult, TextFields};
use super::rules::{
    fix_invoice_number, is_plausible_invoice_number, passes_trust_gate, ExtractionMatch,
};

/// Confidence reported for values taken from the upstream parse.
const SUPPLIED_CONFIDENCE: f32 = 1.0;

/// Merge `prior` with the fields derived from `text`.
pub fn reconcile(prior: &PartialInvoice, text: &str, config: &ExtractionConfig) -> ExtractionResult {
    let derived = TextFields::derive(text, config);

    let merged = TextFields {
        vendor: reconcile_vendor(
            prior.vendor.as_deref(),
            derived.vendor,
            config.trust_external_vendor,
        ),
        invoice_number: reconcile_invoice_number(
            prior.invoice_number.as_deref(),
            derived.invoice_number,
        ),
        invoice_date: prior.invoice_date.map(supplied).or(derived.invoice_date),
        due_date: prior.due_date.map(supplied).or(derived.due_date),
        total: prior.total.map(supplied).or(derived.total),
        subtotal: derived.subtotal,
        tax: derived.tax,
    };

    merged.into_result(&config.fallback_vendor)
}

fn supplied<T: ToString>(value: T) -> ExtractionMatch<T> {
    let source = value.to_string();
    ExtractionMatch::new(value, SUPPLIED_CONFIDENCE, source)
}

fn reconcile_vendor(
    prior: Option<&str>,
    derived: Option<ExtractionMatch<String>>,
    trust_external: bool,
) -> Option<ExtractionMatch<String>> {
    match prior.map(str::trim).filter(|v| !v.is_empty()) {
        Some(vendor) if trust_external && passes_trust_gate(vendor) => {
            debug!("Keeping supplied vendor {:?}", vendor);
            Some(supplied(vendor.to_string()))
        }
        Some(vendor) => derived.or_else(|| Some(supplied(vendor.to_string()))),
        None => derived,
    }
}

fn reconcile_invoice_number(
    prior: Option<&str>,
    derived: Option<ExtractionMatch<String>>,
) -> Option<ExtractionMatch<String>> {
    match prior.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) if is_plausible_invoice_number(id) => {
            debug!("Keeping supplied invoice number {:?}", id);
            Some(supplied(fix_invoice_number(id)))
        }
        Some(id) => derived.or_else(|| Some(supplied(id.to_string()))),
        None => derived,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const TEXT: &str = "ACME WIDGETS LLC\nInvoice #: INV-1001\nDate: 2024-02-01\nTotal: $11.00";

    fn run(prior: PartialInvoice) -> ExtractionResult {
        reconcile(&prior, TEXT, &ExtractionConfig::default())
    }

    #[test]
    fn test_trusted_vendor_is_kept() {
        let result = run(PartialInvoice {
            vendor: Some("Beta Corp".to_string()),
            ..Default::default()
        });

        assert_eq!(result.fields.vendor, "Beta Corp");
        assert_eq!(result.field_confidence.get("vendor"), Some(&1.0));
    }

    #[test]
    fn test_untrusted_vendor_is_replaced() {
        let result = run(PartialInvoice {
            vendor: Some("billing@beta.example".to_string()),
            ..Default::default()
        });
        assert_eq!(result.fields.vendor, "Acme Widgets LLC");
    }

    #[test]
    fn test_trust_can_be_disabled() {
        let config = ExtractionConfig {
            trust_external_vendor: false,
            ..Default::default()
        };
        let prior = PartialInvoice {
            vendor: Some("Beta Corp".to_string()),
            ..Default::default()
        };

        let result = reconcile(&prior, TEXT, &config);
        assert_eq!(result.fields.vendor, "Acme Widgets LLC");
    }

    #[test]
    fn test_prior_vendor_kept_when_text_has_none() {
        let prior = PartialInvoice {
            vendor: Some("acme".to_string()),
            ..Default::default()
        };

        let result = reconcile(&prior, "", &ExtractionConfig::default());
        assert_eq!(result.fields.vendor, "acme");
    }

    #[test]
    fn test_plausible_invoice_number_is_repaired_and_kept() {
        let result = run(PartialInvoice {
            invoice_number: Some("us-1".to_string()),
            ..Default::default()
        });
        assert_eq!(result.fields.invoice_number, Some("US-001".to_string()));
    }

    #[test]
    fn test_implausible_invoice_number() {
        let result = run(PartialInvoice {
            invoice_number: Some("N/A".to_string()),
            ..Default::default()
        });
        assert_eq!(result.fields.invoice_number, Some("INV-1001".to_string()));

        let prior = PartialInvoice {
            invoice_number: Some("N/A".to_string()),
            ..Default::default()
        };
        let result = reconcile(&prior, "", &ExtractionConfig::default());
        assert_eq!(result.fields.invoice_number, Some("N/A".to_string()));
    }

    #[test]
    fn test_dates_and_total_prefer_prior() {
        let issued = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let result = run(PartialInvoice {
            invoice_date: Some(issued),
            ..Default::default()
        });

        assert_eq!(result.fields.invoice_date, Some(issued));
        assert_eq!(result.fields.total, Some(Decimal::from_str("11.00").unwrap()));
        assert_eq!(result.fields.due_date, None);
    }

    #[test]
    fn test_empty_prior_matches_plain_parse() {
        let result = run(PartialInvoice::default());
        assert_eq!(result.fields.vendor, "Acme Widgets LLC");
        assert_eq!(result.fields.invoice_number, Some("INV-1001".to_string()));
        assert_eq!(
            result.fields.invoice_date,
            NaiveDate::from_ymd_opt(2024, 2, 1)
        );
    }
}

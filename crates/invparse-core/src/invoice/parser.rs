//! Rule-based invoice parser.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use crate::models::config::ExtractionConfig;
use crate::models::invoice::{ParsedInvoiceFields, PartialInvoice};

use super::lines::LineCollection;
use super::postprocess;
use super::rules::{
    extract_amounts, extract_dates, ExtractionMatch, FieldExtractor, InvoiceNumberExtractor,
    VendorExtractor,
};

/// Result of invoice extraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    /// Extracted invoice fields.
    pub fields: ParsedInvoiceFields,
    /// Amount before tax, when printed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<Decimal>,
    /// Tax amount, when printed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<Decimal>,
    /// Fields that could not be found.
    pub warnings: Vec<String>,
    /// Confidence of the rule that produced each field.
    pub field_confidence: BTreeMap<String, f32>,
}

/// Trait for invoice parsing.
pub trait InvoiceParser {
    /// Parse invoice fields from raw document text.
    fn parse(&self, text: &str) -> ExtractionResult;

    /// Check a preliminary parse against the raw text it came from.
    fn reconcile(&self, prior: &PartialInvoice, text: &str) -> ExtractionResult;
}

/// Invoice parser built on pattern rules and line scoring.
pub struct RuleBasedParser {
    config: ExtractionConfig,
}

impl RuleBasedParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self {
            config: ExtractionConfig::default(),
        }
    }

    /// Use the given extraction settings.
    pub fn with_config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }
}

impl Default for RuleBasedParser {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceParser for RuleBasedParser {
    fn parse(&self, text: &str) -> ExtractionResult {
        info!("Parsing invoice from {} characters of text", text.len());

        TextFields::derive(text, &self.config).into_result(&self.config.fallback_vendor)
    }

    fn reconcile(&self, prior: &PartialInvoice, text: &str) -> ExtractionResult {
        info!("Reconciling invoice against {} characters of text", text.len());

        postprocess::reconcile(prior, text, &self.config)
    }
}

/// Every field the rules can find in one text, with the match that produced it.
#[derive(Debug, Clone, Default)]
pub(crate) struct TextFields {
    pub vendor: Option<ExtractionMatch<String>>,
    pub invoice_number: Option<ExtractionMatch<String>>,
    pub invoice_date: Option<ExtractionMatch<NaiveDate>>,
    pub due_date: Option<ExtractionMatch<NaiveDate>>,
    pub total: Option<ExtractionMatch<Decimal>>,
    pub subtotal: Option<ExtractionMatch<Decimal>>,
    pub tax: Option<ExtractionMatch<Decimal>>,
}

impl TextFields {
    /// Run every extractor over the same text.
    pub fn derive(text: &str, config: &ExtractionConfig) -> Self {
        let lines = LineCollection::from_text(text);

        let vendor = VendorExtractor::new()
            .with_scan_lines(config.vendor_scan_lines)
            .with_score_lines(config.vendor_score_lines)
            .extract(text);
        let invoice_number = InvoiceNumberExtractor::new().extract(text);
        let dates = extract_dates(text);
        let amounts = extract_amounts(&lines);

        Self {
            vendor,
            invoice_number,
            invoice_date: dates.invoice_date,
            due_date: dates.due_date,
            total: amounts.total,
            subtotal: amounts.subtotal,
            tax: amounts.tax,
        }
    }

    pub fn into_result(self, fallback_vendor: &str) -> ExtractionResult {
        let mut warnings = Vec::new();
        let mut field_confidence = BTreeMap::new();

        let vendor = match self.vendor {
            Some(m) => {
                field_confidence.insert("vendor".to_string(), m.confidence);
                m.value
            }
            None => {
                warnings.push("Could not extract vendor, using fallback".to_string());
                fallback_vendor.to_string()
            }
        };

        let fields = ParsedInvoiceFields {
            vendor,
            invoice_number: take_field(
                "invoice number",
                self.invoice_number,
                &mut warnings,
                &mut field_confidence,
            ),
            invoice_date: take_field(
                "invoice date",
                self.invoice_date,
                &mut warnings,
                &mut field_confidence,
            ),
            due_date: take_field("due date", self.due_date, &mut warnings, &mut field_confidence),
            total: take_field("total", self.total, &mut warnings, &mut field_confidence),
        };

        let subtotal = self.subtotal.map(|m| {
            field_confidence.insert("subtotal".to_string(), m.confidence);
            m.value
        });
        let tax = self.tax.map(|m| {
            field_confidence.insert("tax".to_string(), m.confidence);
            m.value
        });

        debug!(
            "Extracted invoice {:?} from {} with {} warnings",
            fields.invoice_number,
            fields.vendor,
            warnings.len()
        );

        ExtractionResult {
            fields,
            subtotal,
            tax,
            warnings,
            field_confidence,
        }
    }
}

fn take_field<T>(
    name: &str,
    found: Option<ExtractionMatch<T>>,
    warnings: &mut Vec<String>,
    field_confidence: &mut BTreeMap<String, f32>,
) -> Option<T> {
    match found {
        Some(m) => {
            field_confidence.insert(name.replace(' ', "_"), m.confidence);
            Some(m.value)
        }
        None => {
            warnings.push(format!("Could not extract {}", name));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    const SAMPLE: &str = r#"
        ACME WIDGETS LLC
        123 Main Street
        Springfield, IL 62701

        INVOICE
        Invoice #: INV-1001
        Invoice Date: 03/01/2024
        Due Date: 03/31/2024

        Bill To:
        Beta Corp
        456 Oak Avenue

        Description        Qty   Unit Price   Amount
        Blue Widget        10    $1.00        $10.00

        Subtotal: $10.00
        Tax: $1.00
        Total: $11.00
    "#;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_sample_invoice() {
        let result = RuleBasedParser::new().parse(SAMPLE);

        assert_eq!(
            result.fields,
            ParsedInvoiceFields {
                vendor: "Acme Widgets LLC".to_string(),
                invoice_number: Some("INV-1001".to_string()),
                invoice_date: NaiveDate::from_ymd_opt(2024, 3, 1),
                due_date: NaiveDate::from_ymd_opt(2024, 3, 31),
                total: Some(dec("11.00")),
            }
        );
        assert_eq!(result.subtotal, Some(dec("10.00")));
        assert_eq!(result.tax, Some(dec("1.00")));
        assert!(result.warnings.is_empty());
        assert_eq!(result.field_confidence.get("vendor"), Some(&0.95));
        assert_eq!(result.field_confidence.get("invoice_number"), Some(&0.9));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let parser = RuleBasedParser::new();
        let first = serde_json::to_string(&parser.parse(SAMPLE)).unwrap();
        let second = serde_json::to_string(&parser.parse(SAMPLE)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_empty_text() {
        let result = RuleBasedParser::new().parse("");

        assert_eq!(
            result.fields,
            ParsedInvoiceFields {
                vendor: "Unknown Vendor".to_string(),
                invoice_number: None,
                invoice_date: None,
                due_date: None,
                total: None,
            }
        );
        assert_eq!(result.warnings.len(), 5);
        assert!(result.field_confidence.is_empty());
    }

    #[test]
    fn test_configured_fallback_vendor() {
        let config = ExtractionConfig {
            fallback_vendor: "Unassigned".to_string(),
            ..Default::default()
        };

        let parser = RuleBasedParser::new().with_config(config);
        assert_eq!(parser.config().fallback_vendor, "Unassigned");

        let result = parser.parse("12345");
        assert_eq!(result.fields.vendor, "Unassigned");
    }

    #[test]
    fn test_reconciling_own_parse_is_stable() {
        let parser = RuleBasedParser::new();
        let first = parser.parse(SAMPLE);

        let second = parser.reconcile(&PartialInvoice::from(first.fields.clone()), SAMPLE);
        assert_eq!(second.fields, first.fields);
        assert_eq!(second.field_confidence.get("vendor"), Some(&1.0));
        assert_eq!(second.field_confidence.get("invoice_number"), Some(&1.0));
    }

    #[test]
    fn test_serialized_fields_omit_absent_values() {
        let result = RuleBasedParser::new().parse("Globex Corporation\nTotal: $99.50");
        let json = serde_json::to_value(&result.fields).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "vendor": "Globex Corporation",
                "total": "99.50"
            })
        );
    }

    #[test]
    fn test_reconcile_through_parser() {
        let prior = PartialInvoice {
            vendor: Some("Beta Corp".to_string()),
            ..Default::default()
        };

        let result = RuleBasedParser::new().reconcile(&prior, SAMPLE);
        assert_eq!(result.fields.vendor, "Beta Corp");
        assert_eq!(result.fields.invoice_number, Some("INV-1001".to_string()));
        assert_eq!(result.fields.total, Some(dec("11.00")));
    }
}

//! Invoice number extraction and OCR repair.

use super::patterns::{
    INVOICE_ID_SHAPE, INVOICE_NUMBER, INVOICE_NUMBER_FALLBACK, INVOICE_NUMBER_SHORT, TRUNCATED_ID,
};
use super::{ExtractionMatch, FieldExtractor};
use regex::Regex;

/// Invoice number extractor.
///
/// Patterns are tried in order: a labeled id (`Invoice No. AB-1234`), a bare
/// `INV` id anywhere, and finally a labeled id with a truncated numeric part
/// (`Invoice #: US-1`) that only the repair step can make sense of.
pub struct InvoiceNumberExtractor;

impl InvoiceNumberExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InvoiceNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for InvoiceNumberExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        [
            (&*INVOICE_NUMBER, 0.9),
            (&*INVOICE_NUMBER_FALLBACK, 0.7),
            (&*INVOICE_NUMBER_SHORT, 0.6),
        ]
        .into_iter()
        .find_map(|(pattern, confidence)| first_match(pattern, text, confidence))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        for (pattern, confidence) in [
            (&*INVOICE_NUMBER, 0.9),
            (&*INVOICE_NUMBER_FALLBACK, 0.7),
            (&*INVOICE_NUMBER_SHORT, 0.6),
        ] {
            for caps in pattern.captures_iter(text) {
                let id = caps.get(1).unwrap();
                let value = fix_invoice_number(id.as_str());

                // Skip if already found by a stronger pattern
                if results.iter().any(|r| r.value == value) {
                    continue;
                }

                results.push(
                    ExtractionMatch::new(value, confidence, id.as_str())
                        .with_position(id.start(), id.end()),
                );
            }
        }

        results
    }
}

fn first_match(pattern: &Regex, text: &str, confidence: f32) -> Option<ExtractionMatch<String>> {
    let id = pattern.captures(text)?.get(1)?;
    Some(
        ExtractionMatch::new(fix_invoice_number(id.as_str()), confidence, id.as_str())
            .with_position(id.start(), id.end()),
    )
}

/// Extract and repair the invoice number of a document.
pub fn extract_invoice_number(text: &str) -> Option<String> {
    InvoiceNumberExtractor::new().extract(text).map(|m| m.value)
}

/// Normalize an invoice id: upper-case, drop inner whitespace, and zero-pad
/// a 1-2 digit run after a letter prefix (OCR drops leading zeros, so
/// `US-1` becomes `US-001`).
pub fn fix_invoice_number(raw: &str) -> String {
    let id: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect();

    match TRUNCATED_ID.captures(&id) {
        Some(caps) => format!("{}{:0>3}", &caps[1], &caps[2]),
        None => id,
    }
}

/// Whether an externally supplied id looks like a real invoice number.
pub fn is_plausible_invoice_number(id: &str) -> bool {
    let id = fix_invoice_number(id);
    (2..=32).contains(&id.len())
        && id.chars().any(|c| c.is_ascii_digit())
        && INVOICE_ID_SHAPE.is_match(&id)
}

//! Rule-based field extractors for invoice text.

pub mod amounts;
pub mod dates;
pub mod invoice_number;
pub mod normalize;
pub mod patterns;
pub mod vendor;

pub use amounts::{extract_amounts, extract_total, tokenize_money, InvoiceAmounts, MoneyExtractor};
pub use dates::{extract_dates, resolve_date, DateExtractor, InvoiceDates};
pub use invoice_number::{
    extract_invoice_number, fix_invoice_number, is_plausible_invoice_number, InvoiceNumberExtractor,
};
pub use normalize::{normalize_line, title_case};
pub use vendor::{passes_trust_gate, VendorExtractor};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// Extraction context with confidence scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

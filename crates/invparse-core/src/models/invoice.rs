//! Invoice data models.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fields extracted from the raw text of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedInvoiceFields {
    /// Issuing organization. Never empty; may be a fallback placeholder.
    pub vendor: String,

    /// Invoice identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,

    /// Date the invoice was issued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<NaiveDate>,

    /// Payment due date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Grand total.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
}

/// A preliminary parse from another source, to be checked against the text.
///
/// Every field is optional; a guess from an upstream model usually carries
/// only some of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialInvoice {
    pub vendor: Option<String>,
    pub invoice_number: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub total: Option<Decimal>,
}

impl From<ParsedInvoiceFields> for PartialInvoice {
    fn from(fields: ParsedInvoiceFields) -> Self {
        Self {
            vendor: Some(fields.vendor),
            invoice_number: fields.invoice_number,
            invoice_date: fields.invoice_date,
            due_date: fields.due_date,
            total: fields.total,
        }
    }
}

/// Kind of document the text was taken from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Text extracted from a PDF.
    Pdf,
    /// Text recognized from an image.
    Image,
    /// Plain text input.
    #[default]
    Text,
}

impl SourceKind {
    /// Guess the original document kind from a text dump's file name.
    ///
    /// Dumps are usually named after their document (`scan.pdf.txt`,
    /// `photo.jpg.txt`); anything else is plain text.
    pub fn from_filename(name: &str) -> Self {
        let lower = name.to_lowercase();
        let inner = lower.strip_suffix(".txt").unwrap_or(&lower);

        match inner.rsplit_once('.').map(|(_, ext)| ext) {
            Some("pdf") => Self::Pdf,
            Some("png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp" | "webp") => Self::Image,
            _ => Self::Text,
        }
    }
}

/// Where an invoice came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    pub kind: SourceKind,
}

/// An invoice record as handed to storage by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Identifier: `{vendor}__{invoice_number}`.
    pub id: String,

    pub vendor: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<Decimal>,

    /// Currency code (default: USD).
    #[serde(default = "default_currency")]
    pub currency: String,

    pub source: SourceInfo,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Invoice {
    /// Build an invoice record from extracted fields.
    ///
    /// When no invoice number was found the id falls back to the source file
    /// stem, then to `unknown`.
    pub fn from_fields(
        fields: ParsedInvoiceFields,
        subtotal: Option<Decimal>,
        tax: Option<Decimal>,
        currency: impl Into<String>,
        source: SourceInfo,
    ) -> Self {
        let key = fields.invoice_number.clone().unwrap_or_else(|| {
            source
                .filename
                .as_deref()
                .map(file_stem)
                .filter(|s| !s.is_empty())
                .unwrap_or("unknown")
                .to_string()
        });

        Self {
            id: format!("{}__{}", fields.vendor, key),
            vendor: fields.vendor,
            invoice_number: fields.invoice_number,
            invoice_date: fields.invoice_date,
            due_date: fields.due_date,
            total: fields.total,
            subtotal,
            tax,
            currency: currency.into(),
            source,
        }
    }

    /// Whether the due date falls within `days` days from `today` (inclusive).
    ///
    /// A window reaching past the last representable date has no upper end.
    pub fn is_due_within(&self, today: NaiveDate, days: i64) -> bool {
        let (Some(due), Ok(days)) = (self.due_date, u64::try_from(days)) else {
            return false;
        };

        due >= today
            && today
                .checked_add_days(Days::new(days))
                .is_none_or(|end| due <= end)
    }

    /// Validate the invoice data and return any issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.invoice_number.is_none() {
            issues.push("Missing invoice number".to_string());
        }

        if self.invoice_date.is_none() {
            issues.push("Missing invoice date".to_string());
        }

        match self.total {
            None => issues.push("Missing total".to_string()),
            Some(total) if total.is_zero() => issues.push("Total is zero".to_string()),
            Some(_) => {}
        }

        if let (Some(issued), Some(due)) = (self.invoice_date, self.due_date) {
            if due < issued {
                issues.push(format!("Due date ({}) precedes invoice date ({})", due, issued));
            }
        }

        // Subtotal plus tax should reproduce the total, within a cent.
        if let (Some(total), Some(subtotal), Some(tax)) = (self.total, self.subtotal, self.tax) {
            if (subtotal + tax - total).abs() > Decimal::new(1, 2) {
                issues.push(format!(
                    "Subtotal ({}) plus tax ({}) differs from total ({})",
                    subtotal, tax, total
                ));
            }
        }

        issues
    }
}

fn file_stem(name: &str) -> &str {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match base.rfind('.') {
        Some(pos) if pos > 0 => &base[..pos],
        _ => base,
    }
}

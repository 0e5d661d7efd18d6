//! Common regex patterns for invoice field extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Legal-entity suffix alternatives, longest spellings reachable through
/// backtracking (`Co` fails its word boundary inside `Company`/`Corp`).
const COMPANY_SUFFIX: &str = r"Inc\.?|LLC|L\.?L\.?C\.?|Ltd\.?|Co\.?|Company|Corp\.?|Corporation";

/// Numeric and textual date tokens.
const DATE_VALUE: &str = concat!(
    r"(\d{4}[/.\-]\d{1,2}[/.\-]\d{1,2}",
    r"|\d{1,2}[/.\-]\d{1,2}[/.\-]\d{2,4}",
    r"|(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{1,2},?\s+\d{4}",
    r"|\d{1,2}\s+(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?,?\s+\d{4})\b"
);

lazy_static! {
    // Line cleanup
    pub static ref NOISE_CHARS: Regex = Regex::new(
        r"[^\p{L}\p{N}&'.\-()\s]"
    ).unwrap();

    pub static ref MULTI_WHITESPACE: Regex = Regex::new(
        r"\s{2,}"
    ).unwrap();

    // Dates
    pub static ref DATE_ANY: Regex = Regex::new(
        &format!(r"(?i)\b{}", DATE_VALUE)
    ).unwrap();

    pub static ref ISSUE_DATE: Regex = Regex::new(
        &format!(
            r"(?i)\b(?:invoice\s*date|inv\.?\s*date|issue\s*date|date\s*of\s*issue|date\s*issued|date)\s*[:\-]?\s*{}",
            DATE_VALUE
        )
    ).unwrap();

    pub static ref DUE_DATE: Regex = Regex::new(
        &format!(r"(?i)\b(?:due\s*date|due)\s*[:\-]?\s*{}", DATE_VALUE)
    ).unwrap();

    // Amounts: optional currency marker, thousands groups, two decimals
    pub static ref MONEY: Regex = Regex::new(
        r"(?i)(?:\$|USD\s*|EUR\s*|€|£|GBP\s*)?([0-9]{1,3}(?:,[0-9]{3})*\.[0-9]{2}|[0-9]+\.[0-9]{2})\b"
    ).unwrap();

    // Summary lines
    pub static ref TOTAL_WORD: Regex = Regex::new(
        r"(?i)\btotal\b"
    ).unwrap();

    pub static ref SUBTOTAL_WORD: Regex = Regex::new(
        r"(?i)\bsub[\s\-]*total"
    ).unwrap();

    pub static ref TAX_WORD: Regex = Regex::new(
        r"(?i)\btax(?:es)?\b"
    ).unwrap();

    // Vendor
    pub static ref BILL_OR_SHIP_TO: Regex = Regex::new(
        r"(?i)\b(?:bill|ship)\s*to\b"
    ).unwrap();

    pub static ref VENDOR_WITH_SUFFIX: Regex = Regex::new(
        &format!(
            r"(?i)([A-Z][A-Za-z&'.\-]+(?:[ \t]+[A-Z][A-Za-z&'.\-]+){{0,5}})[ \t]+({})\b",
            COMPANY_SUFFIX
        )
    ).unwrap();

    pub static ref NAME_THEN_SUFFIX: Regex = Regex::new(
        &format!(r"(?i)^(.*?)[ \t]+({})\b", COMPANY_SUFFIX)
    ).unwrap();

    pub static ref SUFFIX_KEYWORD: Regex = Regex::new(
        r"(?i)\b(?:inc\.?|llc|l\.l\.c\.?|ltd\.?|co\.?|corp\.?|company|corporation)\b"
    ).unwrap();

    pub static ref BARE_SUFFIX: Regex = Regex::new(
        &format!(r"(?i)^(?:{})\.?$", COMPANY_SUFFIX)
    ).unwrap();

    pub static ref BOILERPLATE: Regex = Regex::new(
        r"(?i)\b(?:invoice|bill\s*to|ship\s*to|qty|quantity|description|unit\s*price|amount|sub\s*total|subtotal|total|sales\s*tax|tax|balance|terms|conditions|remit|p\.?o\.?|date|due|page)\b"
    ).unwrap();

    pub static ref HEADER_NOISE: Regex = Regex::new(
        r"(?i)^(?:invoice|bill\s*to|ship\s*to|qty|quantity|description|unit\s*price|amount|sub\s*total|subtotal|total|sales\s*tax|tax|balance|terms|conditions|remit|p\.?o\.?|date|due|page)\b"
    ).unwrap();

    pub static ref INVOICE_WORD: Regex = Regex::new(
        r"(?i)\binvoice\b"
    ).unwrap();

    // Invoice number patterns
    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"(?i)invoice\s*(?:no\.?|number|#)?\s*[:\-]?\s*([A-Z]{0,4}-?\d{2,})"
    ).unwrap();

    pub static ref INVOICE_NUMBER_FALLBACK: Regex = Regex::new(
        r"(?i)\b(INV[\s\-]?\d{2,})"
    ).unwrap();

    pub static ref INVOICE_NUMBER_SHORT: Regex = Regex::new(
        r"(?i)invoice\s*(?:#|no\.?|number)\s*[:#]?\s*([A-Z]{1,6}-\d{1,2})\b"
    ).unwrap();

    pub static ref TRUNCATED_ID: Regex = Regex::new(
        r"^([A-Z]+-)(\d{1,2})$"
    ).unwrap();

    pub static ref INVOICE_ID_SHAPE: Regex = Regex::new(
        r"^[A-Z0-9]+(?:[-/][A-Z0-9]+)*$"
    ).unwrap();
}

//! Amount extraction for invoice text.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{MONEY, SUBTOTAL_WORD, TAX_WORD, TOTAL_WORD};
use super::{ExtractionMatch, FieldExtractor};

/// Money field extractor.
pub struct MoneyExtractor;

impl MoneyExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MoneyExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for MoneyExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for caps in MONEY.captures_iter(text) {
            let digits = caps[1].replace(',', "");

            if let Ok(amount) = Decimal::from_str(&digits) {
                let full_match = caps.get(0).unwrap();
                results.push(
                    ExtractionMatch::new(amount, 0.8, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                );
            }
        }

        results
    }
}

/// Amounts on a line, left to right, thousands separators removed.
pub fn tokenize_money(line: &str) -> Vec<Decimal> {
    MoneyExtractor::new()
        .extract_all(line)
        .into_iter()
        .map(|m| m.value)
        .collect()
}

/// Extracted summary amounts from an invoice.
#[derive(Debug, Clone, Default)]
pub struct InvoiceAmounts {
    /// Grand total.
    pub total: Option<ExtractionMatch<Decimal>>,
    /// Amount before tax.
    pub subtotal: Option<ExtractionMatch<Decimal>>,
    /// Tax amount.
    pub tax: Option<ExtractionMatch<Decimal>>,
}

fn is_total_line(line: &str) -> bool {
    TOTAL_WORD.is_match(line) && !SUBTOTAL_WORD.is_match(line) && !TAX_WORD.is_match(line)
}

/// Last amount on the first line accepted by `accept`.
///
/// The scan stops at that line even when it carries no amount.
fn last_amount_on_first_line(
    lines: &[&str],
    accept: impl Fn(&str) -> bool,
    confidence: f32,
) -> Option<ExtractionMatch<Decimal>> {
    let line = lines.iter().copied().find(|l| accept(*l))?;
    let amount = tokenize_money(line).pop()?;
    Some(ExtractionMatch::new(amount, confidence, line))
}

/// Grand total: last amount on the first line mentioning "total" that is
/// neither a subtotal nor a tax line.
///
/// A label is often followed by a running subtotal, discount and total on
/// one line, so the rightmost amount wins.
pub fn extract_total(lines: &[&str]) -> Option<ExtractionMatch<Decimal>> {
    last_amount_on_first_line(lines, is_total_line, 0.9)
}

/// Subtotal: last amount on the first subtotal line.
pub fn extract_subtotal(lines: &[&str]) -> Option<ExtractionMatch<Decimal>> {
    last_amount_on_first_line(lines, |l| SUBTOTAL_WORD.is_match(l), 0.85)
}

/// Tax: last amount on the first tax line that is not a total line.
pub fn extract_tax(lines: &[&str]) -> Option<ExtractionMatch<Decimal>> {
    last_amount_on_first_line(
        lines,
        |l| TAX_WORD.is_match(l) && !TOTAL_WORD.is_match(l),
        0.85,
    )
}

/// Extract total, subtotal and tax from invoice lines.
pub fn extract_amounts(lines: &[&str]) -> InvoiceAmounts {
    InvoiceAmounts {
        total: extract_total(lines),
        subtotal: extract_subtotal(lines),
        tax: extract_tax(lines),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_tokenize_money() {
        assert_eq!(
            tokenize_money("Widget 2 x $1,234.50 = USD 2,469.00"),
            vec![dec("1234.50"), dec("2469.00")]
        );
        assert_eq!(tokenize_money("Total: 11.00"), vec![dec("11.00")]);
        assert_eq!(tokenize_money("€ 12,345,678.90"), vec![dec("12345678.90")]);
        assert!(tokenize_money("Qty 3, no decimals 45").is_empty());
    }

    #[test]
    fn test_money_extractor_positions() {
        let all = MoneyExtractor::new().extract_all("Due $5.00 now");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].position, Some((4, 9)));
        assert_eq!(all[0].source, "$5.00");
    }

    #[test]
    fn test_total_skips_subtotal_and_tax() {
        let lines = ["Subtotal: $10.00", "Tax: $1.00", "Total: $11.00"];
        let total = extract_total(&lines).unwrap();
        assert_eq!(total.value, dec("11.00"));
        assert_eq!(total.source, "Total: $11.00");
    }

    #[test]
    fn test_total_takes_last_amount_on_line() {
        let lines = ["Total Due: $5.00 $50.00"];
        assert_eq!(extract_total(&lines).unwrap().value, dec("50.00"));
    }

    #[test]
    fn test_total_word_boundaries() {
        let lines = [
            "Sub Total 10.00",
            "Sub-total 10.00",
            "Total incl. tax 12.00",
            "Totally unrelated 99.99",
            "GRAND TOTAL $13.00",
        ];
        assert_eq!(extract_total(&lines).unwrap().value, dec("13.00"));
    }

    #[test]
    fn test_total_stops_at_first_qualifying_line() {
        let lines = ["Description Qty Total", "Total: $11.00"];
        assert!(extract_total(&lines).is_none());
    }

    #[test]
    fn test_no_total() {
        assert!(extract_total(&[]).is_none());
        assert!(extract_total(&["Subtotal: $10.00", "Tax: $1.00"]).is_none());
    }

    #[test]
    fn test_extract_amounts() {
        let lines = [
            "Subtotal: $1,000.00",
            "Sales Tax (8%): $80.00",
            "Total: $1,080.00",
        ];

        let amounts = extract_amounts(&lines);
        assert_eq!(amounts.total.unwrap().value, dec("1080.00"));
        assert_eq!(amounts.subtotal.unwrap().value, dec("1000.00"));
        assert_eq!(amounts.tax.unwrap().value, dec("80.00"));
    }
}

//! Date resolution for invoice text.
//!
//! Invoices mix `MM/DD/YYYY` and `DD/MM/YYYY` without declaring a locale.
//! The resolver reads a token as month-first unless the first part cannot be
//! a month (> 12) while the second can, in which case the two are swapped.
//! This is a fixed policy, not a guess: `04/05/2024` is always April 5th.

use chrono::{Datelike, NaiveDate};

use super::patterns::{DATE_ANY, DUE_DATE, ISSUE_DATE};
use super::{ExtractionMatch, FieldExtractor};

/// Years that print as a plain `YYYY`.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1000..=9999;

/// Formats tried when a token does not decompose into numeric parts.
const GENERIC_FORMATS: [&str; 9] = [
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
];

/// Resolve a date token such as `03/25/2024`, `2024-03-25` or `25.03.24`.
///
/// Returns `None` rather than a wrong date when the token cannot be read.
pub fn resolve_date(token: &str) -> Option<NaiveDate> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    resolve_numeric(token)
        .or_else(|| parse_generic(token))
        .filter(|date| YEAR_RANGE.contains(&date.year()))
}

fn ymd(year: u32, month: u32, day: u32) -> Option<NaiveDate> {
    let year = i32::try_from(year).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn resolve_numeric(token: &str) -> Option<NaiveDate> {
    let unified = token.replace(['.', '-'], "/");
    let parts: Vec<&str> = unified.split('/').map(str::trim).collect();

    if !(2..=3).contains(&parts.len())
        || parts
            .iter()
            .any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()))
    {
        return None;
    }

    let nums: Vec<u32> = parts
        .iter()
        .map(|p| p.parse().ok())
        .collect::<Option<_>>()?;

    // YYYY/MM/DD, or YYYY/MM for the first of the month
    if parts[0].len() == 4 {
        let day = nums.get(2).copied().unwrap_or(1);
        return ymd(nums[0], nums[1], day);
    }

    match nums.as_slice() {
        &[a, b, c] => {
            let year = if c < 100 { 2000 + c } else { c };
            let (month, day) = if a > 12 && b <= 12 { (b, a) } else { (a, b) };
            ymd(year, month, day)
        }
        // MM/YYYY
        &[month, year] if parts[1].len() == 4 => ymd(year, month, 1),
        _ => None,
    }
}

fn parse_generic(token: &str) -> Option<NaiveDate> {
    let simplified = token
        .replace('.', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    GENERIC_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(token, fmt)
            .or_else(|_| NaiveDate::parse_from_str(&simplified, fmt))
            .ok()
    })
}

/// Date field extractor returning every resolvable date token.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        DATE_ANY
            .captures_iter(text)
            .filter_map(|caps| {
                let token = caps.get(1)?;
                let date = resolve_date(token.as_str())?;
                Some(
                    ExtractionMatch::new(date, 0.6, token.as_str())
                        .with_position(token.start(), token.end()),
                )
            })
            .collect()
    }
}

/// Extracted dates from an invoice.
#[derive(Debug, Clone, Default)]
pub struct InvoiceDates {
    /// Issue date.
    pub invoice_date: Option<ExtractionMatch<NaiveDate>>,
    /// Payment due date.
    pub due_date: Option<ExtractionMatch<NaiveDate>>,
}

/// Locate the issue and due dates in invoice text.
pub fn extract_dates(text: &str) -> InvoiceDates {
    let due_date = DUE_DATE.captures_iter(text).find_map(|caps| {
        let token = caps.get(1)?;
        let date = resolve_date(token.as_str())?;
        Some(
            ExtractionMatch::new(date, 0.95, token.as_str())
                .with_position(token.start(), token.end()),
        )
    });

    let labeled = ISSUE_DATE.captures_iter(text).find_map(|caps| {
        let label = caps.get(0)?;
        if preceded_by_due(text, label.start()) {
            return None;
        }
        let token = caps.get(1)?;
        let date = resolve_date(token.as_str())?;
        Some(
            ExtractionMatch::new(date, 0.95, token.as_str())
                .with_position(token.start(), token.end()),
        )
    });

    // Without a label, the first date that is not the due date
    let invoice_date = labeled.or_else(|| {
        let due_position = due_date.as_ref().and_then(|d| d.position);
        DateExtractor::new()
            .extract_all(text)
            .into_iter()
            .find(|m| m.position != due_position)
    });

    InvoiceDates {
        invoice_date,
        due_date,
    }
}

fn preceded_by_due(text: &str, start: usize) -> bool {
    let before = text[..start].trim_end();
    before
        .get(before.len().saturating_sub(3)..)
        .is_some_and(|tail| tail.eq_ignore_ascii_case("due"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_resolve_iso() {
        assert_eq!(resolve_date("2024/03/05"), Some(date(2024, 3, 5)));
        assert_eq!(resolve_date("2024-3-5"), Some(date(2024, 3, 5)));
        assert_eq!(resolve_date("2024.03.05"), Some(date(2024, 3, 5)));
    }

    #[test]
    fn test_resolve_month_first_by_default() {
        assert_eq!(resolve_date("04/05/2024"), Some(date(2024, 4, 5)));
        assert_eq!(resolve_date("03/25/2024"), Some(date(2024, 3, 25)));
    }

    #[test]
    fn test_resolve_day_first_when_unambiguous() {
        assert_eq!(resolve_date("25/03/2024"), Some(date(2024, 3, 25)));
        assert_eq!(resolve_date("15.01.24"), Some(date(2024, 1, 15)));
    }

    #[test]
    fn test_two_digit_year() {
        assert_eq!(resolve_date("1-2-24"), Some(date(2024, 1, 2)));
        assert_eq!(resolve_date("12/31/99"), Some(date(2099, 12, 31)));
    }

    #[test]
    fn test_month_and_year_only() {
        assert_eq!(resolve_date("03/2024"), Some(date(2024, 3, 1)));
        assert_eq!(resolve_date("2024-03"), Some(date(2024, 3, 1)));
    }

    #[test]
    fn test_textual_dates() {
        assert_eq!(resolve_date("March 5, 2024"), Some(date(2024, 3, 5)));
        assert_eq!(resolve_date("Mar. 5, 2024"), Some(date(2024, 3, 5)));
        assert_eq!(resolve_date("5 Mar 2024"), Some(date(2024, 3, 5)));
    }

    #[test]
    fn test_unresolvable() {
        assert_eq!(resolve_date(""), None);
        assert_eq!(resolve_date("garbage"), None);
        assert_eq!(resolve_date("13/13/2024"), None);
        assert_eq!(resolve_date("02/30/2024"), None);
        assert_eq!(resolve_date("1/2/3/4"), None);
    }

    #[test]
    fn test_years_outside_four_digits() {
        assert_eq!(resolve_date("1/2/4294967295"), None);
        assert_eq!(resolve_date("1/2/99999"), None);
        assert_eq!(resolve_date("0000-01-02"), None);
        assert_eq!(resolve_date("1/2/1999"), Some(date(1999, 1, 2)));
    }

    #[test]
    fn test_iso_round_trip() {
        for year in [1000, 1582, 1999, 2000, 2024, 2100, 9999] {
            for month in 1..=12 {
                for day in [1, 9, 13, 28] {
                    let expected = date(year, month, day);
                    let token = format!("{:04}/{:02}/{:02}", year, month, day);
                    assert_eq!(resolve_date(&token), Some(expected), "token {}", token);
                }
            }
        }
    }

    #[test]
    fn test_day_above_twelve_is_never_the_month() {
        for month in 1..=12 {
            for day in 13..=28 {
                let token = format!("{:02}/{:02}/2024", month, day);
                assert_eq!(resolve_date(&token), Some(date(2024, month, day)), "token {}", token);
            }
        }
    }

    #[test]
    fn test_extract_labeled_dates() {
        let text = r#"
            ACME WIDGETS LLC
            Invoice Date: 03/01/2024
            Due Date: 03/31/2024
        "#;

        let dates = extract_dates(text);
        assert_eq!(dates.invoice_date.unwrap().value, date(2024, 3, 1));
        assert_eq!(dates.due_date.unwrap().value, date(2024, 3, 31));
    }

    #[test]
    fn test_due_label_is_not_an_issue_label() {
        let text = "Due Date: 04/15/2024\nDate: 04/01/2024";

        let dates = extract_dates(text);
        assert_eq!(dates.invoice_date.unwrap().value, date(2024, 4, 1));
        assert_eq!(dates.due_date.unwrap().value, date(2024, 4, 15));
    }

    #[test]
    fn test_unlabeled_issue_date() {
        let dates = extract_dates("Acme\n2024-02-10\nDue: 2024-03-10");
        assert_eq!(dates.invoice_date.unwrap().value, date(2024, 2, 10));
        assert_eq!(dates.due_date.unwrap().value, date(2024, 3, 10));

        let dates = extract_dates("Due 03/10/2024");
        assert!(dates.invoice_date.is_none());
        assert!(dates.due_date.is_some());
    }

    #[test]
    fn test_textual_labeled_date() {
        let dates = extract_dates("Invoice Date: March 5, 2024");
        assert_eq!(dates.invoice_date.unwrap().value, date(2024, 3, 5));
    }

    #[test]
    fn test_date_extractor_positions() {
        let text = "From 01/02/2024 to 2024-02-01";
        let all = DateExtractor::new().extract_all(text);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].position, Some((5, 15)));
        assert_eq!(all[1].value, date(2024, 2, 1));
    }
}

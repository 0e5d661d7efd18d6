//! Vendor name extraction.
//!
//! The issuing organization is printed near the top of the document, but OCR
//! splits, pads and garbles it. Strategies run in order and the first that
//! yields a name wins:
//!
//! 1. a `Name Suffix` match in the header (text before "Bill To"/"Ship To")
//! 2. a name and its suffix split across two consecutive lines
//! 3. the first de-noised line carrying a suffix keyword
//! 4. the best scoring capitalized line above the first "invoice" line
//!
//! A one-word result without a suffix is then replaced by the first
//! multi-word candidate, if there is one.

use tracing::debug;

use super::normalize::{is_titleish, letters_ratio, normalize_line, title_case};
use super::patterns::{
    BARE_SUFFIX, BILL_OR_SHIP_TO, BOILERPLATE, HEADER_NOISE, INVOICE_WORD, NAME_THEN_SUFFIX,
    SUFFIX_KEYWORD, VENDOR_WITH_SUFFIX,
};
use super::{ExtractionMatch, FieldExtractor};
use crate::invoice::lines::LineCollection;

/// Letters of the word most often shredded by OCR at the top of a page.
const INVOICE_LETTERS: &str = "INVOICE";

/// A de-noised header line considered as the vendor name.
#[derive(Debug, Clone, PartialEq)]
struct Candidate {
    /// Position among the non-empty lines of the document.
    index: usize,
    /// Normalized line text.
    line: String,
    score: i32,
}

/// Vendor name extractor.
pub struct VendorExtractor {
    /// Leading lines turned into candidates.
    scan_lines: usize,
    /// Leading lines eligible for the scored fallback.
    score_lines: usize,
}

impl VendorExtractor {
    pub fn new() -> Self {
        Self {
            scan_lines: 20,
            score_lines: 12,
        }
    }

    /// Set how many leading lines are scanned for candidates.
    pub fn with_scan_lines(mut self, lines: usize) -> Self {
        self.scan_lines = lines;
        self
    }

    /// Set how many leading lines enter the scored fallback.
    pub fn with_score_lines(mut self, lines: usize) -> Self {
        self.score_lines = lines;
        self
    }

    fn normalized_lines(&self, text: &str) -> Vec<String> {
        LineCollection::from_text(text)
            .head(self.scan_lines)
            .iter()
            .map(|line| normalize_line(line))
            .collect()
    }

    fn scored_fallback(
        &self,
        lines: &[String],
        candidates: &[Candidate],
    ) -> Option<ExtractionMatch<String>> {
        let first = candidates.first()?;

        // Names sit above the "invoice" banner when there is one below them
        let cutoff = lines
            .iter()
            .position(|l| INVOICE_WORD.is_match(l))
            .filter(|&i| i > first.index)
            .unwrap_or(usize::MAX);

        let best = candidates
            .iter()
            .filter(|c| c.index < self.score_lines && c.index < cutoff)
            .filter(|c| !BARE_SUFFIX.is_match(&c.line))
            .fold(None, |best: Option<&Candidate>, c| match best {
                Some(b) if b.score >= c.score => Some(b),
                _ => Some(c),
            })?;

        Some(ExtractionMatch::new(title_case(&best.line), 0.5, best.line.as_str()))
    }
}

impl Default for VendorExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for VendorExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let lines = self.normalized_lines(text);
        let candidates = collect_candidates(&lines);

        let found = suffix_in_header(text)
            .inspect(|m| debug!("Vendor from header suffix: {}", m.value))
            .or_else(|| {
                merge_split_lines(&candidates)
                    .inspect(|m| debug!("Vendor from merged lines: {}", m.value))
            })
            .or_else(|| {
                single_line_suffix(&candidates)
                    .inspect(|m| debug!("Vendor from suffixed line: {}", m.value))
            })
            .or_else(|| {
                self.scored_fallback(&lines, &candidates)
                    .inspect(|m| debug!("Vendor from scored line: {}", m.value))
            })?;

        Some(sanity_gate(found, &candidates))
    }

    /// All candidate lines, best score first.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut candidates = collect_candidates(&self.normalized_lines(text));
        candidates.sort_by(|a, b| b.score.cmp(&a.score));

        candidates
            .into_iter()
            .map(|c| ExtractionMatch::new(title_case(&c.line), 0.5, c.line))
            .collect()
    }
}

fn collect_candidates(lines: &[String]) -> Vec<Candidate> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !is_noise(line))
        .map(|(index, line)| Candidate {
            index,
            line: line.clone(),
            score: score_line(line),
        })
        .collect()
}

/// Whether a normalized line cannot be a vendor name.
///
/// Only lines that open with a label are boilerplate; names such as
/// "Summit Tax Partners" contain label words too.
fn is_noise(line: &str) -> bool {
    if BARE_SUFFIX.is_match(line) {
        return false;
    }

    line.chars().count() < 3
        || line.chars().any(char::is_numeric)
        || HEADER_NOISE.is_match(line)
        || is_invoice_fragment(line)
}

/// Short runs made of the letters of "INVOICE" (`NVOIC`, `IOE`, ...).
fn is_invoice_fragment(line: &str) -> bool {
    let chars: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
    if !(2..=7).contains(&chars.len()) {
        return false;
    }

    let from_invoice = chars
        .iter()
        .filter(|c| INVOICE_LETTERS.contains(c.to_ascii_uppercase()))
        .count();

    from_invoice as f32 / chars.len() as f32 >= 0.8
}

fn score_line(line: &str) -> i32 {
    let words: Vec<&str> = line.split_whitespace().collect();

    let mut score = 2 * words.iter().filter(|w| is_title_word(w)).count() as i32;
    if words
        .windows(2)
        .any(|pair| starts_upper(pair[0]) && starts_upper(pair[1]))
    {
        score += 1;
    }
    if line.chars().any(char::is_numeric) {
        score -= 3;
    }

    score
}

fn starts_upper(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

/// `Acme`, not `ACME` or `acme`.
fn is_title_word(word: &str) -> bool {
    let mut chars = word.chars();
    chars.next().is_some_and(char::is_uppercase)
        && chars.clone().next().is_some()
        && chars.all(char::is_lowercase)
}

/// Canonical spelling of a company suffix.
fn normalize_suffix(suffix: &str) -> String {
    let key: String = suffix
        .chars()
        .filter(|c| *c != '.' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();

    let canonical = match key.as_str() {
        "inc" => "Inc.",
        "llc" => "LLC",
        "ltd" => "Ltd.",
        "co" => "Co.",
        "corp" => "Corp.",
        "company" => "Company",
        "corporation" => "Corporation",
        _ => return suffix.to_string(),
    };

    canonical.to_string()
}

fn format_vendor(name: &str, suffix: &str) -> String {
    format!("{} {}", title_case(name), normalize_suffix(suffix))
}

fn suffix_in_header(text: &str) -> Option<ExtractionMatch<String>> {
    let header = match BILL_OR_SHIP_TO.find(text) {
        Some(m) if !text[..m.start()].trim().is_empty() => &text[..m.start()],
        _ => text,
    };

    let caps = VENDOR_WITH_SUFFIX.captures(header)?;
    let whole = caps.get(0)?;

    Some(
        ExtractionMatch::new(format_vendor(&caps[1], &caps[2]), 0.95, whole.as_str())
            .with_position(whole.start(), whole.end()),
    )
}

fn merge_split_lines(candidates: &[Candidate]) -> Option<ExtractionMatch<String>> {
    candidates.windows(2).find_map(|pair| {
        // Only lines that follow each other in the document
        if pair[1].index != pair[0].index + 1 {
            return None;
        }

        let (first, second) = (&pair[0].line, &pair[1].line);
        let source = format!("{}\n{}", first, second);

        if BARE_SUFFIX.is_match(second) {
            if SUFFIX_KEYWORD.is_match(first) {
                return None;
            }
            return Some(ExtractionMatch::new(format_vendor(first, second), 0.85, source));
        }

        merge_across(first, second).map(|vendor| ExtractionMatch::new(vendor, 0.85, source))
    })
}

/// Match a `Name Suffix` that wraps from `first` onto `second`.
fn merge_across(first: &str, second: &str) -> Option<String> {
    let joined = format!("{} {}", first, second);
    let caps = VENDOR_WITH_SUFFIX.captures(&joined)?;
    let whole = caps.get(0)?;

    if whole.start() >= first.len() || whole.end() <= first.len() + 1 {
        return None;
    }

    // A second line that names a company on its own is not a continuation
    let own_name_words = NAME_THEN_SUFFIX
        .captures(second)
        .map_or(0, |c| c[1].split_whitespace().count());
    if own_name_words > 1 {
        return None;
    }

    Some(format_vendor(&caps[1], &caps[2]))
}

fn single_line_suffix(candidates: &[Candidate]) -> Option<ExtractionMatch<String>> {
    candidates
        .iter()
        .filter(|c| SUFFIX_KEYWORD.is_match(&c.line))
        .find_map(|c| {
            let caps = NAME_THEN_SUFFIX.captures(&c.line)?;
            let name = caps[1].trim();
            if name.is_empty() {
                return None;
            }
            Some(ExtractionMatch::new(
                format_vendor(name, &caps[2]),
                0.8,
                c.line.as_str(),
            ))
        })
}

fn sanity_gate(found: ExtractionMatch<String>, candidates: &[Candidate]) -> ExtractionMatch<String> {
    if found.value.split_whitespace().count() >= 2 || SUFFIX_KEYWORD.is_match(&found.value) {
        return found;
    }

    candidates
        .iter()
        .find(|c| {
            c.line.split_whitespace().count() >= 2 && title_case(&c.line) != found.value
        })
        .map(|c| {
            debug!("Replacing one-word vendor {:?} with {:?}", found.value, c.line);
            ExtractionMatch::new(title_case(&c.line), 0.4, c.line.as_str())
        })
        .unwrap_or(found)
}

/// Whether an externally supplied vendor name can be kept as-is.
///
/// Accepts names of at least 3 characters that carry a company suffix, or
/// that look like a proper name: mostly capitalized words, mostly letters,
/// no e-mail address and no invoice boilerplate.
pub fn passes_trust_gate(vendor: &str) -> bool {
    let vendor = vendor.trim();
    if vendor.chars().count() < 3 {
        return false;
    }

    SUFFIX_KEYWORD.is_match(vendor)
        || (is_titleish(vendor)
            && letters_ratio(vendor) > 0.6
            && !vendor.contains('@')
            && !BOILERPLATE.is_match(vendor))
}

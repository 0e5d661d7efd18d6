//! Line cleanup for OCR and PDF text.

use super::patterns::{MULTI_WHITESPACE, NOISE_CHARS};

/// Words kept upper-cased by [`title_case`].
const ACRONYMS: [&str; 9] = ["LLC", "L.L.C.", "INC", "INC.", "LTD", "CO", "CO.", "CORP", "USA"];

/// Clean a single line of OCR output.
///
/// Symbols other than letters, digits, `&'.-()` become spaces, whitespace
/// runs collapse, and leading punctuation left over from the scan
/// (`. - @ _ , ; : ( )`) is stripped. Normalizing twice changes nothing.
pub fn normalize_line(line: &str) -> String {
    let cleaned = NOISE_CHARS.replace_all(line, " ");
    let collapsed = MULTI_WHITESPACE.replace_all(&cleaned, " ");

    collapsed
        .trim_start_matches(|c: char| {
            c.is_whitespace() || matches!(c, '.' | '-' | '@' | '_' | ',' | ';' | ':' | '(' | ')')
        })
        .trim()
        .to_string()
}

/// Title-case a name, keeping company acronyms upper-cased.
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let upper = word.to_uppercase();
            if ACRONYMS.contains(&upper.as_str()) {
                return upper;
            }

            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Share of letters among the non-whitespace characters of `s`.
pub fn letters_ratio(s: &str) -> f32 {
    let total = s.chars().filter(|c| !c.is_whitespace()).count().max(1);
    let letters = s.chars().filter(|c| c.is_alphabetic()).count();
    letters as f32 / total as f32
}

/// Whether at least 60% of the words start with an uppercase letter.
pub fn is_titleish(s: &str) -> bool {
    let words: Vec<&str> = s.split_whitespace().collect();
    if words.is_empty() {
        return false;
    }

    let capitalized = words
        .iter()
        .filter(|w| w.chars().next().is_some_and(char::is_uppercase))
        .count();

    capitalized as f32 / words.len() as f32 >= 0.6
}

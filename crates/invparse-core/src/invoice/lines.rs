//! Line view over raw document text.

use std::ops::Deref;

/// Ordered, trimmed, non-empty lines of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineCollection<'a> {
    lines: Vec<&'a str>,
}

impl<'a> LineCollection<'a> {
    /// Split text on line breaks, dropping blank lines.
    pub fn from_text(text: &'a str) -> Self {
        let lines = text
            .split('\n')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        Self { lines }
    }

    /// The first `n` lines (or all of them).
    pub fn head(&self, n: usize) -> &[&'a str] {
        &self.lines[..n.min(self.lines.len())]
    }
}

impl<'a> Deref for LineCollection<'a> {
    type Target = [&'a str];

    fn deref(&self) -> &Self::Target {
        &self.lines
    }
}

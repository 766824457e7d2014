// WHY: terminators inside a whitelisted word never end a sentence, so boundary candidates
// are checked against every whitelist occurrence in the buffer

use std::ops::Range;

/// Words containing terminator characters that must not split sentences
pub const DEFAULT_ABBREVIATIONS: &[&str] = &[
    "Mr.", "Mrs.", "Ms.", "Dr.", "Prof.", "Miss.",
    "genn.ai", "Co., Ltd.",
    "a.m.", "p.m.", "U.S.A.", "B.C", "A.D.",
    "Jan.", "Feb.", "Mar.", "Apr.", "Jun.", "Jul.", "Aug.",
    "Sep.", "Oct.", "Nov.", "Dec.",
];

/// Byte ranges of a text covered by whitelisted words
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoveredSpans(Vec<Range<usize>>);

impl CoveredSpans {
    /// Does any covered range overlap `range`?
    pub fn intersects(&self, range: &Range<usize>) -> bool {
        self.0
            .iter()
            .any(|covered| covered.start < range.end && range.start < covered.end)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Whitelist lookup over a sentence buffer
#[derive(Debug, Clone)]
pub struct AbbreviationChecker {
    abbreviations: Vec<String>,
}

impl AbbreviationChecker {
    /// Create a checker over the given whitelist; empty entries are ignored
    pub fn new<S: AsRef<str>>(words: &[S]) -> Self {
        let mut abbreviations: Vec<String> = words
            .iter()
            .map(|w| w.as_ref().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        abbreviations.sort();
        abbreviations.dedup();
        Self { abbreviations }
    }

    /// Check if a word is a known abbreviation
    pub fn is_abbreviation(&self, word: &str) -> bool {
        self.abbreviations.iter().any(|a| a == word)
    }

    /// Every occurrence of every whitelisted word in `text`
    pub fn covered_spans(&self, text: &str) -> CoveredSpans {
        let mut spans = Vec::new();
        for word in &self.abbreviations {
            for (start, matched) in text.match_indices(word.as_str()) {
                spans.push(start..start + matched.len());
            }
        }
        spans.sort_by_key(|r| r.start);
        CoveredSpans(spans)
    }
}

impl Default for AbbreviationChecker {
    fn default() -> Self {
        Self::new(DEFAULT_ABBREVIATIONS)
    }
}

// WHY: One configuration-driven boundary detector shared by every format parser
// Stateless after construction so a single instance can serve concurrent parses

use regex_automata::{meta::Regex, Input};
use std::ops::Range;
use tracing::debug;

use crate::config::ExtractorConfig;
use crate::error::ConfigError;
use crate::sentence::OffsetText;

pub mod abbreviations;

pub use abbreviations::{AbbreviationChecker, CoveredSpans};

/// Sentence spans found in a buffer plus the start of the unconsumed tail
///
/// Spans are half-open byte ranges on char boundaries. The tail starting at `remainder`
/// is not an error: callers append more text to it and extract again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub spans: Vec<Range<usize>>,
    pub remainder: usize,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// Sentence boundary extractor compiled from terminator and quotation characters
#[derive(Debug)]
pub struct SentenceExtractor {
    pattern: Regex,
    terminators: Vec<char>,
    abbreviations: AbbreviationChecker,
    joiner: &'static str,
}

impl SentenceExtractor {
    /// Compile the boundary pattern; an empty terminator set is a fatal configuration error
    pub fn new(config: &ExtractorConfig) -> Result<Self, ConfigError> {
        if config.terminators.is_empty() {
            return Err(ConfigError::EmptyTerminators);
        }

        for terminator in &config.terminators {
            debug!("\"{}\" is added as an end of sentence character", terminator);
        }
        for quotation in &config.right_quotations {
            debug!("\"{}\" is added as a right quotation character", quotation);
        }

        let pattern = end_of_sentence_pattern(&config.terminators, &config.right_quotations);
        debug!(%pattern, "Compiled end of sentence pattern");

        Ok(Self {
            pattern: Regex::new(&pattern)?,
            terminators: config.terminators.clone(),
            abbreviations: AbbreviationChecker::new(&config.abbreviations),
            joiner: config.broken_line_joiner(),
        })
    }

    /// Create extractor with default English rules
    pub fn with_default_rules() -> Result<Self, ConfigError> {
        Self::new(&ExtractorConfig::default())
    }

    pub fn for_language(lang: &str) -> Result<Self, ConfigError> {
        Self::new(&ExtractorConfig::for_language(lang))
    }

    /// String inserted where physical lines are folded into one sentence
    pub fn joiner(&self) -> &str {
        self.joiner
    }

    pub fn is_terminator(&self, ch: char) -> bool {
        self.terminators.contains(&ch)
    }

    /// Exclusive byte end of the first sentence in `text`, if any
    pub fn sentence_end(&self, text: &str) -> Option<usize> {
        let covered = self.abbreviations.covered_spans(text);
        self.end_position(text, 0, &covered)
    }

    /// Split `text` into consecutive sentence spans and an unconsumed remainder
    pub fn extract(&self, text: &str) -> Extraction {
        let covered = self.abbreviations.covered_spans(text);
        let mut spans = Vec::new();
        let mut start = 0;

        while let Some(end) = self.end_position(text, start, &covered) {
            if end <= start {
                break;
            }
            spans.push(start..end);
            start = end;
        }

        Extraction {
            spans,
            remainder: start,
        }
    }

    /// Extract over positioned text, returning one piece per sentence and the tail
    pub fn split_text(&self, text: &OffsetText) -> (Vec<OffsetText>, OffsetText) {
        let extraction = self.extract(text.as_str());
        let sentences = extraction
            .spans
            .iter()
            .map(|span| text.slice(span.clone()))
            .collect();
        let rest = text.slice(extraction.remainder..text.as_str().len());
        (sentences, rest)
    }

    /// First match at or after `from` that does not overlap a whitelisted word
    fn find_unprotected(
        &self,
        text: &str,
        from: usize,
        covered: &CoveredSpans,
    ) -> Option<Range<usize>> {
        let mut from = from;
        while from < text.len() {
            let found = self.pattern.find(Input::new(text).range(from..))?;
            let range = found.range();
            if !covered.intersects(&range) {
                return Some(range);
            }
            from = range.end;
        }
        None
    }

    fn end_position(&self, text: &str, from: usize, covered: &CoveredSpans) -> Option<usize> {
        let mut from = from;
        loop {
            let found = self.find_unprotected(text, from, covered)?;
            if found.end == text.len() {
                // a terminator closing the buffer always ends the sentence
                return Some(found.end);
            }

            let terminator = char_at(text, found.start);
            if is_basic_latin(terminator) && char_at(text, found.end).is_whitespace() {
                return Some(found.end);
            }

            let last = text[..found.end].chars().next_back().unwrap_or(terminator);
            let next = found.end;
            let following = self
                .pattern
                .find(Input::new(text).range(next..))
                .map(|m| m.start());

            match following {
                // CJK terminators need no trailing space
                Some(at) if at != next && !is_basic_latin(char_at(text, at)) => return Some(next),
                None if !is_basic_latin(last) => return Some(next),
                // a run of terminators like "..." ends on its last char
                Some(at) if at == next => {
                    let after = next + char_at(text, next).len_utf8();
                    if after == text.len() {
                        return Some(after);
                    }
                }
                _ => {}
            }
            from = next;
        }
    }
}

/// Alternation of every terminator followed by a right quotation, then bare terminators
fn end_of_sentence_pattern(terminators: &[char], right_quotations: &[char]) -> String {
    let mut alternatives = Vec::with_capacity(terminators.len() * (right_quotations.len() + 1));
    for quotation in right_quotations {
        for terminator in terminators {
            alternatives.push(format!("{}{}", escape(*terminator), escape(*quotation)));
        }
    }
    for terminator in terminators {
        alternatives.push(escape(*terminator));
    }
    alternatives.join("|")
}

fn escape(ch: char) -> String {
    if "\\.+*?()|[]{}^$#&-~".contains(ch) {
        format!("\\{ch}")
    } else {
        ch.to_string()
    }
}

fn char_at(text: &str, byte: usize) -> char {
    text[byte..].chars().next().unwrap_or('\0')
}

fn is_basic_latin(ch: char) -> bool {
    ch <= '\u{7F}'
}

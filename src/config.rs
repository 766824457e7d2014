// WHY: extraction rules come from an external symbol table, never hard-coded in parsers
// Serde derives let a configuration collaborator hand us JSON/TOML/XML-derived values directly

use serde::{Deserialize, Serialize};

use crate::sentence_extractor::abbreviations::DEFAULT_ABBREVIATIONS;

/// Language code whose broken lines are joined without any separator
pub const JAPANESE: &str = "ja";

/// Configuration for sentence boundary extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Language code, drives the broken-line joiner
    pub lang: String,
    /// Characters ending a sentence (full stop, question mark, exclamation mark roles)
    pub terminators: Vec<char>,
    /// Closing quotation characters that may directly follow a terminator
    pub right_quotations: Vec<char>,
    /// Words containing terminators that never end a sentence
    pub abbreviations: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            terminators: vec!['.', '?', '!'],
            right_quotations: vec!['\'', '"'],
            abbreviations: DEFAULT_ABBREVIATIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ExtractorConfig {
    /// Default symbols for a language; anything other than Japanese gets Latin punctuation
    pub fn for_language(lang: &str) -> Self {
        if lang == JAPANESE {
            Self {
                lang: lang.to_string(),
                terminators: vec!['。', '？', '！'],
                right_quotations: vec!['」', '』'],
                ..Self::default()
            }
        } else {
            Self {
                lang: lang.to_string(),
                ..Self::default()
            }
        }
    }

    /// String inserted where physical lines are folded into one logical sentence
    pub fn broken_line_joiner(&self) -> &'static str {
        if self.lang == JAPANESE {
            ""
        } else {
            " "
        }
    }
}

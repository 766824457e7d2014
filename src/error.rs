//! Error types for extractor construction and document parsing.
//!
//! Only truly exceptional conditions are errors here: unreadable input and unusable
//! configuration. Structural irregularities in documents are recovered by the parsers.

use thiserror::Error;

/// Failure to build a sentence extractor from its configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no end-of-sentence character is configured")]
    EmptyTerminators,

    #[error("failed to compile sentence boundary pattern: {0}")]
    InvalidPattern(#[from] regex_automata::meta::BuildError),
}

/// Failure to parse a document; no partial document is produced
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

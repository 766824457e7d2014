// WHY: every dialect turns physical lines into builder calls; reading, filename
// bookkeeping and progress logging are shared so a parser only describes its markup

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::ParseError;
use crate::model::{Document, DocumentBuilder};
use crate::reader::LineReader;
use crate::sentence::{OffsetText, Sentence};
use crate::sentence_extractor::SentenceExtractor;

pub mod asciidoc;
pub mod erasing;
pub mod markdown;
pub mod plain;
pub mod portable_object;
pub mod properties;
pub mod review;
pub mod wiki;

pub use asciidoc::AsciiDocParser;
pub use markdown::MarkdownParser;
pub use plain::PlainTextParser;
pub use portable_object::PortableObjectParser;
pub use properties::PropertiesParser;
pub use review::ReviewParser;
pub use wiki::WikiParser;

/// A markup dialect driver
///
/// Implementors only see decoded lines; failing to read them is the only error a parse
/// can produce. Structural irregularities are recovered locally and logged.
pub trait DocumentParser: Send + Sync {
    fn name(&self) -> &'static str;

    /// Feed decoded physical lines (1-based line numbers) into the builder
    fn parse_lines(
        &self,
        lines: &[String],
        extractor: &SentenceExtractor,
        builder: &mut DocumentBuilder,
    );

    fn parse(
        &self,
        input: &mut dyn Read,
        filename: Option<&str>,
        extractor: &SentenceExtractor,
    ) -> Result<Document, ParseError> {
        let (lines, stats) = LineReader::default().read_lines(input, filename.unwrap_or("<input>"))?;
        debug!(parser = self.name(), lines = stats.lines_read, "Parsing document");
        Ok(self.build_document(&lines, filename, extractor))
    }

    /// Parse text already in memory; cannot fail
    fn parse_str(&self, text: &str, extractor: &SentenceExtractor) -> Document {
        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        self.build_document(&lines, None, extractor)
    }

    fn parse_file(&self, path: &Path, extractor: &SentenceExtractor) -> Result<Document, ParseError> {
        let (lines, _) = LineReader::default().read_file_lines(path)?;
        let filename = path.display().to_string();
        Ok(self.build_document(&lines, Some(filename.as_str()), extractor))
    }

    /// Run `parse_lines` over a fresh builder and finish the document
    fn build_document(&self, lines: &[String], filename: Option<&str>, extractor: &SentenceExtractor) -> Document {
        let mut builder = DocumentBuilder::new();
        if let Some(filename) = filename {
            builder.set_filename(filename);
        }
        self.parse_lines(lines, extractor, &mut builder);
        let document = builder.build();
        info!(
            parser = self.name(),
            sections = document.len(),
            sentences = document.sentences().count(),
            "Parsed document"
        );
        document
    }
}

/// Supported input formats; always chosen by the caller, never sniffed from content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Plain,
    Wiki,
    Properties,
    PortableObject,
    AsciiDoc,
    Markdown,
    Review,
}

impl Format {
    pub const ALL: [Format; 7] = [
        Format::Plain,
        Format::Wiki,
        Format::Properties,
        Format::PortableObject,
        Format::AsciiDoc,
        Format::Markdown,
        Format::Review,
    ];

    pub fn parser(self) -> Box<dyn DocumentParser> {
        match self {
            Format::Plain => Box::new(PlainTextParser),
            Format::Wiki => Box::new(WikiParser),
            Format::Properties => Box::new(PropertiesParser),
            Format::PortableObject => Box::new(PortableObjectParser),
            Format::AsciiDoc => Box::new(AsciiDocParser),
            Format::Markdown => Box::new(MarkdownParser),
            Format::Review => Box::new(ReviewParser),
        }
    }

    /// Conventional file extension mapping, for callers that name files by format
    pub fn from_extension(extension: &str) -> Option<Format> {
        match extension.to_ascii_lowercase().as_str() {
            "txt" | "text" => Some(Format::Plain),
            "wiki" => Some(Format::Wiki),
            "properties" => Some(Format::Properties),
            "po" | "pot" => Some(Format::PortableObject),
            "adoc" | "asciidoc" | "asc" => Some(Format::AsciiDoc),
            "md" | "markdown" => Some(Format::Markdown),
            "re" => Some(Format::Review),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Format::Plain => "plain",
            Format::Wiki => "wiki",
            Format::Properties => "properties",
            Format::PortableObject => "po",
            Format::AsciiDoc => "asciidoc",
            Format::Markdown => "markdown",
            Format::Review => "review",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(Format::Plain),
            "wiki" => Ok(Format::Wiki),
            "properties" => Ok(Format::Properties),
            "po" | "portable-object" | "portable_object" => Ok(Format::PortableObject),
            "asciidoc" | "adoc" => Ok(Format::AsciiDoc),
            "markdown" | "md" => Ok(Format::Markdown),
            "review" | "re" => Ok(Format::Review),
            other => Err(format!("unknown document format: {other}")),
        }
    }
}

/// Parse `input` in the given format
pub fn parse(
    format: Format,
    input: &mut dyn Read,
    filename: Option<&str>,
    extractor: &SentenceExtractor,
) -> Result<Document, ParseError> {
    format.parser().parse(input, filename, extractor)
}

/// Split accumulated paragraph text into sentences and hand them to the builder,
/// returning whatever trails the last boundary
pub(crate) fn emit_sentences(
    text: &OffsetText,
    extractor: &SentenceExtractor,
    builder: &mut DocumentBuilder,
) -> OffsetText {
    let (sentences, rest) = extractor.split_text(text);
    for sentence in sentences {
        builder.add_sentence(sentence.into_sentence());
    }
    rest
}

/// Emit a carried-over tail as a final sentence unless it is only whitespace
pub(crate) fn flush_remainder(rest: OffsetText, builder: &mut DocumentBuilder) {
    if !rest.is_blank() {
        builder.add_sentence(rest.into_sentence());
    }
}

/// Every sentence of a standalone text, including an unterminated tail
pub(crate) fn sentences_of(text: &OffsetText, extractor: &SentenceExtractor) -> Vec<Sentence> {
    let (pieces, rest) = extractor.split_text(text);
    let mut sentences: Vec<_> = pieces.into_iter().map(OffsetText::into_sentence).collect();
    if !rest.is_blank() {
        sentences.push(rest.into_sentence());
    }
    sentences
}

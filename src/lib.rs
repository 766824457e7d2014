pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod position;
pub mod reader;
pub mod sentence;
pub mod sentence_extractor;
pub mod validator;

// Re-export main types for convenient access
pub use config::ExtractorConfig;
pub use error::{ConfigError, ParseError};
pub use model::{Document, DocumentBuilder, ListBlock, ListElement, Paragraph, Section, SectionId};
pub use position::Position;
pub use sentence::{OffsetText, Sentence};
pub use sentence_extractor::{Extraction, SentenceExtractor};

// Re-export parsers and format selection
pub use parser::{
    parse, AsciiDocParser, DocumentParser, Format, MarkdownParser, PlainTextParser,
    PortableObjectParser, PropertiesParser, ReviewParser, WikiParser,
};

// Re-export the validator capability
pub use validator::{run_validators, ValidationError, Validator};

// WHY: rules live outside this crate; the core only fixes how a rule sees sentences and
// how it reports a problem so that every report maps back to the source text

use serde::Serialize;
use tracing::debug;

use crate::model::{Document, SectionId};
use crate::position::Position;
use crate::sentence::Sentence;

/// A problem found by a validator, anchored to source positions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub message: String,
    pub line: usize,
    pub start: Option<Position>,
    pub end: Option<Position>,
    pub validator: Option<String>,
}

impl ValidationError {
    /// Error covering chars `start..end` of `sentence`; positions come from its offsets
    pub fn at(sentence: &Sentence, start: usize, end: usize, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: sentence.line_number(),
            start: sentence.position_at(start),
            end: sentence.position_at(end),
            validator: None,
        }
    }

    /// Error about a whole sentence
    pub fn for_sentence(sentence: &Sentence, message: impl Into<String>) -> Self {
        Self::at(sentence, 0, sentence.len(), message)
    }

    fn reported_by(mut self, validator: &str) -> Self {
        self.validator.get_or_insert_with(|| validator.to_string());
        self
    }
}

/// A rule checked against a parsed document
pub trait Validator: Send + Sync {
    fn name(&self) -> &str;

    /// Check one sentence
    fn validate(&self, sentence: &Sentence, errors: &mut Vec<ValidationError>);

    /// Check a section as a whole; most rules only look at sentences
    fn validate_section(&self, _document: &Document, _section: SectionId, _errors: &mut Vec<ValidationError>) {}
}

/// Run every validator over every section and sentence of `document`
pub fn run_validators(document: &Document, validators: &[Box<dyn Validator>]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for validator in validators {
        let mut found = Vec::new();
        for id in document.section_ids() {
            validator.validate_section(document, id, &mut found);
        }
        for sentence in document.sentences() {
            validator.validate(sentence, &mut found);
        }
        debug!(validator = validator.name(), errors = found.len(), "Validator finished");
        errors.extend(found.into_iter().map(|error| error.reported_by(validator.name())));
    }
    errors
}

use std::fmt;

use tracing::debug;

use super::line::Line;
use crate::model::DocumentBuilder;
use crate::parser::sentences_of;
use crate::sentence::{OffsetText, Sentence};
use crate::sentence_extractor::SentenceExtractor;

/// Every line of a file, markup erased in place
#[derive(Debug, Clone, Default)]
pub struct LineModel {
    lines: Vec<Line>,
}

impl LineModel {
    /// Decode `lines` (line numbers start at 1) using `delimiters` for inline markup
    pub fn from_lines(lines: &[String], delimiters: &'static str) -> Self {
        let lines = lines
            .iter()
            .enumerate()
            .map(|(index, text)| Line::new(text, index + 1).with_delimiters(delimiters))
            .collect();
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn lines_mut(&mut self) -> &mut [Line] {
        &mut self.lines
    }

    /// Line by 1-based number
    pub fn line(&self, line_no: usize) -> Option<&Line> {
        line_no.checked_sub(1).and_then(|index| self.lines.get(index))
    }

    /// Hand the surviving text to the builder: headers become sections, list starts
    /// collect their continuation lines, other runs of non-empty lines are paragraphs
    pub fn convert(&self, extractor: &SentenceExtractor, builder: &mut DocumentBuilder) {
        if self.lines.first().map_or(true, |line| line.section_level() == 0) {
            builder.add_section(0, Vec::new());
        }

        let lines = &self.lines;
        let mut index = 0;
        while index < lines.len() {
            let line = &lines[index];
            if line.is_empty() {
                index += 1;
                continue;
            }

            if line.section_level() > 0 {
                builder.add_section(line.section_level(), project(&[line], extractor));
                index += 1;
            } else if line.is_list_start() {
                let level = line.list_level();
                let mut element = vec![line];
                index += 1;
                while let Some(next) = lines.get(index) {
                    if next.is_list_start() || next.list_level() != level {
                        break;
                    }
                    element.push(next);
                    index += 1;
                }
                builder.add_list_element(level, project(&element, extractor));
            } else {
                let mut paragraph = Vec::new();
                while let Some(next) = lines.get(index) {
                    if next.is_empty() || next.section_level() > 0 || next.is_list_start() {
                        break;
                    }
                    paragraph.push(next);
                    index += 1;
                }
                builder.add_paragraph();
                builder.add_sentences(project(&paragraph, extractor));
            }
        }
    }
}

/// Visible chars of consecutive lines joined into sentences; the joiner sits at the
/// end of the line it follows
fn project(lines: &[&Line], extractor: &SentenceExtractor) -> Vec<Sentence> {
    let mut text = OffsetText::new();
    let mut previous_end = None;
    for line in lines {
        let visible = line.visible_text();
        if visible.is_empty() {
            continue;
        }
        if let Some(anchor) = previous_end {
            text.fold_line(extractor.joiner(), anchor);
        }
        text.append(visible);
        previous_end = Some(line.end_position());
    }

    let sentences = sentences_of(&text, extractor);
    debug!(lines = lines.len(), sentences = sentences.len(), "Projected erased lines");
    sentences
}

impl fmt::Display for LineModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Document;
    use crate::parser::erasing::{EraseStyle, ASCIIDOC_DELIMITERS};
    use crate::position::Position;

    fn model(text: &str) -> LineModel {
        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        LineModel::from_lines(&lines, ASCIIDOC_DELIMITERS)
    }

    fn convert(model: &LineModel) -> Document {
        let extractor = SentenceExtractor::with_default_rules().unwrap();
        let mut builder = DocumentBuilder::new();
        model.convert(&extractor, &mut builder);
        builder.build()
    }

    #[test]
    fn test_line_lookup_is_one_based() {
        let model = model("first\nsecond");
        assert_eq!(model.line(1).map(Line::line_no), Some(1));
        assert_eq!(model.line(2).map(Line::line_no), Some(2));
        assert!(model.line(0).is_none());
        assert!(model.line(3).is_none());
    }

    #[test]
    fn test_projection_skips_erased_chars_and_joins_lines() {
        let mut model = model("Some *bold*\ntext here.");
        model.lines_mut()[0].erase_enclosure("*", "*", EraseStyle::InlineMarkup);
        let document = convert(&model);

        let sentence = document.sentences().next().unwrap();
        assert_eq!(sentence.content(), "Some bold text here.");
        assert_eq!(sentence.offsets()[5], Position::new(1, 6));
        // joiner anchored just past the closing marker
        assert_eq!(sentence.offsets()[9], Position::new(1, 11));
        assert_eq!(sentence.offsets()[10], Position::new(2, 0));
    }

    #[test]
    fn test_sections_lists_and_paragraphs() {
        let mut model = model("Title\nintro line\n\n* item one\ncontinued\n* item two\n\nclosing.");
        let lines = model.lines_mut();
        lines[0].set_section_level(1);
        for index in [3, 5] {
            lines[index].erase_range(0, 2);
            lines[index].set_list_start(true);
            lines[index].set_list_level(1);
        }
        lines[4].set_list_level(1);

        let document = convert(&model);
        assert_eq!(document.len(), 1);
        let section = &document.sections()[0];
        assert_eq!(section.level(), 1);
        assert_eq!(section.joined_header(), "Title");
        assert_eq!(section.paragraphs().len(), 2);

        let elements = section.list_blocks()[0].elements();
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].sentences()[0].content(), "item one continued");
        assert_eq!(elements[1].sentences()[0].content(), "item two");
    }

    #[test]
    fn test_display_lists_every_line() {
        let mut model = model("a\n\nb");
        model.lines_mut()[2].erase_all();
        assert_eq!(model.to_string(), "  0-0-001: a\n  0-0-002: \nX 0-0-003: ·b\n");
    }
}

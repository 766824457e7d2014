// WHY: parsers append blocks one at a time and rarely know whether the enclosing
// section or paragraph exists yet; the builder creates missing containers on demand
// and `build` consumes it so a finished Document can never be mutated

use tracing::{debug, warn};

use super::{Document, ListBlock, ListElement, Paragraph, Section, SectionId};
use crate::sentence::Sentence;

/// Single-writer builder for [`Document`]
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    sections: Vec<Section>,
    filename: Option<String>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_filename(&mut self, filename: impl Into<String>) -> &mut Self {
        self.filename = Some(filename.into());
        self
    }

    /// Most recently added section, if any
    pub fn last_section(&self) -> Option<&Section> {
        self.sections.last()
    }

    /// Append a section and attach it to the nearest preceding section of smaller level
    pub fn add_section(&mut self, level: usize, header: Vec<Sentence>) -> SectionId {
        let mut header = header;
        if let Some(first) = header.first_mut() {
            first.set_first_of_block(true);
        }

        let id = SectionId(self.sections.len());
        let parent = self.find_parent(level);
        let mut section = Section::new(level, header);
        section.parent = parent;

        match parent {
            Some(parent) => self.sections[parent.0].subsections.push(id),
            None if level > 0 => {
                warn!(level, "Section has no ancestor with a smaller level, leaving it parentless");
            }
            None => {}
        }

        debug!(level, id = id.0, "Added section");
        self.sections.push(section);
        id
    }

    /// Start a new paragraph in the current section
    pub fn add_paragraph(&mut self) -> &mut Self {
        self.current_section().paragraphs.push(Paragraph::default());
        self
    }

    /// Append a sentence to the current paragraph
    pub fn add_sentence(&mut self, sentence: Sentence) -> &mut Self {
        let section = self.current_section();
        if section.paragraphs.is_empty() {
            section.paragraphs.push(Paragraph::default());
        }
        if let Some(paragraph) = section.paragraphs.last_mut() {
            let mut sentence = sentence;
            if paragraph.sentences.is_empty() {
                sentence.set_first_of_block(true);
            }
            paragraph.sentences.push(sentence);
        }
        self
    }

    pub fn add_sentences(&mut self, sentences: impl IntoIterator<Item = Sentence>) -> &mut Self {
        for sentence in sentences {
            self.add_sentence(sentence);
        }
        self
    }

    /// Start a new list block in the current section
    pub fn add_list_block(&mut self) -> &mut Self {
        self.current_section().list_blocks.push(ListBlock::default());
        self
    }

    /// Append an element to the current list block
    pub fn add_list_element(&mut self, level: usize, sentences: Vec<Sentence>) -> &mut Self {
        let mut sentences = sentences;
        if let Some(first) = sentences.first_mut() {
            first.set_first_of_block(true);
        }

        let section = self.current_section();
        if section.list_blocks.is_empty() {
            section.list_blocks.push(ListBlock::default());
        }
        if let Some(block) = section.list_blocks.last_mut() {
            block.elements.push(ListElement {
                level: level.max(1),
                sentences,
            });
        }
        self
    }

    /// Finish building; an empty builder yields one root section with one empty paragraph
    pub fn build(self) -> Document {
        let mut sections = self.sections;
        if sections.is_empty() {
            let mut root = Section::new(0, Vec::new());
            root.paragraphs.push(Paragraph::default());
            sections.push(root);
        }

        debug!(sections = sections.len(), filename = ?self.filename, "Built document");
        Document {
            sections,
            filename: self.filename,
        }
    }

    fn current_section(&mut self) -> &mut Section {
        if self.sections.is_empty() {
            self.sections.push(Section::new(0, Vec::new()));
        }
        let last = self.sections.len() - 1;
        &mut self.sections[last]
    }

    /// Walk back from the last section through its ancestors to the first smaller level
    fn find_parent(&self, level: usize) -> Option<SectionId> {
        let mut candidate = self.sections.len().checked_sub(1).map(SectionId);
        while let Some(id) = candidate {
            let section = &self.sections[id.0];
            if section.level < level {
                return Some(id);
            }
            candidate = section.parent;
        }
        None
    }
}

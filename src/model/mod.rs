// WHY: validators need one uniform tree regardless of the source format
// Sections live in a flat arena so parent links are plain indices rather than back-references

use serde::{Deserialize, Serialize};

use crate::sentence::Sentence;

pub mod builder;

pub use builder::DocumentBuilder;

/// Index of a section inside its document's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectionId(pub usize);

impl SectionId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Block of consecutive sentences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    pub(crate) sentences: Vec<Sentence>,
}

impl Paragraph {
    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

/// One item of a list; level 1 is the outermost nesting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListElement {
    pub(crate) level: usize,
    pub(crate) sentences: Vec<Sentence>,
}

impl ListElement {
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListBlock {
    pub(crate) elements: Vec<ListElement>,
}

impl ListBlock {
    pub fn elements(&self) -> &[ListElement] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Heading plus the blocks that follow it up to the next heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub(crate) level: usize,
    pub(crate) header: Vec<Sentence>,
    pub(crate) paragraphs: Vec<Paragraph>,
    pub(crate) list_blocks: Vec<ListBlock>,
    pub(crate) subsections: Vec<SectionId>,
    pub(crate) parent: Option<SectionId>,
}

impl Section {
    pub(crate) fn new(level: usize, header: Vec<Sentence>) -> Self {
        Self {
            level,
            header,
            paragraphs: Vec::new(),
            list_blocks: Vec::new(),
            subsections: Vec::new(),
            parent: None,
        }
    }

    /// Heading depth, 0 for the document root
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn header(&self) -> &[Sentence] {
        &self.header
    }

    /// Header sentences concatenated, for display and lookups
    pub fn joined_header(&self) -> String {
        self.header.iter().map(Sentence::content).collect()
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn list_blocks(&self) -> &[ListBlock] {
        &self.list_blocks
    }

    pub fn subsections(&self) -> &[SectionId] {
        &self.subsections
    }

    pub fn parent(&self) -> Option<SectionId> {
        self.parent
    }

    /// Every sentence of this section: header, paragraphs, then list elements
    pub fn sentences(&self) -> impl Iterator<Item = &Sentence> {
        self.header
            .iter()
            .chain(self.paragraphs.iter().flat_map(|p| p.sentences.iter()))
            .chain(
                self.list_blocks
                    .iter()
                    .flat_map(|b| b.elements.iter())
                    .flat_map(|e| e.sentences.iter()),
            )
    }
}

/// Immutable parsed document; always holds at least one section
///
/// Only [`DocumentBuilder`] creates documents. The model serializes for dumps but never
/// deserializes, so external data cannot skip the builder's invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub(crate) sections: Vec<Section>,
    pub(crate) filename: Option<String>,
}

impl Document {
    /// Sections in document order
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn parent(&self, id: SectionId) -> Option<&Section> {
        self.section(id)?.parent.and_then(|p| self.section(p))
    }

    /// Direct subsections of `id`
    pub fn children(&self, id: SectionId) -> impl Iterator<Item = &Section> {
        self.section(id)
            .map(|s| s.subsections.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|child| self.section(*child))
    }

    /// Ids of sections that have no parent
    pub fn root_sections(&self) -> impl Iterator<Item = SectionId> + '_ {
        self.sections
            .iter()
            .enumerate()
            .filter(|(_, s)| s.parent.is_none())
            .map(|(i, _)| SectionId(i))
    }

    pub fn section_ids(&self) -> impl Iterator<Item = SectionId> {
        (0..self.sections.len()).map(SectionId)
    }

    /// All sentences in document order
    pub fn sentences(&self) -> impl Iterator<Item = &Sentence> {
        self.sections.iter().flat_map(Section::sentences)
    }
}

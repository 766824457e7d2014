// WHY: every parser produces text whose characters must point back at their true source location
// OffsetText keeps content and positions as one unit so they can never drift apart

use serde::Serialize;
use std::ops::Range;

use crate::position::Position;

/// Text under construction paired with the source position of each of its characters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetText {
    content: String,
    offsets: Vec<Position>,
}

impl OffsetText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Characters of `text` laid out consecutively on `line`, starting at `start_column`
    pub fn from_line(text: &str, line: usize, start_column: usize) -> Self {
        let mut result = Self::new();
        for (i, ch) in text.chars().enumerate() {
            result.push(ch, Position::new(line, start_column + i));
        }
        result
    }

    pub fn push(&mut self, ch: char, position: Position) {
        self.content.push(ch);
        self.offsets.push(position);
    }

    /// Push every char of `s`, all anchored at the same source position
    pub fn push_str_at(&mut self, s: &str, position: Position) {
        for ch in s.chars() {
            self.push(ch, position);
        }
    }

    pub fn append(&mut self, other: OffsetText) {
        self.content.push_str(&other.content);
        self.offsets.extend(other.offsets);
    }

    /// Join a following physical line: the joiner is anchored at the end of the previous line
    pub fn fold_line(&mut self, joiner: &str, anchor: Position) {
        self.push_str_at(joiner, anchor);
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }

    pub fn offsets(&self) -> &[Position] {
        &self.offsets
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Number of chars (equal to the number of offsets)
    pub fn char_len(&self) -> usize {
        self.offsets.len()
    }

    pub fn last_position(&self) -> Option<Position> {
        self.offsets.last().copied()
    }

    /// Char index of the char starting at byte index `byte`
    pub fn char_index(&self, byte: usize) -> usize {
        self.content[..byte].chars().count()
    }

    /// Sub-text for a byte range lying on char boundaries
    pub fn slice(&self, range: Range<usize>) -> OffsetText {
        let start = self.char_index(range.start);
        let len = self.content[range.clone()].chars().count();
        OffsetText {
            content: self.content[range].to_string(),
            offsets: self.offsets[start..start + len].to_vec(),
        }
    }

    /// Split at byte index `at`; `self` keeps `[..at]` and the tail is returned
    pub fn split_off(&mut self, at: usize) -> OffsetText {
        let char_at = self.char_index(at);
        OffsetText {
            content: self.content.split_off(at),
            offsets: self.offsets.split_off(char_at),
        }
    }

    /// Copy without leading and trailing whitespace, positions trimmed alongside
    pub fn trim(&self) -> OffsetText {
        let trimmed_start = self.content.len() - self.content.trim_start().len();
        let trimmed_end = self.content.trim_end().len().max(trimmed_start);
        self.slice(trimmed_start..trimmed_end)
    }

    pub fn into_sentence(self) -> Sentence {
        Sentence {
            content: self.content,
            offsets: self.offsets,
            is_first_of_block: false,
            links: Vec::new(),
        }
    }
}

/// Normalized sentence text with the source position of every character
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sentence {
    content: String,
    offsets: Vec<Position>,
    is_first_of_block: bool,
    links: Vec<String>,
}

impl Sentence {
    /// Build a sentence from content and a parallel offset array
    ///
    /// # Panics
    /// Panics if `offsets` does not hold exactly one position per char of `content`.
    pub fn new(content: impl Into<String>, offsets: Vec<Position>) -> Self {
        let content = content.into();
        assert_eq!(
            content.chars().count(),
            offsets.len(),
            "sentence offsets must match content length"
        );
        Self {
            content,
            offsets,
            is_first_of_block: false,
            links: Vec::new(),
        }
    }

    /// Sentence laid out on a single line from column 0, for synthetic headers and tests
    pub fn plain(content: &str, line: usize) -> Self {
        OffsetText::from_line(content, line, 0).into_sentence()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn offsets(&self) -> &[Position] {
        &self.offsets
    }

    pub fn links(&self) -> &[String] {
        &self.links
    }

    pub fn is_first_of_block(&self) -> bool {
        self.is_first_of_block
    }

    /// Number of chars in the content
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Line of the first character, 0 for an empty sentence
    pub fn line_number(&self) -> usize {
        self.offsets.first().map(|p| p.line).unwrap_or(0)
    }

    pub fn start_position(&self) -> Option<Position> {
        self.offsets.first().copied()
    }

    /// Source position of char `index`; one past the end yields a synthesized position
    /// just after the last character
    pub fn position_at(&self, index: usize) -> Option<Position> {
        if index < self.offsets.len() {
            return Some(self.offsets[index]);
        }
        if index == self.offsets.len() {
            return self.offsets.last().map(Position::next_column);
        }
        None
    }

    /// Char index whose source position is `position`
    ///
    /// Returns 0 when the position is not part of this sentence; callers reporting errors
    /// rely on that fallback.
    pub fn index_of(&self, position: Position) -> usize {
        self.offsets
            .iter()
            .position(|p| *p == position)
            .unwrap_or(0)
    }

    pub(crate) fn set_first_of_block(&mut self, first: bool) {
        self.is_first_of_block = first;
    }

    pub fn with_links(mut self, links: Vec<String>) -> Self {
        self.links = links;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_line_assigns_consecutive_columns() {
        let text = OffsetText::from_line("abc", 4, 2);
        assert_eq!(text.as_str(), "abc");
        assert_eq!(
            text.offsets(),
            &[Position::new(4, 2), Position::new(4, 3), Position::new(4, 4)]
        );
    }

    #[test]
    fn test_fold_line_anchors_joiner_at_previous_line_end() {
        let mut text = OffsetText::from_line("one", 1, 0);
        text.fold_line(" ", Position::new(1, 3));
        text.append(OffsetText::from_line("two", 2, 0));

        assert_eq!(text.as_str(), "one two");
        assert_eq!(text.offsets()[3], Position::new(1, 3));
        assert_eq!(text.offsets()[4], Position::new(2, 0));

        // Japanese joins lines without any joiner
        let mut text = OffsetText::from_line("一", 1, 0);
        text.fold_line("", Position::new(1, 1));
        text.append(OffsetText::from_line("二", 2, 0));
        assert_eq!(text.as_str(), "一二");
        assert_eq!(text.char_len(), 2);
    }

    #[test]
    fn test_slice_and_trim_keep_offsets_in_sync() {
        let text = OffsetText::from_line("  héllo world ", 1, 0);
        let trimmed = text.trim();
        assert_eq!(trimmed.as_str(), "héllo world");
        assert_eq!(trimmed.offsets()[0], Position::new(1, 2));
        assert_eq!(trimmed.offsets().last(), Some(&Position::new(1, 12)));

        let byte_start = text.as_str().find("world").unwrap();
        let slice = text.slice(byte_start..byte_start + 5);
        assert_eq!(slice.as_str(), "world");
        assert_eq!(slice.offsets()[0], Position::new(1, 8));

        assert!(OffsetText::from_line("   ", 1, 0).trim().is_empty());
    }

    #[test]
    fn test_split_off_keeps_head_and_returns_tail() {
        let mut text = OffsetText::from_line("ab. cd", 2, 0);
        let tail = text.split_off(3);
        assert_eq!(text.as_str(), "ab.");
        assert_eq!(tail.as_str(), " cd");
        assert_eq!(tail.offsets()[0], Position::new(2, 3));
    }

    #[test]
    fn test_position_at_and_one_past_end() {
        let sentence = Sentence::plain("pen.", 3);
        assert_eq!(sentence.position_at(0), Some(Position::new(3, 0)));
        assert_eq!(sentence.position_at(3), Some(Position::new(3, 3)));
        assert_eq!(sentence.position_at(4), Some(Position::new(3, 4)));
        assert_eq!(sentence.position_at(5), None);

        let empty = Sentence::plain("", 1);
        assert_eq!(empty.position_at(0), None);
        assert_eq!(empty.line_number(), 0);
    }

    #[test]
    fn test_index_of_falls_back_to_zero() {
        let sentence = Sentence::plain("abc", 1);
        assert_eq!(sentence.index_of(Position::new(1, 2)), 2);
        assert_eq!(sentence.index_of(Position::new(9, 9)), 0);
    }

    #[test]
    #[should_panic(expected = "sentence offsets must match content length")]
    fn test_new_rejects_mismatched_offsets() {
        Sentence::new("abc", vec![Position::new(1, 0)]);
    }
}

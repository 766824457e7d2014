// WHY: CommonMark block structure depends on indentation, lazy continuation lines and
// link reference definitions, so pulldown-cmark resolves it; every text event carries a
// byte range that is mapped back to line and column here

use std::ops::Range;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use tracing::debug;

use super::{sentences_of, DocumentParser};
use crate::model::DocumentBuilder;
use crate::position::Position;
use crate::sentence::{OffsetText, Sentence};
use crate::sentence_extractor::SentenceExtractor;

/// CommonMark plus tables, strikethrough, task lists, footnotes and YAML front matter
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownParser;

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS
}

impl DocumentParser for MarkdownParser {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn parse_lines(
        &self,
        lines: &[String],
        extractor: &SentenceExtractor,
        builder: &mut DocumentBuilder,
    ) {
        let source = lines.join("\n");
        let mut processor = MarkdownProcessor::new(&source, extractor);
        for (event, range) in Parser::new_ext(&source, options()).into_offset_iter() {
            processor.process_event(event, range, builder);
        }
        processor.finish(builder);
    }
}

/// Byte offset of every line start
struct LineIndex<'a> {
    source: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(source: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { source, starts }
    }

    fn position(&self, byte: usize) -> Position {
        // starts[0] == 0, so at least one start precedes any byte
        let line = self.starts.partition_point(|&start| start <= byte);
        let start = self.starts[line - 1];
        Position::new(line, self.source[start..byte].chars().count())
    }

    /// Just past the last char of a 1-based line
    fn line_end(&self, line: usize) -> Position {
        let start = self.starts[line - 1];
        let end = self.starts.get(line).map_or(self.source.len(), |next| next - 1);
        Position::new(line, self.source[start..end].chars().count())
    }
}

/// Turns the event stream into builder calls
///
/// Text of the block being read (heading, paragraph, list item or table cell) collects in
/// `text`; it is split into sentences when the block ends. A nested list starts inside its
/// parent item, so the parent's text is flushed as its own element at that point.
struct MarkdownProcessor<'a> {
    index: LineIndex<'a>,
    extractor: &'a SentenceExtractor,
    text: OffsetText,
    /// Link targets anchored at the first char of their label
    links: Vec<(Position, String)>,
    open_links: Vec<(usize, String)>,
    /// Depth of code blocks, front matter and images, whose text is not prose
    hidden: usize,
    list_depth: usize,
    item_depth: usize,
}

impl<'a> MarkdownProcessor<'a> {
    fn new(source: &'a str, extractor: &'a SentenceExtractor) -> Self {
        Self {
            index: LineIndex::new(source),
            extractor,
            text: OffsetText::new(),
            links: Vec::new(),
            open_links: Vec::new(),
            hidden: 0,
            list_depth: 0,
            item_depth: 0,
        }
    }

    fn process_event(&mut self, event: Event<'_>, range: Range<usize>, builder: &mut DocumentBuilder) {
        match event {
            Event::Start(Tag::Paragraph) => {
                if self.item_depth > 0 {
                    self.fold();
                } else {
                    builder.add_paragraph();
                }
            }
            Event::End(TagEnd::Paragraph) => {
                if self.item_depth == 0 {
                    builder.add_sentences(self.take_sentences());
                }
            }
            Event::Start(Tag::Heading { .. }) => self.flush_item(builder),
            Event::End(TagEnd::Heading(level)) => {
                let header = self.take_sentences();
                builder.add_section(level as usize, header);
            }
            Event::Start(Tag::List(_)) => {
                self.flush_item(builder);
                if self.list_depth == 0 {
                    builder.add_list_block();
                }
                self.list_depth += 1;
            }
            Event::End(TagEnd::List(_)) => self.list_depth = self.list_depth.saturating_sub(1),
            Event::Start(Tag::Item) => self.item_depth += 1,
            Event::End(TagEnd::Item) => {
                self.flush_item(builder);
                self.item_depth = self.item_depth.saturating_sub(1);
            }
            Event::Start(Tag::Table(_)) => {
                builder.add_paragraph();
            }
            Event::End(TagEnd::TableCell) => {
                builder.add_sentences(self.take_sentences());
            }
            Event::Start(Tag::CodeBlock(_) | Tag::MetadataBlock(_) | Tag::Image { .. }) => {
                self.hidden += 1;
            }
            Event::End(TagEnd::CodeBlock | TagEnd::MetadataBlock(_) | TagEnd::Image) => {
                self.hidden = self.hidden.saturating_sub(1);
            }
            Event::Start(Tag::Link { dest_url, .. }) => {
                self.open_links.push((self.text.char_len(), dest_url.to_string()));
            }
            Event::End(TagEnd::Link) => {
                if let Some((start, target)) = self.open_links.pop() {
                    match self.text.offsets().get(start) {
                        Some(&anchor) => self.links.push((anchor, target)),
                        None => debug!(%target, "Dropping link without a label"),
                    }
                }
            }
            Event::Text(text) | Event::Code(text) if self.hidden == 0 => {
                self.push_source(&text, range);
            }
            Event::SoftBreak | Event::HardBreak if self.hidden == 0 => self.fold(),
            // HTML, rules, footnote references and task markers carry no prose
            _ => {}
        }
    }

    /// Append event text, walking the source range char by char; decoded text (escapes,
    /// entities) keeps the positions of the source chars it replaced
    fn push_source(&mut self, text: &str, range: Range<usize>) {
        let slice = &self.index.source[range.clone()];
        let start = slice.find(text).map_or(range.start, |at| range.start + at);

        let mut position = self.index.position(start);
        let mut source = self.index.source[start..range.end].chars().peekable();
        for ch in text.chars() {
            if ch != '\\' && source.peek() == Some(&'\\') {
                source.next();
                position = Position::new(position.line, position.column + 1);
            }
            self.text.push(ch, position);
            match source.next() {
                Some('\n') => position = Position::new(position.line + 1, 0),
                Some(_) => position = Position::new(position.line, position.column + 1),
                None => {}
            }
        }
    }

    /// Join the next line of the same block; the joiner sits at the end of the line the
    /// text stopped on
    fn fold(&mut self) {
        if let Some(last) = self.text.last_position() {
            let anchor = self.index.line_end(last.line);
            self.text.fold_line(self.extractor.joiner(), anchor);
        }
    }

    fn flush_item(&mut self, builder: &mut DocumentBuilder) {
        if self.item_depth == 0 {
            return;
        }
        let sentences = self.take_sentences();
        if !sentences.is_empty() {
            builder.add_list_element(self.item_depth, sentences);
        }
    }

    fn take_sentences(&mut self) -> Vec<Sentence> {
        let text = std::mem::take(&mut self.text);
        let links = std::mem::take(&mut self.links);
        sentences_of(&text, self.extractor)
            .into_iter()
            .map(|sentence| {
                let targets = links
                    .iter()
                    .filter(|(anchor, _)| sentence.offsets().contains(anchor))
                    .map(|(_, target)| target.clone())
                    .collect();
                sentence.with_links(targets)
            })
            .collect()
    }

    fn finish(mut self, builder: &mut DocumentBuilder) {
        let rest = self.take_sentences();
        if !rest.is_empty() {
            debug!(sentences = rest.len(), "Flushing text left open at end of input");
            builder.add_sentences(rest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Document, SectionId};

    fn parse(text: &str) -> Document {
        let extractor = SentenceExtractor::with_default_rules().unwrap();
        MarkdownParser.parse_str(text, &extractor)
    }

    fn contents(document: &Document) -> Vec<&str> {
        document.sentences().map(Sentence::content).collect()
    }

    #[test]
    fn test_headings_and_emphasis() {
        let document = parse("# Title\n\nSome **bold** and `code`.\n\n## Part ##\n\nMore _text_ here.");
        assert_eq!(document.len(), 2);

        let title = &document.sections()[0];
        assert_eq!(title.level(), 1);
        assert_eq!(title.joined_header(), "Title");
        let sentence = &title.paragraphs()[0].sentences()[0];
        assert_eq!(sentence.content(), "Some bold and code.");
        assert_eq!(sentence.offsets()[5], Position::new(3, 7));
        assert_eq!(sentence.offsets()[14], Position::new(3, 19));

        let part = &document.sections()[1];
        assert_eq!(part.level(), 2);
        assert_eq!(part.joined_header(), "Part");
        assert_eq!(part.parent(), Some(SectionId(0)));
        assert_eq!(part.paragraphs()[0].sentences()[0].content(), "More text here.");
    }

    #[test]
    fn test_underlined_headings() {
        let document = parse("Intro\n=====\n\nChapter\n---\n\nBody.");
        let levels: Vec<_> = document.sections().iter().map(|s| s.level()).collect();
        assert_eq!(levels, vec![1, 2]);
        assert_eq!(document.sections()[1].joined_header(), "Chapter");
    }

    #[test]
    fn test_code_is_not_prose() {
        let text = "Before.\n\n```rust\nlet x = 1;\n```\n\n~~~\nraw\n~~~\n\n    indented code\n\nAfter.";
        assert_eq!(contents(&parse(text)), vec!["Before.", "After."]);
    }

    #[test]
    fn test_nested_lists() {
        let document = parse("- one\n  - two\n    continued\n- three\n\n1. first\n2. second");
        let root = &document.sections()[0];
        let elements: Vec<_> = root.list_blocks().iter().flat_map(|b| b.elements()).collect();
        let levels: Vec<_> = elements.iter().map(|e| e.level()).collect();
        assert_eq!(levels, vec![1, 2, 1, 1, 1]);
        assert_eq!(elements[1].sentences()[0].content(), "two continued");
        assert_eq!(elements[1].sentences()[0].offsets()[3], Position::new(2, 7));
        assert_eq!(elements[1].sentences()[0].offsets()[4], Position::new(3, 4));
        assert_eq!(elements[4].sentences()[0].content(), "second");
    }

    #[test]
    fn test_thematic_break_is_not_a_list() {
        let document = parse("* * *\n\nAfter rule.");
        assert_eq!(contents(&document), vec!["After rule."]);
        assert!(document.sections()[0].list_blocks().is_empty());
    }

    #[test]
    fn test_links_keep_labels_and_record_targets() {
        let document = parse("See [the docs](http://example.com) now. Then [more][ref].\n\n[ref]: http://example.com/x");
        let sentences: Vec<_> = document.sentences().collect();
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].content(), "See the docs now.");
        assert_eq!(sentences[0].offsets()[4], Position::new(1, 5));
        assert_eq!(sentences[0].links(), &["http://example.com"]);
        assert_eq!(sentences[1].content(), " Then more.");
        assert_eq!(sentences[1].links(), &["http://example.com/x"]);
    }

    #[test]
    fn test_autolinks_images_and_html() {
        let document = parse("Visit <https://example.com/a_b_c> today.\n\n![logo](logo.png)\n\n<div>\nraw html block.\n</div>");
        let sentences: Vec<_> = document.sentences().collect();
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].content(), "Visit https://example.com/a_b_c today.");
        assert_eq!(sentences[0].offsets()[6], Position::new(1, 7));
        assert_eq!(sentences[0].links(), &["https://example.com/a_b_c"]);
    }

    #[test]
    fn test_table_cells_are_separate_sentences() {
        let document = parse("| Col a | Col b |\n|-------|-------|\n| one. | two. |");
        assert_eq!(contents(&document), vec!["Col a", "Col b", "one.", "two."]);
        let two = document.sentences().nth(3).unwrap();
        assert_eq!(two.offsets()[0], Position::new(3, 9));
    }

    #[test]
    fn test_comments_quotes_and_front_matter() {
        let text = "---\ntitle: Notes\n---\n\n<!-- hidden\nstill hidden -->\n\nShown text.\n\n> Quoted words.";
        let document = parse(text);
        assert_eq!(contents(&document), vec!["Shown text.", "Quoted words."]);

        let quoted = document.sentences().nth(1).unwrap();
        assert_eq!(quoted.offsets()[0], Position::new(10, 2));
    }

    #[test]
    fn test_escaped_markup_stays_literal() {
        let document = parse("Use \\*stars\\* literally.");
        let sentence = document.sentences().next().unwrap();
        assert_eq!(sentence.content(), "Use *stars* literally.");
        assert_eq!(sentence.offsets()[4], Position::new(1, 5));
        assert_eq!(sentence.offsets()[5], Position::new(1, 6));
        assert_eq!(sentence.offsets()[10], Position::new(1, 12));
        assert_eq!(sentence.offsets()[12], Position::new(1, 14));
    }

    #[test]
    fn test_soft_break_joiner_sits_at_line_end() {
        let document = parse("First line\nsecond line.");
        let sentence = document.sentences().next().unwrap();
        assert_eq!(sentence.content(), "First line second line.");
        assert_eq!(sentence.offsets()[10], Position::new(1, 10));
        assert_eq!(sentence.offsets()[11], Position::new(2, 0));
    }
}

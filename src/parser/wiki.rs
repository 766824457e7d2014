// WHY: wiki markup is line-classified; the classification depends only on the previous
// line's state, so it is a pure transition function instead of loop-local flags
// Inline markup and links are stripped per sentence with content and offsets rewritten together

use std::mem;
use std::ops::Range;
use tracing::warn;

use super::DocumentParser;
use crate::model::{DocumentBuilder, Paragraph};
use crate::position::Position;
use crate::sentence::{OffsetText, Sentence};
use crate::sentence_extractor::SentenceExtractor;

/// Inline markers in the order they are stripped: italic, bold, underline, strike
const INLINE_MARKERS: [&str; 4] = ["//", "**", "__", "--"];

/// Wiki markup (`h1.` headers, `-`/`#` lists, `[!-- --]` comments)
#[derive(Debug, Clone, Copy, Default)]
pub struct WikiParser;

/// Kind of the most recently classified line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineState {
    Void,
    Header,
    List,
    Comment,
    Sentence,
}

/// What the parser does with a classified line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineAction {
    Skip,
    Blank,
    Header { level: usize, column: usize },
    ListItem { level: usize, column: usize, new_block: bool },
    Text,
}

/// Classify `line` given the previous state
pub fn transition(state: LineState, line: &str) -> (LineState, LineAction) {
    if state == LineState::Comment {
        let next = if ends_comment(line) { LineState::Void } else { LineState::Comment };
        return (next, LineAction::Skip);
    }

    if let Some((level, column)) = header(line) {
        return (LineState::Header, LineAction::Header { level, column });
    }
    if let Some((level, column)) = list_item(line) {
        let new_block = state != LineState::List;
        return (LineState::List, LineAction::ListItem { level, column, new_block });
    }
    if begins_comment(line) {
        if ends_comment(line) {
            return (state, LineAction::Skip);
        }
        return (LineState::Comment, LineAction::Skip);
    }
    if line.trim().is_empty() {
        return (LineState::Void, LineAction::Blank);
    }
    (LineState::Sentence, LineAction::Text)
}

/// `hN. text` with N in 1..=6; returns the tag number and the text column
fn header(line: &str) -> Option<(usize, usize)> {
    header_tag(line).filter(|(level, _)| (1..=6).contains(level))
}

/// Any `hN. ` prefix, including tags outside the supported range
fn header_tag(line: &str) -> Option<(usize, usize)> {
    let rest = line.strip_prefix('h')?;
    let digits = rest.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let after = rest[digits..].strip_prefix(". ")?;
    let level: usize = rest[..digits].parse().ok()?;
    Some((level, line.chars().count() - after.chars().count()))
}

/// Run of `-` or `#` followed by a space; the run length is the nesting level
fn list_item(line: &str) -> Option<(usize, usize)> {
    let marker = line.chars().next().filter(|c| matches!(c, '-' | '#'))?;
    let run = line.chars().take_while(|c| *c == marker).count();
    line[run..].strip_prefix(' ')?;
    Some((run, run + 1))
}

fn begins_comment(line: &str) -> bool {
    line.trim_start().starts_with("[!--")
}

fn ends_comment(line: &str) -> bool {
    line.trim_end().ends_with("--]")
}

impl DocumentParser for WikiParser {
    fn name(&self) -> &'static str {
        "wiki"
    }

    fn parse_lines(
        &self,
        lines: &[String],
        extractor: &SentenceExtractor,
        builder: &mut DocumentBuilder,
    ) {
        // sentences before the first header belong to a synthetic root
        builder.add_section(0, Vec::new());
        builder.add_paragraph();

        let mut state = LineState::Void;
        let mut pending = OffsetText::new();
        let mut previous_end: Option<Position> = None;

        for (index, line) in lines.iter().enumerate() {
            let line_no = index + 1;
            let (next, action) = transition(state, line);

            if action != LineAction::Text {
                flush(&mut pending, builder);
                previous_end = None;
            }

            match action {
                LineAction::Skip | LineAction::Blank => {}
                LineAction::Header { level, column } => {
                    let body = OffsetText::from_line(&line_chars_from(line, column), line_no, column);
                    builder.add_section(level - 1, block_sentences(&body, extractor));
                }
                LineAction::ListItem { level, column, new_block } => {
                    if new_block {
                        builder.add_list_block();
                    }
                    let body = OffsetText::from_line(&line_chars_from(line, column), line_no, column);
                    builder.add_list_element(level, block_sentences(&body, extractor));
                }
                LineAction::Text => {
                    if let Some((level, _)) = header_tag(line) {
                        warn!(line = line_no, tag = %format!("h{level}."), "Unknown wiki block tag, treating line as text");
                    }
                    if state != LineState::Sentence {
                        open_paragraph(builder);
                    }
                    if let Some(anchor) = previous_end.filter(|_| !pending.is_empty()) {
                        pending.fold_line(extractor.joiner(), anchor);
                    }
                    pending.append(OffsetText::from_line(line, line_no, 0));
                    previous_end = Some(Position::new(line_no, line.chars().count()));

                    let (sentences, rest) = extractor.split_text(&pending);
                    for sentence in sentences {
                        builder.add_sentence(strip_markup(sentence));
                    }
                    pending = rest;
                }
            }
            state = next;
        }

        flush(&mut pending, builder);
    }
}

/// Emit the carried-over tail of a paragraph unless it is only whitespace
fn flush(pending: &mut OffsetText, builder: &mut DocumentBuilder) {
    let rest = mem::take(pending);
    if !rest.is_blank() {
        builder.add_sentence(strip_markup(rest));
    }
}

/// Reuse an empty trailing paragraph instead of stacking empty ones
fn open_paragraph(builder: &mut DocumentBuilder) {
    let reusable = builder
        .last_section()
        .and_then(|s| s.paragraphs().last())
        .is_some_and(Paragraph::is_empty);
    if !reusable {
        builder.add_paragraph();
    }
}

fn line_chars_from(line: &str, column: usize) -> String {
    line.chars().skip(column).collect()
}

/// Sentences of a header or list body, unterminated tail included
fn block_sentences(body: &OffsetText, extractor: &SentenceExtractor) -> Vec<Sentence> {
    let (pieces, rest) = extractor.split_text(body);
    let mut sentences: Vec<Sentence> = pieces.into_iter().map(strip_markup).collect();
    if !rest.is_blank() {
        sentences.push(strip_markup(rest));
    }
    sentences
}

/// Replace links by their labels and drop inline markers
fn strip_markup(text: OffsetText) -> Sentence {
    let (mut text, links) = extract_links(&text);
    for marker in INLINE_MARKERS {
        text = remove_marker(&text, marker);
    }
    text.into_sentence().with_links(links)
}

fn extract_links(text: &OffsetText) -> (OffsetText, Vec<String>) {
    let source = text.as_str();
    let mut result = OffsetText::new();
    let mut links = Vec::new();
    let mut start = 0;

    while let Some(open) = source[start..].find("[[").map(|i| start + i) {
        let Some(close) = source[open + 2..].find("]]").map(|i| open + 2 + i) else {
            break;
        };
        result.append(text.slice(start..open));

        let (label, rest) = split_segments(source, open + 2..close);
        if rest.len() > 1 {
            warn!(
                line = text.offsets().first().map(|p| p.line).unwrap_or(0),
                "Invalid link block: there are more than two link blocks"
            );
        }
        // a bare link is its own label
        let target = rest.first().cloned().unwrap_or_else(|| label.clone());
        let (label, target) = (trim_range(source, label), trim_range(source, target));
        result.append(text.slice(label));
        links.push(source[target].to_string());
        start = close + 2;
    }

    result.append(text.slice(start..source.len()));
    (result, links)
}

/// `|`-separated parts of a link body: the first part and every part after it
fn split_segments(source: &str, inner: Range<usize>) -> (Range<usize>, Vec<Range<usize>>) {
    let first_end = source[inner.clone()].find('|').map_or(inner.end, |i| inner.start + i);
    let mut rest = Vec::new();
    let mut from = first_end + 1;
    while from <= inner.end {
        let end = source[from..inner.end].find('|').map_or(inner.end, |i| from + i);
        rest.push(from..end);
        from = end + 1;
    }
    (inner.start..first_end, rest)
}

fn trim_range(source: &str, range: Range<usize>) -> Range<usize> {
    let segment = &source[range.clone()];
    let start = range.start + (segment.len() - segment.trim_start().len());
    let end = (range.start + segment.trim_end().len()).max(start);
    start..end
}

/// Strip non-empty `marker … marker` pairs, keeping the enclosed text
fn remove_marker(text: &OffsetText, marker: &str) -> OffsetText {
    let source = text.as_str();
    let mut result = OffsetText::new();
    let mut copied = 0;
    let mut search = 0;

    while let Some(open) = source[search..].find(marker).map(|i| search + i) {
        let inner_start = open + marker.len();
        let Some(first) = source[inner_start..].chars().next() else {
            break;
        };
        let min_close = inner_start + first.len_utf8();
        let Some(close) = source[min_close..].find(marker).map(|i| min_close + i) else {
            break;
        };
        result.append(text.slice(copied..open));
        result.append(text.slice(inner_start..close));
        copied = close + marker.len();
        search = copied;
    }

    result.append(text.slice(copied..source.len()));
    result
}

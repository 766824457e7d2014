use std::mem;

use super::{emit_sentences, flush_remainder, DocumentParser};
use crate::model::DocumentBuilder;
use crate::position::Position;
use crate::sentence::OffsetText;
use crate::sentence_extractor::SentenceExtractor;

/// Plain text: blank lines separate paragraphs, everything else is prose
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextParser;

impl DocumentParser for PlainTextParser {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn parse_lines(
        &self,
        lines: &[String],
        extractor: &SentenceExtractor,
        builder: &mut DocumentBuilder,
    ) {
        let mut pending = OffsetText::new();
        let mut previous_end: Option<Position> = None;

        for (index, line) in lines.iter().enumerate() {
            let line_no = index + 1;
            if line.trim().is_empty() {
                flush_remainder(mem::take(&mut pending), builder);
                previous_end = None;
                continue;
            }

            match previous_end {
                None => {
                    builder.add_paragraph();
                }
                Some(anchor) if !pending.is_empty() => pending.fold_line(extractor.joiner(), anchor),
                Some(_) => {}
            }

            pending.append(OffsetText::from_line(line, line_no, 0));
            previous_end = Some(Position::new(line_no, line.chars().count()));
            pending = emit_sentences(&pending, extractor, builder);
        }

        flush_remainder(pending, builder);
    }
}

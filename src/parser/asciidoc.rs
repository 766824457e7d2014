// WHY: AsciiDoc blocks, lists and headers depend on neighbouring lines, so markup is
// erased over the whole file first; the surviving characters still carry their
// original columns when the model is projected into sentences

use tracing::debug;

use super::erasing::{EraseStyle, Line, LineModel, ASCIIDOC_DELIMITERS};
use super::DocumentParser;
use crate::model::DocumentBuilder;
use crate::sentence_extractor::SentenceExtractor;

const LINK_PREFIXES: [&str; 5] = ["link:", "http://", "https://", "image:", "include:"];
const MACROS: [&str; 4] = ["ifdef::", "ifndef::", "ifeval::", "endif::"];
const ADMONITIONS: [&str; 5] = ["NOTE: ", "TIP: ", "IMPORTANT: ", "CAUTION: ", "WARNING: "];

/// AsciiDoc documents
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiDocParser;

impl AsciiDocParser {
    /// Build the erased line model without converting it, for inspection
    pub fn erase_markup(lines: &[String]) -> LineModel {
        let mut model = LineModel::from_lines(lines, ASCIIDOC_DELIMITERS);
        let mut state = State::default();
        let lines = model.lines_mut();
        for index in 0..lines.len() {
            process_line(lines, index, &mut state);
        }
        process_header(lines);
        model
    }
}

impl DocumentParser for AsciiDocParser {
    fn name(&self) -> &'static str {
        "asciidoc"
    }

    fn parse_lines(
        &self,
        lines: &[String],
        extractor: &SentenceExtractor,
        builder: &mut DocumentBuilder,
    ) {
        let model = Self::erase_markup(lines);
        debug!("AsciiDoc model (X=erased line, [=block, section-list-line, *=list item):\n{model}");
        model.convert(extractor, builder);
    }
}

#[derive(Debug, Default)]
struct State {
    in_block: bool,
    in_list: bool,
    block_marker: char,
    block_marker_len: usize,
}

impl State {
    fn start_block(&mut self, line: &mut Line, marker: char, marker_len: usize) {
        self.in_block = true;
        self.block_marker = marker;
        self.block_marker_len = marker_len;
        line.set_in_block(true);
        line.erase_all();
    }
}

/// Setext underline char to section level
fn underline_level(ch: char) -> Option<usize> {
    match ch {
        '=' => Some(1),
        '-' => Some(2),
        '~' => Some(3),
        '^' => Some(4),
        '+' => Some(5),
        _ => None,
    }
}

fn is_space(ch: Option<char>) -> bool {
    ch.is_some_and(char::is_whitespace)
}

fn process_line(lines: &mut [Line], index: usize, state: &mut State) {
    let (before, rest) = lines.split_at_mut(index);
    let Some((line, after)) = rest.split_first_mut() else {
        return;
    };
    let mut previous = before.last_mut();
    let next = after.first_mut();

    if line.is_erased() {
        return;
    }

    if state.in_list && line.list_level() == 0 {
        line.set_list_level(previous.as_ref().map_or(0, |p| p.list_level()));
    }

    let first = line.char_at(0);
    let second = line.char_at(1);

    if state.in_block {
        let closes_block = line.is_all_same_character()
            && first == Some(state.block_marker)
            && line.len() == state.block_marker_len;
        let closes_table =
            line.len() >= 4 && state.block_marker == '|' && first == Some('|') && second == Some('=');
        line.set_in_block(true);
        if closes_block || closes_table {
            state.in_block = false;
        }
        line.erase_all();
        return;
    }

    // underlined header: the previous line becomes the section title
    if line.is_all_same_character() {
        if let (Some(level), Some(previous)) = (first.and_then(underline_level), previous.as_mut()) {
            if line.len() == previous.len() && !". [".contains(previous.raw_char_at(0)) {
                previous.set_section_level(level);
                line.erase_all();
                return;
            }
        }
    }

    // horizontal rule
    if line.is_all_same_character() && line.len() == 3 && first == Some('\'') {
        line.erase_all();
        return;
    }

    // sidebar and quote delimiters; their content stays prose
    if line.is_all_same_character() && line.len() >= 4 && matches!(first, Some('_' | '*')) {
        line.erase_all();
        return;
    }

    if line.is_all_same_character() {
        match first {
            Some('`') if line.len() == 3 => {
                let len = line.len();
                state.start_block(line, '`', len);
                return;
            }
            Some(marker @ ('-' | '=' | '&' | '/' | '+' | '.')) if line.len() >= 4 => {
                let len = line.len();
                state.start_block(line, marker, len);
                return;
            }
            _ => {}
        }
    }
    if line.len() >= 4 && first == Some('|') && second == Some('=') {
        state.start_block(line, '|', 1);
        return;
    }

    // literal paragraph line
    if !state.in_list && first == Some(' ') {
        line.erase_all();
        return;
    }

    // comments and open block delimiters
    if (first == Some('/') && second == Some('/')) || (first == Some('-') && second == Some('-')) {
        line.erase_all();
        return;
    }

    // attribute entries and block attribute lists
    if line.erase_enclosure(":", ":", EraseStyle::None) == Some(0)
        || line.erase_enclosure("[", "]", EraseStyle::None) == Some(0)
    {
        line.erase_all();
        return;
    }

    // block title
    if first == Some('.') && !matches!(second, Some(' ' | '.')) {
        line.erase_range(0, 1);
    }

    for prefix in LINK_PREFIXES {
        line.erase_enclosure(prefix, " ,[", EraseStyle::CloseMarkerContainsDelimiters);
    }

    line.erase_enclosure("+++", "+++", EraseStyle::All);
    line.erase_enclosure("[[", "]]", EraseStyle::All);
    line.erase_enclosure("<<", ">>", EraseStyle::PreserveLabel);
    line.erase_enclosure("{", "}", EraseStyle::Markers);
    line.erase_enclosure("[", "]", EraseStyle::Markers);

    let depth = (0..line.len()).take_while(|&i| line.char_at(i) == Some('=')).count();
    if depth > 0 && line.char_at(depth) == Some(' ') {
        line.erase_range(0, depth + 1);
        line.set_section_level(depth);
    }

    if mark_list_element(line, next) {
        state.in_list = true;
    }

    // continuation marker
    let len = line.len();
    if len > 0 && line.char_at(len - 1) == Some('+') && (len == 1 || is_space(line.char_at(len - 2))) {
        line.erase_range(len - 1, 1);
    }

    if state.in_list && line.len() == 0 {
        state.in_list = false;
        line.set_list_level(0);
    }

    if MACROS.iter().any(|macro_name| line.starts_with(macro_name)) {
        line.erase_all();
    }

    if let Some(admonition) = ADMONITIONS.iter().find(|a| line.starts_with(a)) {
        line.erase_range(0, admonition.chars().count());
    }

    erase_inline_markup(line);
}

/// Bulleted (`*`, `-`, `.` runs) and labelled (`term::`) list items
fn mark_list_element(line: &mut Line, next: Option<&mut Line>) -> bool {
    let mut pos = (0..line.len()).take_while(|&i| is_space(line.char_at(i))).count();

    if let Some(marker @ ('.' | '-' | '*')) = line.char_at(pos) {
        let run = (pos..line.len()).take_while(|&i| line.char_at(i) == Some(marker)).count();
        pos += run;
        if is_space(line.char_at(pos)) {
            line.set_list_level(run);
            line.set_list_start(true);
            line.erase_range(0, pos);
            while is_space(line.char_at(pos)) {
                line.erase_range(pos, 1);
                pos += 1;
            }
            return true;
        }
    }

    let len = line.len();
    if len >= 2 && line.char_at(len - 1) == Some(':') && line.char_at(len - 2) == Some(':') {
        let mut level = 1;
        if len >= 3 {
            let mut pos = len - 3;
            while pos > 0 && line.char_at(pos) == Some(':') {
                pos -= 1;
                level += 1;
            }
        }
        if let Some(next) = next {
            next.set_list_level(level);
            next.set_list_start(true);
        }
        line.erase_all();
        return true;
    }

    false
}

fn erase_inline_markup(line: &mut Line) {
    for marker in ["__", "**", "``", "##", "^", "~"] {
        line.erase_enclosure(marker, marker, EraseStyle::Markers);
    }
    for marker in ["_", "*", "`", "#"] {
        line.erase_enclosure(marker, marker, EraseStyle::InlineMarkup);
    }
    for segment in ["'`", "`'", "\"`", "`\"", "(C)", "(R)", "(TM)"] {
        line.erase_segment(segment);
    }
}

/// A document title (`= Title` or an `=`-underlined first line) is level 1; the
/// author and attribute lines after it are erased up to the first blank line
fn process_header(lines: &mut [Line]) {
    if lines.len() < 2 {
        return;
    }

    let has_header = (lines[0].raw_char_at(0) == '=' && lines[0].raw_char_at(1) == ' ')
        || (lines[0].len() == lines[1].len()
            && lines[1].is_all_same_character()
            && lines[1].raw_char_at(0) == '=');
    if !has_header {
        return;
    }

    lines[0].set_section_level(1);
    for line in lines.iter_mut().skip(1) {
        if !line.is_erased() && line.is_empty() {
            break;
        }
        line.erase_all();
    }
}

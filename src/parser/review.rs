// WHY: Re:VIEW block commands span lines and inline commands sit inside prose, so markup
// is erased over the whole file like AsciiDoc and the surviving chars keep their columns

use tracing::debug;

use super::erasing::{EraseStyle, Line, LineModel};
use super::DocumentParser;
use crate::model::DocumentBuilder;
use crate::sentence_extractor::SentenceExtractor;

const DELIMITERS: &str = " .,";

/// Blocks whose body is prose; every other `//name{` block is code, tables or raw output
const PROSE_BLOCKS: [&str; 16] = [
    "lead", "read", "quote", "note", "memo", "tip", "info", "warning", "important", "caution",
    "notice", "point", "shoot", "flushright", "centering", "blankline",
];

/// Inline commands whose body is shown as text
const TEXT_COMMANDS: [&str; 19] = [
    "b", "i", "strong", "em", "tt", "tti", "ttb", "u", "code", "kw", "bou", "ami", "ruby",
    "chap", "title", "chapref", "chapter", "hd", "idx",
];

/// Inline commands whose body is an identifier, math or raw output
const HIDDEN_COMMANDS: [&str; 13] = [
    "list", "img", "table", "fn", "icon", "uchar", "column", "m", "raw", "embed", "br",
    "comment", "hidx",
];

/// Re:VIEW manuscripts
#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewParser;

impl ReviewParser {
    /// Build the erased line model without converting it, for inspection
    pub fn erase_markup(lines: &[String]) -> LineModel {
        let mut model = LineModel::from_lines(lines, DELIMITERS);
        let mut state = State::default();
        for line in model.lines_mut() {
            process_line(line, &mut state);
        }
        if state.block.is_some() {
            debug!("Block left open at end of input");
        }
        model
    }
}

impl DocumentParser for ReviewParser {
    fn name(&self) -> &'static str {
        "review"
    }

    fn parse_lines(
        &self,
        lines: &[String],
        extractor: &SentenceExtractor,
        builder: &mut DocumentBuilder,
    ) {
        let model = Self::erase_markup(lines);
        debug!("Re:VIEW model (X=erased line, [=block, section-list-line, *=list item):\n{model}");
        model.convert(extractor, builder);
    }
}

#[derive(Debug, Clone, Copy)]
struct Block {
    prose: bool,
}

#[derive(Debug, Default)]
struct State {
    block: Option<Block>,
    in_definition: bool,
    description_pending: bool,
}

fn is_space(ch: Option<char>) -> bool {
    ch.is_some_and(char::is_whitespace)
}

fn process_line(line: &mut Line, state: &mut State) {
    if let Some(block) = state.block {
        line.set_in_block(true);
        if line.len() == 3 && line.starts_with("//}") {
            state.block = None;
            line.erase_all();
        } else if block.prose {
            erase_inline_commands(line);
        } else {
            line.erase_all();
        }
        return;
    }

    // comments and preprocessor directives
    if line.starts_with("#@") {
        line.erase_all();
        return;
    }

    if line.starts_with("//") {
        start_block(line, state);
        return;
    }

    if mark_heading(line) {
        state.in_definition = false;
        erase_inline_commands(line);
        return;
    }

    mark_list_item(line, state);
    erase_inline_commands(line);
}

/// `//name[args]{` opens a block closed by `//}`; other block commands fit on one line
fn start_block(line: &mut Line, state: &mut State) {
    state.in_definition = false;
    if line.starts_with("//footnote[") {
        keep_footnote_text(line);
        return;
    }

    let name: String = (2..line.len())
        .map_while(|i| line.char_at(i))
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    if line.find("{", 2).is_some() {
        let prose = PROSE_BLOCKS.contains(&name.as_str());
        debug!(block = %name, line = line.line_no(), prose, "Opening block");
        state.block = Some(Block { prose });
        line.set_in_block(true);
    }
    line.erase_all();
}

/// `//footnote[id][text]` keeps only its text
fn keep_footnote_text(line: &mut Line) {
    let Some(split) = line.find("][", 11) else {
        line.erase_all();
        return;
    };
    line.erase_range(0, split + 2);
    let len = line.len();
    if line.char_at(len - 1) == Some(']') {
        line.erase_range(len - 1, 1);
    }
}

/// `=` to `=====`, optionally followed by `[option]` and `{label}`, then the title;
/// `==[/column]` only closes a column
fn mark_heading(line: &mut Line) -> bool {
    let depth = (0..line.len()).take_while(|&i| line.char_at(i) == Some('=')).count();
    if depth == 0 || depth > 5 {
        return false;
    }

    let mut pos = depth;
    for (open, close) in [('[', "]"), ('{', "}")] {
        if line.char_at(pos) == Some(open) {
            match line.find(close, pos) {
                Some(end) => pos = end + 1,
                None => return false,
            }
        }
    }

    if pos == line.len() && pos > depth {
        line.erase_all();
        return true;
    }
    if !is_space(line.char_at(pos)) {
        return false;
    }
    while is_space(line.char_at(pos)) {
        pos += 1;
    }
    line.erase_range(0, pos);
    line.set_section_level(depth);
    true
}

/// ` * item` (nesting by `*` count), ` 1. item` and ` : term`; indented lines after a
/// term are its description
fn mark_list_item(line: &mut Line, state: &mut State) {
    let indent = (0..line.len()).take_while(|&i| is_space(line.char_at(i))).count();
    if indent == 0 {
        state.in_definition = false;
        return;
    }

    let marker = match line.char_at(indent) {
        Some('*') => {
            let run = (indent..line.len()).take_while(|&i| line.char_at(i) == Some('*')).count();
            Some((run, indent + run))
        }
        Some(c) if c.is_ascii_digit() => {
            let digits = (indent..line.len())
                .take_while(|&i| line.char_at(i).is_some_and(|c| c.is_ascii_digit()))
                .count();
            (line.char_at(indent + digits) == Some('.')).then_some((1, indent + digits + 1))
        }
        Some(':') => Some((1, indent + 1)),
        _ => None,
    };

    match marker {
        Some((level, end)) if is_space(line.char_at(end)) => {
            let mut pos = end;
            while is_space(line.char_at(pos)) {
                pos += 1;
            }
            state.in_definition = line.char_at(indent) == Some(':');
            state.description_pending = state.in_definition;
            line.erase_range(0, pos);
            line.set_list_level(level);
            line.set_list_start(true);
        }
        _ if state.in_definition => {
            line.erase_range(0, indent);
            line.set_list_level(1);
            line.set_list_start(state.description_pending);
            state.description_pending = false;
        }
        _ => {}
    }
}

/// `@<name>{…}` commands; hidden ones go first so a text command's close brace is never
/// taken by a nested reference
fn erase_inline_commands(line: &mut Line) {
    for name in HIDDEN_COMMANDS {
        line.erase_enclosure(&format!("@<{name}>{{"), "}", EraseStyle::All);
    }
    line.erase_enclosure("@<href>{", "}", EraseStyle::PreserveLabel);
    for name in TEXT_COMMANDS {
        line.erase_enclosure(&format!("@<{name}>{{"), "}", EraseStyle::Markers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Document;
    use crate::position::Position;
    use crate::sentence::Sentence;

    fn parse(text: &str) -> Document {
        let extractor = SentenceExtractor::with_default_rules().unwrap();
        ReviewParser.parse_str(text, &extractor)
    }

    fn contents(document: &Document) -> Vec<&str> {
        document.sentences().map(Sentence::content).collect()
    }

    #[test]
    fn test_headings_with_options_and_labels() {
        let document = parse(
            "= Chapter\n\nIntro text.\n\n==[column] Aside\n\nColumn body.\n\n==[/column]\n\n=={sec-id} Details\n\nMore.",
        );
        let headers: Vec<_> = document
            .sections()
            .iter()
            .map(|s| (s.level(), s.joined_header()))
            .collect();
        assert_eq!(
            headers,
            vec![(1, "Chapter".to_string()), (2, "Aside".to_string()), (2, "Details".to_string())]
        );
        assert_eq!(document.sections()[1].paragraphs()[0].sentences()[0].content(), "Column body.");
        assert_eq!(document.sections()[2].header()[0].offsets()[0], Position::new(11, 11));
    }

    #[test]
    fn test_code_blocks_are_erased_and_prose_blocks_kept() {
        let text = "Before.\n\n//list[main][Main program]{\nfn main() {}\n//}\n\n//note[Caution]{\nNotes are @<b>{prose}.\n//}\n\n//image[logo][Logo]\n\nAfter.";
        let document = parse(text);
        assert_eq!(contents(&document), vec!["Before.", "Notes are prose.", "After."]);

        let note = document.sentences().nth(1).unwrap();
        assert_eq!(note.offsets()[10], Position::new(8, 15));
    }

    #[test]
    fn test_inline_commands() {
        let document = parse("Open @<href>{http://example.com,the site} now. Run @<code>{make}@<fn>{f1} first.");
        assert_eq!(contents(&document), vec!["Open the site now.", " Run make first."]);
        let open = document.sentences().next().unwrap();
        assert_eq!(open.offsets()[5], Position::new(1, 32));
    }

    #[test]
    fn test_nested_reference_inside_text_command() {
        let document = parse("A @<b>{bold @<fn>{f2}} word.");
        assert_eq!(contents(&document), vec!["A bold  word."]);
    }

    #[test]
    fn test_lists() {
        let document = parse(
            " * first\n ** nested\n * second\n\n 1. one\n 2. two\n\n : Alpha\n\tThe first letter.\n\tStill alpha.\n\nAfter list.",
        );
        let root = &document.sections()[0];
        let elements: Vec<_> = root.list_blocks().iter().flat_map(|b| b.elements()).collect();
        let levels: Vec<_> = elements.iter().map(|e| e.level()).collect();
        assert_eq!(levels, vec![1, 2, 1, 1, 1, 1, 1]);
        assert_eq!(elements[1].sentences()[0].content(), "nested");
        assert_eq!(elements[1].sentences()[0].offsets()[0], Position::new(2, 4));
        assert_eq!(elements[5].sentences()[0].content(), "Alpha");

        let description: Vec<_> = elements[6].sentences().iter().map(Sentence::content).collect();
        assert_eq!(description, vec!["The first letter.", " Still alpha."]);
        assert_eq!(root.paragraphs()[0].sentences()[0].content(), "After list.");
    }

    #[test]
    fn test_comments_and_footnotes() {
        let document = parse("#@# a comment\nVisible text.\n#@warn(check this)\n\n//footnote[f1][A footnote.]");
        assert_eq!(contents(&document), vec!["Visible text.", "A footnote."]);
        let footnote = document.sentences().nth(1).unwrap();
        assert_eq!(footnote.offsets()[0], Position::new(5, 15));
    }

    #[test]
    fn test_unclosed_block_erases_to_end() {
        let document = parse("Kept.\n\n//emlist{\nnever closed.");
        assert_eq!(contents(&document), vec!["Kept."]);
    }
}

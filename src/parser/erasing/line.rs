// WHY: markup is removed by marking characters invalid, never by deleting them, so every
// surviving character keeps the column it had in the source line

use std::fmt;

use crate::position::Position;
use crate::sentence::OffsetText;

/// Value `char_at` reports for a backslash-escaped character, so escaped markup never
/// matches a marker
pub const ESCAPED_CHARACTER: char = '\u{E000}';

/// Characters that may surround adjacency-sensitive inline markup in AsciiDoc
pub const ASCIIDOC_DELIMITERS: &str = " _*`#^~.,";

/// How `erase_enclosure` treats an `open … close` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseStyle {
    /// Locate the first enclosure without erasing anything
    None,
    /// Erase markers and enclosed text
    All,
    /// Erase only the open and close markers
    Markers,
    /// Markers must touch a delimiter (or line edge) on their outer side, and the
    /// enclosed text must not start with whitespace
    InlineMarkup,
    /// Erase markers plus everything up to the first comma, keeping the label after it
    PreserveLabel,
    /// `close` is a set of delimiter chars; erase from the open marker up to the first one
    CloseMarkerContainsDelimiters,
}

/// One physical line with per-character validity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    chars: Vec<char>,
    offsets: Vec<usize>,
    valid: Vec<bool>,
    escaped: Vec<bool>,
    line_no: usize,
    section_level: usize,
    list_level: usize,
    list_start: bool,
    in_block: bool,
    erased: bool,
    all_same_character: bool,
    delimiters: &'static str,
}

impl Line {
    /// Decode `text`; a backslash escapes the following char and the pair collapses to
    /// that char, anchored at the backslash column. Trailing whitespace is dropped.
    pub fn new(text: &str, line_no: usize) -> Self {
        let raw: Vec<char> = text.chars().collect();
        let mut line = Self {
            chars: Vec::with_capacity(raw.len()),
            offsets: Vec::with_capacity(raw.len()),
            valid: Vec::with_capacity(raw.len()),
            escaped: Vec::with_capacity(raw.len()),
            line_no,
            section_level: 0,
            list_level: 0,
            list_start: false,
            in_block: false,
            erased: false,
            all_same_character: false,
            delimiters: ASCIIDOC_DELIMITERS,
        };

        let mut i = 0;
        while i < raw.len() {
            let column = i;
            let is_escape = raw[i] == '\\' && i + 1 < raw.len();
            if is_escape {
                i += 1;
            }
            line.chars.push(raw[i]);
            line.offsets.push(column);
            line.valid.push(true);
            line.escaped.push(is_escape);
            i += 1;
        }

        while line.chars.last().is_some_and(|c| c.is_whitespace()) {
            line.chars.pop();
            line.offsets.pop();
            line.valid.pop();
            line.escaped.pop();
        }

        line.all_same_character = line
            .chars
            .first()
            .is_some_and(|first| line.chars.iter().all(|c| c == first));
        line
    }

    /// Use a different delimiter set for `EraseStyle::InlineMarkup`
    pub fn with_delimiters(mut self, delimiters: &'static str) -> Self {
        self.delimiters = delimiters;
        self
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn line_no(&self) -> usize {
        self.line_no
    }

    pub fn section_level(&self) -> usize {
        self.section_level
    }

    pub fn set_section_level(&mut self, level: usize) {
        self.section_level = level;
    }

    pub fn list_level(&self) -> usize {
        self.list_level
    }

    pub fn set_list_level(&mut self, level: usize) {
        self.list_level = level;
    }

    pub fn is_list_start(&self) -> bool {
        self.list_start
    }

    pub fn set_list_start(&mut self, start: bool) {
        self.list_start = start;
    }

    pub fn in_block(&self) -> bool {
        self.in_block
    }

    pub fn set_in_block(&mut self, in_block: bool) {
        self.in_block = in_block;
    }

    /// Was the whole line erased?
    pub fn is_erased(&self) -> bool {
        self.erased
    }

    pub fn is_all_same_character(&self) -> bool {
        self.all_same_character
    }

    /// Visible char at `i`: `None` when erased or out of range, the escape sentinel
    /// for escaped chars
    pub fn char_at(&self, i: usize) -> Option<char> {
        if i >= self.chars.len() {
            return None;
        }
        if self.escaped[i] {
            return Some(ESCAPED_CHARACTER);
        }
        self.valid[i].then_some(self.chars[i])
    }

    /// Char at `i` regardless of validity; a space past the end
    pub fn raw_char_at(&self, i: usize) -> char {
        self.chars.get(i).copied().unwrap_or(' ')
    }

    pub fn is_valid(&self, i: usize) -> bool {
        self.valid.get(i).copied().unwrap_or(false)
    }

    /// Source column of char `i`; one past the last char for `i >= len`
    pub fn offset(&self, i: usize) -> usize {
        match self.offsets.get(i) {
            Some(column) => *column,
            None => self.offsets.last().map(|c| c + 1).unwrap_or(0),
        }
    }

    /// True when nothing but whitespace or erased chars remain
    pub fn is_empty(&self) -> bool {
        self.chars
            .iter()
            .zip(&self.valid)
            .all(|(c, valid)| c.is_whitespace() || !valid)
    }

    /// Do the visible chars at the start spell `prefix`?
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.matches_at(prefix, 0)
    }

    /// Erase `len` chars starting at `start`
    pub fn erase_range(&mut self, start: usize, len: usize) {
        let end = start.saturating_add(len).min(self.valid.len());
        for valid in self.valid.iter_mut().take(end).skip(start) {
            *valid = false;
        }
    }

    pub fn erase_all(&mut self) {
        self.valid.iter_mut().for_each(|v| *v = false);
        self.erased = true;
    }

    /// Erase every visible occurrence of `segment`
    pub fn erase_segment(&mut self, segment: &str) {
        let len = segment.chars().count();
        if len == 0 {
            return;
        }
        let mut i = 0;
        while i < self.chars.len() {
            if self.matches_at(segment, i) {
                self.erase_range(i, len);
                i += len;
            } else {
                i += 1;
            }
        }
    }

    /// Erase every `open … close` enclosure in the given style; returns where the first
    /// enclosure starts
    pub fn erase_enclosure(&mut self, open: &str, close: &str, style: EraseStyle) -> Option<usize> {
        let open_len = open.chars().count();
        let close_len = close.chars().count();
        let mut first = None;
        let mut from = 0;

        while let Some(start) = self.find(open, from) {
            let content = start + open_len;

            if style == EraseStyle::CloseMarkerContainsDelimiters {
                let end = (content..self.len())
                    .find(|&i| self.char_at(i).is_some_and(|c| close.contains(c)))
                    .unwrap_or(self.len());
                self.erase_range(start, end - start);
                first.get_or_insert(start);
                from = end.max(start + 1);
                continue;
            }

            if style == EraseStyle::InlineMarkup && !self.opens_inline(start, content) {
                from = start + 1;
                continue;
            }

            let found = if style == EraseStyle::InlineMarkup {
                self.find_inline_close(close, content + 1)
            } else {
                self.find(close, content)
            };
            let Some(end) = found else {
                if style == EraseStyle::InlineMarkup {
                    from = start + 1;
                    continue;
                }
                break;
            };

            match style {
                EraseStyle::None => return Some(start),
                EraseStyle::All => self.erase_range(start, end + close_len - start),
                EraseStyle::Markers | EraseStyle::InlineMarkup => {
                    self.erase_range(start, open_len);
                    self.erase_range(end, close_len);
                }
                EraseStyle::PreserveLabel => {
                    let label = (content..end).find(|&i| self.char_at(i) == Some(','));
                    let marker_end = label.map(|comma| comma + 1).unwrap_or(content);
                    self.erase_range(start, marker_end - start);
                    self.erase_range(end, close_len);
                }
                EraseStyle::CloseMarkerContainsDelimiters => {}
            }
            first.get_or_insert(start);
            from = end + close_len;
        }
        first
    }

    /// Positioned text of the visible chars
    pub fn visible_text(&self) -> OffsetText {
        let mut text = OffsetText::new();
        for i in (0..self.len()).filter(|&i| self.valid[i]) {
            text.push(self.chars[i], Position::new(self.line_no, self.offsets[i]));
        }
        text
    }

    /// Position just past the last char, where a line joiner is anchored
    pub fn end_position(&self) -> Position {
        Position::new(self.line_no, self.offset(self.len()))
    }

    fn matches_at(&self, pattern: &str, at: usize) -> bool {
        pattern
            .chars()
            .enumerate()
            .all(|(j, p)| self.char_at(at + j) == Some(p))
    }

    /// First visible occurrence of `pattern` at or after `from`
    pub fn find(&self, pattern: &str, from: usize) -> Option<usize> {
        (from..self.len()).find(|&i| self.matches_at(pattern, i))
    }

    /// Erased neighbours and line edges count as delimiters
    fn is_delimiter(&self, i: usize) -> bool {
        match self.char_at(i) {
            Some(c) => self.delimiters.contains(c),
            None => true,
        }
    }

    fn opens_inline(&self, start: usize, content: usize) -> bool {
        let outer_ok = start == 0 || self.is_delimiter(start - 1);
        let inner_ok = self.char_at(content).is_some_and(|c| !c.is_whitespace());
        outer_ok && inner_ok
    }

    fn find_inline_close(&self, close: &str, from: usize) -> Option<usize> {
        let close_len = close.chars().count();
        let mut search = from;
        while let Some(end) = self.find(close, search) {
            if self.is_delimiter(end + close_len) {
                return Some(end);
            }
            search = end + 1;
        }
        None
    }
}

/// Debug rendering: `X` for an erased line, `[` inside a block, then
/// `section-list-line`, `*` for a list start, and `·` before every erased char
impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}-{}-{:03}{} ",
            if self.erased { 'X' } else { ' ' },
            if self.in_block { '[' } else { ' ' },
            self.section_level,
            self.list_level,
            self.line_no,
            if self.list_start { '*' } else { ':' },
        )?;
        for (ch, valid) in self.chars.iter().zip(&self.valid) {
            if !valid {
                f.write_str("·")?;
            }
            write!(f, "{ch}")?;
        }
        Ok(())
    }
}

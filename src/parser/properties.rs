// WHY: only values are prose; keys, separators and escapes must vanish from the content
// while every decoded char still points at the source char (or backslash) it came from

use tracing::debug;

use super::{sentences_of, DocumentParser};
use crate::model::DocumentBuilder;
use crate::position::Position;
use crate::sentence::OffsetText;
use crate::sentence_extractor::SentenceExtractor;

/// Java-style `.properties` files
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertiesParser;

impl DocumentParser for PropertiesParser {
    fn name(&self) -> &'static str {
        "properties"
    }

    fn parse_lines(
        &self,
        lines: &[String],
        extractor: &SentenceExtractor,
        builder: &mut DocumentBuilder,
    ) {
        let mut index = 0;
        while index < lines.len() {
            let chars: Vec<char> = lines[index].chars().collect();
            let key_start = skip_whitespace(&chars, 0);
            if key_start == chars.len() || matches!(chars[key_start], '#' | '!') {
                index += 1;
                continue;
            }

            let entry_line = index + 1;
            let mut value = OffsetText::new();
            let mut current = chars;
            let mut from = value_offset(&current, key_start);

            // a trailing backslash folds the next physical line into the value
            while let Some(column) = decode_value(&current, index + 1, from, &mut value) {
                value.push('\n', Position::new(index + 1, column));
                index += 1;
                match lines.get(index) {
                    Some(next) => {
                        current = next.chars().collect();
                        from = skip_whitespace(&current, 0);
                    }
                    None => break,
                }
            }
            index += 1;

            debug!(line = entry_line, chars = value.char_len(), "Read property value");
            builder.add_section(0, Vec::new());
            builder.add_paragraph();
            builder.add_sentences(sentences_of(&value, extractor));
        }
    }
}

fn skip_whitespace(chars: &[char], start: usize) -> usize {
    chars[start.min(chars.len())..]
        .iter()
        .position(|c| !matches!(c, ' ' | '\t' | '\u{c}'))
        .map(|p| start + p)
        .unwrap_or(chars.len())
}

/// Column where the value starts: after the first `=`, `:`, `#` or `!`, or after the
/// whitespace ending the key; backslash escapes inside the key are skipped
fn value_offset(chars: &[char], key_start: usize) -> usize {
    let mut separator = None;
    let mut i = key_start;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            ':' | '=' | '#' | '!' => {
                separator = Some(i);
                break;
            }
            ' ' | '\t' | '\u{c}' => separator = Some(i),
            _ if separator.is_some() => break,
            _ => {}
        }
        i += 1;
    }
    match separator {
        Some(at) => skip_whitespace(chars, at + 1),
        None => chars.len(),
    }
}

/// Decode `chars[from..]` into `value`; returns the backslash column when the line
/// ends with a continuation
fn decode_value(chars: &[char], line: usize, from: usize, value: &mut OffsetText) -> Option<usize> {
    let mut i = from;
    while i < chars.len() {
        let position = Position::new(line, i);
        if chars[i] != '\\' {
            value.push(chars[i], position);
            i += 1;
            continue;
        }

        let Some(&escaped) = chars.get(i + 1) else {
            return Some(i);
        };
        let (decoded, consumed) = match escaped {
            'n' => ('\n', 2),
            't' => ('\t', 2),
            'r' => ('\r', 2),
            'f' => ('\u{c}', 2),
            'u' => match unicode_escape(&chars[i + 2..]) {
                Some(ch) => (ch, 6),
                None => ('u', 2),
            },
            other => (other, 2),
        };
        value.push(decoded, position);
        i += consumed;
    }
    None
}

fn unicode_escape(chars: &[char]) -> Option<char> {
    let digits: String = chars.iter().take(4).collect();
    if digits.chars().count() != 4 {
        return None;
    }
    u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32)
}

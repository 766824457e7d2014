// WHY: translators' text lives in quoted msgstr strings; offsets must point inside the
// quotes of the source line, not at a reassembled string

use tracing::debug;

use super::{sentences_of, DocumentParser};
use crate::model::DocumentBuilder;
use crate::position::Position;
use crate::sentence::OffsetText;
use crate::sentence_extractor::SentenceExtractor;

/// GNU gettext portable object (`.po`) catalogs
#[derive(Debug, Clone, Copy, Default)]
pub struct PortableObjectParser;

/// Which keyword a continuation string belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    None,
    Msgid,
    Msgstr,
    Other,
}

#[derive(Debug, Default)]
struct Entry {
    msgid: String,
    translations: Vec<OffsetText>,
    started: bool,
}

impl Entry {
    fn finish(&mut self, extractor: &SentenceExtractor, builder: &mut DocumentBuilder) {
        let entry = std::mem::take(self);
        if !entry.started {
            return;
        }
        if entry.msgid.is_empty() {
            debug!("Skipping catalog header entry");
            return;
        }
        if entry.translations.iter().all(OffsetText::is_blank) {
            debug!(msgid = %entry.msgid, "Skipping untranslated entry");
            return;
        }

        builder.add_paragraph();
        for translation in &entry.translations {
            builder.add_sentences(sentences_of(translation, extractor));
        }
    }
}

impl DocumentParser for PortableObjectParser {
    fn name(&self) -> &'static str {
        "po"
    }

    fn parse_lines(
        &self,
        lines: &[String],
        extractor: &SentenceExtractor,
        builder: &mut DocumentBuilder,
    ) {
        let mut entry = Entry::default();
        let mut field = Field::None;

        for (index, line) in lines.iter().enumerate() {
            let line_no = index + 1;
            let trimmed = line.trim_start();
            let indent = line.chars().count() - trimmed.chars().count();

            if trimmed.is_empty() {
                entry.finish(extractor, builder);
                field = Field::None;
            } else if trimmed.starts_with('#') {
                continue;
            } else if let Some(rest) = keyword_value(trimmed, "msgid") {
                entry.finish(extractor, builder);
                entry.started = true;
                field = Field::Msgid;
                let column = indent + (trimmed.chars().count() - rest.chars().count());
                entry.msgid = quoted(rest, line_no, column).as_str().to_string();
            } else if let Some(rest) = msgstr_value(trimmed) {
                field = Field::Msgstr;
                let column = indent + (trimmed.chars().count() - rest.chars().count());
                entry.translations.push(quoted(rest, line_no, column));
            } else if trimmed.starts_with('"') {
                let text = quoted(trimmed, line_no, indent);
                match field {
                    Field::Msgid => entry.msgid.push_str(text.as_str()),
                    Field::Msgstr => {
                        if let Some(last) = entry.translations.last_mut() {
                            last.append(text);
                        }
                    }
                    Field::None | Field::Other => {}
                }
            } else {
                // msgctxt, msgid_plural and anything unknown
                field = Field::Other;
            }
        }

        entry.finish(extractor, builder);
    }
}

/// Remainder after `keyword` and whitespace, if the line is exactly that keyword
fn keyword_value<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    rest.starts_with([' ', '\t']).then(|| rest.trim_start())
}

/// `msgstr "..."` or a plural form `msgstr[N] "..."`
fn msgstr_value(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("msgstr")?;
    let rest = match rest.strip_prefix('[') {
        Some(indexed) => {
            let close = indexed.find(']')?;
            &indexed[close + 1..]
        }
        None => rest,
    };
    rest.starts_with([' ', '\t']).then(|| rest.trim_start())
}

/// Decode one C-style quoted string starting at `column`; escapes map to their backslash
fn quoted(text: &str, line: usize, column: usize) -> OffsetText {
    let mut result = OffsetText::new();
    let mut chars = text.chars().enumerate();
    if !matches!(chars.next(), Some((_, '"'))) {
        return result;
    }

    while let Some((i, ch)) = chars.next() {
        let position = Position::new(line, column + i);
        match ch {
            '"' => break,
            '\\' => {
                let decoded = match chars.next() {
                    Some((_, 'n')) => '\n',
                    Some((_, 't')) => '\t',
                    Some((_, 'r')) => '\r',
                    Some((_, other)) => other,
                    None => break,
                };
                result.push(decoded, position);
            }
            _ => result.push(ch, position),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Document;
    use crate::sentence::Sentence;

    const CATALOG: &str = r#"# Translation catalog
msgid ""
msgstr ""
"Content-Type: text/plain; charset=UTF-8\n"

#: src/main.c:10
msgid "Hello"
msgstr "Bonjour. Comment allez-vous?"

msgid "Long"
msgstr ""
"Une phrase "
"sur deux lignes."

msgid "Missing"
msgstr ""
"#;

    fn parse(text: &str) -> Document {
        let extractor = SentenceExtractor::with_default_rules().unwrap();
        PortableObjectParser.parse_str(text, &extractor)
    }

    #[test]
    fn test_translations_become_paragraphs() {
        let document = parse(CATALOG);
        let root = &document.sections()[0];
        assert_eq!(root.paragraphs().len(), 2);

        let contents: Vec<_> = document.sentences().map(Sentence::content).collect();
        assert_eq!(
            contents,
            vec!["Bonjour.", " Comment allez-vous?", "Une phrase sur deux lignes."]
        );
    }

    #[test]
    fn test_offsets_point_inside_quotes() {
        let document = parse(CATALOG);
        let first = document.sentences().next().unwrap();
        assert_eq!(first.offsets()[0], Position::new(8, 8));

        let folded = document.sentences().nth(2).unwrap();
        assert_eq!(folded.offsets()[0], Position::new(12, 1));
        assert_eq!(folded.offsets()[11], Position::new(13, 1));
    }

    #[test]
    fn test_escape_anchored_at_backslash() {
        let document = parse("msgid \"x\"\nmsgstr \"a\\\"b\"\n");
        let sentence = document.sentences().next().unwrap();
        assert_eq!(sentence.content(), "a\"b");
        assert_eq!(sentence.offsets()[1], Position::new(2, 9));
        assert_eq!(sentence.offsets()[2], Position::new(2, 11));
    }

    #[test]
    fn test_plural_forms() {
        let document = parse("msgid \"file\"\nmsgid_plural \"files\"\nmsgstr[0] \"fichier\"\nmsgstr[1] \"fichiers\"\n");
        let contents: Vec<_> = document.sentences().map(Sentence::content).collect();
        assert_eq!(contents, vec!["fichier", "fichiers"]);
    }
}

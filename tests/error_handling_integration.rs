use std::io::{self, Read};

use folio::{DocumentParser, Format, ParseError};

#[path = "integration/mod.rs"]
mod test_utils;
use test_utils::{extractor, TestFixture};

/// Reader failing after handing out a first chunk
struct FailingReader {
    served: bool,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.served {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "stream cut"));
        }
        self.served = true;
        let chunk = b"A complete sentence.\nAnother";
        buf[..chunk.len()].copy_from_slice(chunk);
        Ok(chunk.len())
    }
}

/// Test parsing files with malformed UTF-8
#[test]
fn test_invalid_utf8_file_is_an_error() {
    let fixture = TestFixture::new();
    let path = fixture.create_document("broken.txt", [b'o', b'k', b'\n', 0xFF, 0xFE, 0xFD]);

    for format in Format::ALL {
        let result = format.parser().parse_file(&path, extractor());
        match result {
            Err(ParseError::File { path: reported, .. }) => assert!(reported.ends_with("broken.txt")),
            other => panic!("{format}: expected a file error, got {other:?}"),
        }
    }
}

/// Test parsing a path that does not exist
#[test]
fn test_missing_file_reports_path() {
    let fixture = TestFixture::new();
    let path = fixture.root_path.join("missing.adoc");

    let error = Format::AsciiDoc
        .parser()
        .parse_file(&path, extractor())
        .expect_err("Missing file should fail");
    assert!(error.to_string().contains("missing.adoc"));
}

/// Test that a stream failing midway yields no partial document
#[test]
fn test_stream_failure_aborts_parse() {
    let mut reader = FailingReader { served: false };
    let result = folio::parse(Format::Plain, &mut reader, None, extractor());
    assert!(matches!(result, Err(ParseError::Io(_))));
}

/// Test empty and whitespace-only files
#[test]
fn test_empty_and_blank_files() {
    let fixture = TestFixture::new();
    let empty = fixture.create_document("empty.md", "");
    let blank = fixture.create_document("blank.md", "   \n\n\t\n");

    for path in [empty, blank] {
        for format in Format::ALL {
            let document = format
                .parser()
                .parse_file(&path, extractor())
                .expect("Empty input is not an error");
            assert_eq!(document.sentences().count(), 0, "{format}");
            assert_eq!(document.sections()[0].level(), 0, "{format}");
            assert!(document.filename().is_some_and(|name| name.ends_with(".md")));
        }
    }
}

/// Test that malformed markup is recovered, never reported
#[test]
fn test_malformed_markup_is_recovered() {
    let cases = [
        (Format::Wiki, "h3. Deep first\nh9. not a header\n[[unterminated link\n[!-- never closed"),
        (Format::AsciiDoc, "----\nunclosed block\n<<dangling\n*half bold"),
        (Format::Markdown, "```\nunclosed fence\n<!-- open comment"),
        (Format::PortableObject, "msgstr \"orphan\"\n\"stray\"\nmsgid"),
        (Format::Properties, "=\n\\\nkey=\\"),
        (Format::Review, "//list[x]{\nunclosed\n@<b>{dangling\n==[column"),
    ];
    for (format, source) in cases {
        let document = format.parser().parse_str(source, extractor());
        assert!(!document.is_empty(), "{format}");
    }
}

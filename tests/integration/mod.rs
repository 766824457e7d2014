// Shared helpers for the integration tests
// WHY: extractors are compiled once per test binary and fixtures write real files so
// the file-backed parse path is exercised

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tempfile::TempDir;

use folio::{Document, SentenceExtractor};

static SHARED_EXTRACTOR: OnceLock<SentenceExtractor> = OnceLock::new();
static SHARED_JAPANESE_EXTRACTOR: OnceLock<SentenceExtractor> = OnceLock::new();

/// Default English extractor, compiled once per test binary
pub fn extractor() -> &'static SentenceExtractor {
    SHARED_EXTRACTOR.get_or_init(|| {
        SentenceExtractor::with_default_rules().expect("Default rules should compile")
    })
}

pub fn japanese_extractor() -> &'static SentenceExtractor {
    SHARED_JAPANESE_EXTRACTOR.get_or_init(|| {
        SentenceExtractor::for_language("ja").expect("Japanese rules should compile")
    })
}

/// Temporary directory holding documents written by a test
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();

        Self {
            temp_dir,
            root_path,
        }
    }

    /// Write a document below the fixture root
    pub fn create_document<P: AsRef<Path>>(&self, relative_path: P, content: impl AsRef<[u8]>) -> PathBuf {
        let file_path = self.root_path.join(relative_path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        fs::write(&file_path, content).expect("Failed to write test document");
        file_path
    }
}

/// Every char of every sentence must point at the source char it came from
///
/// A char decoded from an escape sequence points at the escape's backslash. Whitespace
/// may also stand for a folded line break, so it may point at other whitespace or just
/// past the end of a line.
pub fn assert_offsets_match_source(document: &Document, source: &str) {
    let lines: Vec<Vec<char>> = source.lines().map(|line| line.chars().collect()).collect();

    for sentence in document.sentences() {
        assert_eq!(sentence.content().chars().count(), sentence.offsets().len());
        for (ch, position) in sentence.content().chars().zip(sentence.offsets()) {
            let source_char = lines
                .get(position.line - 1)
                .and_then(|line| line.get(position.column))
                .copied();
            let matches = match source_char {
                Some(found) if found == ch || found == '\\' => true,
                Some(found) => ch.is_whitespace() && found.is_whitespace(),
                None => ch.is_whitespace(),
            };
            assert!(
                matches,
                "char {ch:?} of {:?} points at {position}, which holds {source_char:?}",
                sentence.content()
            );
        }
    }
}

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::error::ParseError;

/// Configuration for line reading behavior
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Capacity of the read buffer in bytes
    pub buffer_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            buffer_size: 8192,
        }
    }
}

/// Statistics for one read operation
#[derive(Debug, Clone, Default)]
pub struct ReadStats {
    pub source: String,
    pub lines_read: u64,
    pub bytes_read: u64,
    pub duration_ms: u64,
}

/// Blocking reader that splits a UTF-8 stream into physical lines
///
/// Line terminators (`\n` or `\r\n`) are stripped. Invalid UTF-8 aborts the read: no
/// partial line list is returned.
#[derive(Debug, Clone, Default)]
pub struct LineReader {
    config: ReaderConfig,
}

impl LineReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Read every line of `input`; `source` names the stream in logs and stats
    pub fn read_lines(
        &self,
        input: &mut dyn Read,
        source: &str,
    ) -> Result<(Vec<String>, ReadStats), ParseError> {
        let start_time = Instant::now();
        debug!("Starting read of {}", source);

        let reader = BufReader::with_capacity(self.config.buffer_size, input);
        let mut lines = Vec::new();
        let mut byte_count = 0u64;

        for line in reader.lines() {
            match line {
                Ok(line) => {
                    byte_count += line.len() as u64 + 1; // +1 for newline
                    lines.push(line);
                }
                Err(e) => {
                    warn!("Read error in {} at line {}: {}", source, lines.len() + 1, e);
                    return Err(ParseError::Io(e));
                }
            }
        }

        let stats = ReadStats {
            source: source.to_string(),
            lines_read: lines.len() as u64,
            bytes_read: byte_count,
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        debug!(
            "Read {}: {} lines, {} bytes in {}ms",
            source, stats.lines_read, stats.bytes_read, stats.duration_ms
        );
        Ok((lines, stats))
    }

    /// Read a file from disk, attaching the path to any error
    pub fn read_file_lines<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(Vec<String>, ReadStats), ParseError> {
        let path = path.as_ref();
        let to_error = |source| ParseError::File {
            path: path.display().to_string(),
            source,
        };

        let mut file = File::open(path).map_err(to_error)?;
        let result = self
            .read_lines(&mut file, &path.display().to_string())
            .map_err(|e| match e {
                ParseError::Io(source) => to_error(source),
                other => other,
            })?;

        info!(
            "Successfully read {}: {} lines, {} bytes",
            path.display(),
            result.1.lines_read,
            result.1.bytes_read
        );
        Ok(result)
    }
}

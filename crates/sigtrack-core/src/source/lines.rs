use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::source::{PayloadLine, PayloadSource, SourceError};

const COMMENT_PREFIX: char = '#';

/// Line-oriented payload source: one hex payload per line.
///
/// Surrounding whitespace is trimmed; blank lines and `#` comments are
/// skipped but still counted, so line numbers match the input file.
pub struct LineSource<R> {
    reader: R,
    line: u64,
    buf: String,
}

impl LineSource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> PayloadSource for LineSource<R> {
    fn next_payload(&mut self) -> Result<Option<PayloadLine>, SourceError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            let hex = self.buf.trim();
            if hex.is_empty() || hex.starts_with(COMMENT_PREFIX) {
                continue;
            }
            return Ok(Some(PayloadLine {
                line: self.line,
                hex: hex.to_string(),
            }));
        }
    }
}

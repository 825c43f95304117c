mod lines;

pub use lines::LineSource;

use thiserror::Error;

/// One payload read from a source, with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadLine {
    pub line: u64,
    pub hex: String,
}

pub trait PayloadSource {
    fn next_payload(&mut self) -> Result<Option<PayloadLine>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

//! Error types for the essay annotation library

use thiserror::Error;

/// Result type alias for this library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while annotating an essay corpus
#[derive(Error, Debug)]
pub enum Error {
    /// Input unreadable or output unwritable
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Upstream annotation is missing required fields
    #[error("ingest error: {0}")]
    Ingest(String),

    /// A mention refers to a sentence or token index that does not exist
    #[error("span error: {0}")]
    Span(String),

    /// Failure talking to the NLP pipeline server
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// Error decoding JSON
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

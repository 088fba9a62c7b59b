//! Error kinds for the engine.
//!
//! Input errors are reported by ingestion and terminate the offending
//! worker (the coordinator is not informed and will hang — a known
//! limitation). Protocol errors and counter overflow are fatal
//! everywhere. A declined donation is not an error at all; it is
//! tracked in the `rejected` statistic and execution continues locally.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to read edge list from {path}: {source}")]
    InputIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed edge list line {line_no}: {text:?}")]
    InputMalformed { line_no: usize, text: String },

    #[error("protocol error: expected {expected} on tag {tag:?}, got something else")]
    Protocol {
        tag: crate::messages::Tag,
        expected: &'static str,
    },

    #[error("clique count for size {size} overflowed a 64-bit counter")]
    CountOverflow { size: usize },
}

pub type Result<T> = std::result::Result<T, EngineError>;

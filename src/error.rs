use std::io;

use thiserror::Error;

/// Errors produced while building or querying a track index.
#[derive(Error, Debug)]
pub enum TrackError {
    /// The output directory could not be prepared, or a chunk could not be
    /// persisted. Fatal for the current reference-sequence load.
    #[error("I/O failure: {0}")]
    Io(#[from] io::Error),

    /// An operation was invoked out of order, or input violated the sorted
    /// precondition. Caller programming defect.
    #[error("operation out of sequence: {0}")]
    Sequence(&'static str),

    /// A requested field name is absent from every registered class schema.
    #[error("unknown field `{0}` in class schema")]
    UnknownField(String),

    /// A feature referenced a class id that was never registered.
    #[error("unknown feature class id {0}")]
    UnknownClass(usize),

    /// The interval index has not been finalized yet.
    #[error("interval index is not finalized")]
    NotReady,

    #[error("serialization failure: {0}")]
    Json(#[from] serde_json::Error),
}

pub type TrackResult<T> = Result<T, TrackError>;

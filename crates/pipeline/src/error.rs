//! Pipeline Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.
//!
//! Two levels share this type. Step-level kinds stop a step before it
//! processes anything; item-level kinds are caught at the task boundary
//! and only ever counted in a [`BatchReport`](crate::BatchReport).

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A pipeline error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    // Step-level.
    #[display("failed to read catalog: {}", _0.display())]
    Catalog(#[error(not(source))] PathBuf),
    /// An intermediate table is missing or unreadable, usually because the
    /// step producing it hasn't run yet.
    #[display("failed to read intermediate table: {}", _0.display())]
    ReadTable(#[error(not(source))] PathBuf),
    #[display("failed to write intermediate table: {}", _0.display())]
    WriteTable(#[error(not(source))] PathBuf),
    #[display("failed to write final tables")]
    Index,
    #[display("failed to load final tables into the database")]
    Database,

    // Item-level.
    #[display("failed to read {}", _0.display())]
    Read(#[error(not(source))] PathBuf),
    #[display("failed to decode container")]
    Container,
    #[display("failed to write {}", _0.display())]
    Write(#[error(not(source))] PathBuf),
    /// A worker task panicked or was cancelled.
    #[display("worker task failed")]
    Worker,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Write(_) | Self::Database)
    }
}

//! Container Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Every variant describes a single container; none of
//! them should ever stop a batch from processing the next one.

use derive_more::{Display, Error};

/// A container error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for container operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// No raster or texture signature inside the search window.
    #[display("no image payload found within the first {_0} bytes")]
    PayloadNotFound(#[error(not(source))] usize),
    /// The payload was found but its structure is broken.
    #[display("decode error: {_0}")]
    Decode(#[error(not(source))] String),
    /// The texture uses a pixel format we don't decompress.
    #[display("unsupported texture format: {_0}")]
    UnsupportedFormat(#[error(not(source))] String),
    /// A value could not be parsed into one of the container models.
    #[display("failed to parse field '{field}', found value: {value}")]
    ParseError {
        /// The field that failed to parse.
        field: &'static str,
        /// The offending value.
        value: String,
    },
    /// Reading the container or writing the decoded output failed.
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    pub(crate) fn decode(reason: impl Into<String>) -> Self {
        Self::Decode(reason.into())
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // The bytes in the cache don't change between attempts; only the
        // output side (disk full, permissions) is worth another go.
        matches!(self, Self::Io)
    }
}

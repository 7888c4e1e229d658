//! Error types for usb-ids-parser.

use thiserror::Error;

/// The line source failed before it reached its end.
///
/// No partial collection survives this error.
#[derive(Debug, Error)]
#[error("failed to read line {line}: {source}")]
pub struct SourceReadError {
    /// 1-based number of the line that could not be read
    pub line: usize,
    #[source]
    pub source: std::io::Error,
}

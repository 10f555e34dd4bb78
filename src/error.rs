//! Error types for planilla.

use std::path::PathBuf;

/// Result type alias for planilla operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during conversion.
///
/// Every failure is reported as one of three kinds so callers can react
/// differently: re-select the input file, re-select the output location,
/// or surface the message as-is. None of them should terminate the host
/// process, and the library never logs — presentation is the caller's job.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The CSV source is missing, unreadable, or not valid CSV.
    #[error("Invalid source {path:?}: {reason}")]
    SourceInvalid {
        /// The source path, if the data came from a file.
        path: Option<PathBuf>,
        /// Description of what is wrong with the source.
        reason: String,
    },

    /// The destination directory is missing or not writable.
    #[error("Invalid destination {path:?}: {reason}")]
    DestinationInvalid {
        /// The destination path or directory that was rejected.
        path: PathBuf,
        /// Description of what is wrong with the destination.
        reason: String,
    },

    /// Any other failure during read or write.
    #[error("Unexpected failure: {message}")]
    Unexpected {
        /// Description of the failure.
        message: String,
    },
}

impl Error {
    /// Create a source error with a path context.
    pub fn source_invalid(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::SourceInvalid {
            path: Some(path.into()),
            reason: reason.into(),
        }
    }

    /// Create a source error without path context (in-memory input).
    pub fn source_invalid_no_path(reason: impl Into<String>) -> Self {
        Self::SourceInvalid {
            path: None,
            reason: reason.into(),
        }
    }

    /// Create a destination error.
    pub fn destination_invalid(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::DestinationInvalid {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an unexpected-failure error.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }
}

//! Error types that can be emitted from this library

use std::{fmt::Display, path::PathBuf};

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(binrw::Error),

    /// Transparent wrapper for [`serde_json::Error`]
    #[cfg(feature = "serde")]
    #[error(transparent)]
    ConfigError(#[from] serde_json::Error),

    /// The data ended in the middle of a value
    ///
    /// Parsers treat this as recoverable: whatever was fully decoded before it is still returned.
    #[error("unexpected end of stream")]
    #[diagnostic(help("the file is truncated, loading with force keeps the frames read so far"))]
    EndOfStream,

    /// '{file}': invalid {field}
    #[error("'{file}': invalid {field}={observed} (expected {expected})")]
    InvalidFile {
        /// Name of the file being decoded
        file: String,
        /// The offending field
        field: &'static str,
        /// The value found in the file
        observed: String,
        /// The value, or range of values, that was expected
        expected: String,
    },

    /// '{file}': {format} is not implemented
    #[error("'{file}': {format} is not implemented")]
    NotImplemented {
        /// Name of the file being decoded
        file: String,
        /// The recognized but unsupported format
        format: &'static str,
    },

    /// '{0}': unsupported file
    #[error("'{0}': unsupported file")]
    UnsupportedFile(String),

    /// {0} recordings cannot be written
    #[error("{0} recordings cannot be written")]
    ReadOnlyFormat(&'static str),

    /// '{0}': file already exists
    #[error("'{}': file already exists", .0.display())]
    AlreadyExists(PathBuf),

    /// recording version is not set
    #[error("recording version is not set")]
    MissingVersion,

    /// recording version is already set to {0}
    #[error("recording version is already set to {0}")]
    VersionAlreadySet(u16),

    /// frame {index} has {size} bytes of data
    #[error("frame {index} has {size} bytes of data (expected 1..=65535)")]
    InvalidFrameSize {
        /// Position of the frame in the recording
        index: usize,
        /// Size of the frame data
        size: usize,
    },
}

impl Error {
    /// Build an [`Error::InvalidFile`] for `field` of `file`
    pub fn invalid(
        file: impl Into<String>,
        field: &'static str,
        observed: impl Display,
        expected: impl Display,
    ) -> Self {
        Error::InvalidFile {
            file: file.into(),
            field,
            observed: observed.to_string(),
            expected: expected.to_string(),
        }
    }

    /// Whether this error only signals that the data was truncated
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Error::EndOfStream)
    }
}

impl From<binrw::Error> for Error {
    fn from(value: binrw::Error) -> Self {
        if value.is_eof() {
            return Error::EndOfStream;
        }

        match value {
            binrw::Error::Io(e) => Error::IOError(e),
            e => Error::BinRWError(e),
        }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;

//! Error type shared by the containers and the binary codec.

use thiserror::Error;

use crate::item::InsertionId;

/// Every failure a container or codec operation can report.
///
/// Operations fail fast: a returned error means the container was left
/// exactly as it was before the call.
#[derive(Error, Debug)]
pub enum Error {
    /// Position outside the live range
    #[error("invalid index: {index} (count {len})")]
    InvalidIndex {
        /// The rejected position
        index: usize,
        /// Live element count at the time of the call
        len: usize,
    },

    /// No live element carries this insertion id
    #[error("no element with insertion id {id}")]
    UnknownId {
        /// The id that was looked up
        id: InsertionId,
    },

    /// A live element has no binary encoding
    #[error("element {name:?} at position {position} cannot be serialized")]
    NotSerializable {
        /// Position of the first offending element
        position: usize,
        /// Its name, for the caller's report
        name: String,
    },

    /// Stream is truncated or otherwise unreadable
    #[error("malformed data: {message}")]
    MalformedData {
        /// What was wrong with the stream
        message: String,
    },

    /// Argument rejected before any mutation took place
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Why the argument was rejected
        message: String,
    },

    /// Underlying file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid index error
    pub fn invalid_index(index: usize, len: usize) -> Self {
        Self::InvalidIndex { index, len }
    }

    /// Create an unknown insertion id error
    pub fn unknown_id(id: InsertionId) -> Self {
        Self::UnknownId { id }
    }

    /// Create a not serializable error
    pub fn not_serializable<S: Into<String>>(position: usize, name: S) -> Self {
        Self::NotSerializable { position, name: name.into() }
    }

    /// Create a malformed data error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedData { message: message.into() }
    }

    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument { message: message.into() }
    }

    /// Short category name, handy for CLI reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidIndex { .. } | Self::UnknownId { .. } => "index",
            Self::NotSerializable { .. } => "serialize",
            Self::MalformedData { .. } => "data",
            Self::InvalidArgument { .. } => "argument",
            Self::Io(_) => "io",
        }
    }
}

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Fail with `InvalidIndex` unless `index < len`
#[inline]
pub fn check_index(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(Error::invalid_index(index, len))
    }
}

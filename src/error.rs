// Error taxonomy shared by every traversal

use thiserror::Error;

/// Errors surfaced by sources, framing primitives and traversals
#[derive(Debug, Error)]
pub enum Error {
    /// A fixed-width read asked for more bytes than the source holds
    #[error("unexpected end of data at offset {offset} (wanted {wanted} bytes)")]
    UnexpectedEof { offset: u64, wanted: usize },

    /// An explicit seek outside `[0, size]`
    #[error("offset {offset} is outside the source (size {size})")]
    OutOfRange { offset: u64, size: u64 },

    /// Declared length or magic is self-evidently invalid
    #[error("corrupt header {id} at offset {offset}: {reason}")]
    CorruptHeader {
        id: String,
        offset: u64,
        reason: String,
    },

    /// A chunk decoder rejected its data window
    #[error("failed to decode chunk {id} at offset {offset}: {reason}")]
    ChunkDecodeFailed {
        id: String,
        offset: u64,
        reason: String,
    },

    #[error("no container header found (first bytes: {found:?})")]
    NoContainerHeaderFound { found: String },

    #[error("no setup block: could not resolve granule position of the final page")]
    NoSetupBlock,

    #[error("file too small to be a valid audio file ({size} bytes, minimum {minimum})")]
    FileTooSmall { size: u64, minimum: u64 },

    #[error("unrecognised container format")]
    UnknownFormat,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn corrupt(id: impl ToString, offset: u64, reason: impl Into<String>) -> Self {
        Error::CorruptHeader {
            id: id.to_string(),
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn decode_failed(id: impl ToString, offset: u64, err: DecodeError) -> Self {
        Error::ChunkDecodeFailed {
            id: id.to_string(),
            offset,
            reason: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by a pluggable chunk decoder
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("data window truncated")]
    Truncated,
    #[error("{0}")]
    Invalid(String),
}

impl From<std::io::Error> for DecodeError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::UnexpectedEof => DecodeError::Truncated,
            _ => DecodeError::Invalid(e.to_string()),
        }
    }
}

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

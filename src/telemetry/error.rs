//! Error types for catalog lookups, region mapping and sample extraction.
//!
//! Every variant belongs to one of three [`ErrorKind`]s:
//!
//! - [`ErrorKind::NotFound`]: an unknown counter name or id was passed to a
//!   descriptor lookup. Caller-correctable.
//! - [`ErrorKind::Io`]: the telemetry region could not be opened, sized or
//!   mapped. Fatal to that `open` attempt; nothing is retried.
//! - [`ErrorKind::InvalidCatalog`]: a catalog entry describes a field that
//!   cannot be read correctly.

use std::num::ParseIntError;
use std::path::PathBuf;

use crate::fsutil;

use super::CounterId;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Io,
    InvalidCatalog,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown counter `{name}`")]
    UnknownCounter { name: String },

    #[error("unknown counter id {id}")]
    UnknownId { id: CounterId },

    #[error(transparent)]
    FileOpen(#[from] fsutil::FileOpenError),

    #[error("failed to read telemetry size from `{path}`: {source}")]
    ReadSize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid telemetry size in `{path}`: '{value}': {source}")]
    InvalidSize {
        path: PathBuf,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("telemetry size in `{path}` is zero")]
    ZeroSize { path: PathBuf },

    #[error("telemetry region `{path}` holds {actual} bytes but {declared} are declared")]
    Truncated {
        path: PathBuf,
        declared: usize,
        actual: u64,
    },

    #[error("failed to map telemetry region `{path}`: {source}")]
    Map {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sample of `{name}` at bit {offset} with width {size} does not fit a 64-bit word")]
    InvalidSample { name: String, offset: u64, size: u64 },

    #[error("duplicate counter `{name}`")]
    DuplicateCounter { name: String },

    #[error("counter `{name}` refers to unknown operand {operand}")]
    UnknownOperand { name: String, operand: CounterId },

    #[error("sample {id} (bytes {start}..{end}) lies outside the {len}-byte telemetry region")]
    SampleOutOfBounds {
        id: CounterId,
        start: u64,
        end: u64,
        len: usize,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnknownCounter { .. } | Error::UnknownId { .. } => ErrorKind::NotFound,
            Error::FileOpen(_)
            | Error::ReadSize { .. }
            | Error::InvalidSize { .. }
            | Error::ZeroSize { .. }
            | Error::Truncated { .. }
            | Error::Map { .. } => ErrorKind::Io,
            Error::InvalidSample { .. }
            | Error::DuplicateCounter { .. }
            | Error::UnknownOperand { .. }
            | Error::SampleOutOfBounds { .. } => ErrorKind::InvalidCatalog,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn is_io(&self) -> bool {
        self.kind() == ErrorKind::Io
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = Error::UnknownCounter {
            name: "foo".to_owned(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_io());

        let err = Error::ZeroSize {
            path: PathBuf::from("/sys/class/intel_pmt/telem0/size"),
        };
        assert!(err.is_io());
        assert_eq!(
            err.to_string(),
            "telemetry size in `/sys/class/intel_pmt/telem0/size` is zero"
        );

        let err = Error::InvalidSample {
            name: "bar".to_owned(),
            offset: 7,
            size: 58,
        };
        assert_eq!(err.kind(), ErrorKind::InvalidCatalog);
    }
}

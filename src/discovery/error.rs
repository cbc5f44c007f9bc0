use std::path::PathBuf;

use crate::fsutil;
use crate::telemetry;

/// Errors that may occur while discovering PMT endpoints.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read directory `{path}`: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    ReadGuid(#[from] fsutil::ReadLineError),
    #[error("invalid guid '{value}' in file `{path}`")]
    InvalidGuid { path: PathBuf, value: String },
    #[error("no catalog registered for guid {guid:#x} of device `{path}`")]
    UnknownFamily { guid: u64, path: PathBuf },
    #[error("failed to describe device `{path}`: {source}")]
    Describe {
        path: PathBuf,
        #[source]
        source: telemetry::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

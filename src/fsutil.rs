use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Error that occurs when opening a file fails.
#[derive(Debug, thiserror::Error)]
#[error("failed to open file `{path}`: {source}")]
pub struct FileOpenError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Error that occurs when reading a single-value attribute file fails.
#[derive(Debug, thiserror::Error)]
pub enum ReadLineError {
    #[error(transparent)]
    Open(#[from] FileOpenError),
    #[error("failed to read line for file `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ReadLineError {
    /// Returns the underlying I/O error.
    pub fn io_error(&self) -> &io::Error {
        match self {
            ReadLineError::Open(err) => &err.source,
            ReadLineError::Read { source, .. } => source,
        }
    }
}

/// Opens a file at the given path and wraps it in a [`BufReader`].
///
/// # Errors
///
/// Returns a [`FileOpenError`] if the file cannot be opened.
///
/// # Example
/// ```no_run
/// # use pmt_monitor::fsutil;
/// let reader = fsutil::open_file_reader("/sys/class/intel_pmt/telem0/size")?;
/// # Ok::<(), fsutil::FileOpenError>(())
/// ```
pub fn open_file_reader(path: impl AsRef<Path>) -> Result<BufReader<File>, FileOpenError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| FileOpenError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Reads the first line of a sysfs-style attribute file with surrounding
/// whitespace removed.
///
/// An empty file yields an empty string.
///
/// # Errors
///
/// Returns [`ReadLineError::Open`] if the file cannot be opened and
/// [`ReadLineError::Read`] if reading from it fails.
pub fn read_trimmed_line(path: impl AsRef<Path>) -> Result<String, ReadLineError> {
    let path = path.as_ref();
    let mut reader = open_file_reader(path)?;
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .map_err(|source| ReadLineError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(line.trim().to_owned())
}

#[cfg(test)]
mod tests {

    use super::*;
    use std::io::Write;

    #[test]
    fn test_open_file_reader_success() {
        let tmp = tempfile::NamedTempFile::new().expect("failed to create temp file");
        let path = tmp.path();
        let reader = open_file_reader(path).expect("should open test file");
        let metadata = reader.get_ref().metadata().unwrap();
        assert!(metadata.is_file());
    }

    #[test]
    fn test_open_file_reader_error() {
        let result = open_file_reader("/definitely/does/not/exist");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.path, PathBuf::from("/definitely/does/not/exist"));
        assert_eq!(err.source.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_read_trimmed_line() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "  4096\n0x1234\n").unwrap();
        assert_eq!(read_trimmed_line(tmp.path()).unwrap(), "4096");
    }

    #[test]
    fn test_read_trimmed_line_empty_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(read_trimmed_line(tmp.path()).unwrap(), "");
    }

    #[test]
    fn test_read_trimmed_line_missing_file() {
        let err = read_trimmed_line("/definitely/does/not/exist").unwrap_err();
        assert!(matches!(err, ReadLineError::Open(_)));
        assert_eq!(err.io_error().kind(), std::io::ErrorKind::NotFound);
    }
}

/// Converts a `Result` into an `Option`, logging the error instead of
/// propagating it.
///
/// Used where one failing item must not abort a whole scan, e.g. a single
/// unreadable endpoint during discovery.
pub trait ResultOkLogExt<T, E> {
    /// Logs the error at warning level and returns `None`.
    fn ok_log(self) -> Option<T>;
}

impl<T, E> ResultOkLogExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_log(self) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::warn!("{err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_log() {
        let ok: Result<u8, std::io::Error> = Ok(3);
        assert_eq!(ok.ok_log(), Some(3));

        let err: Result<u8, std::io::Error> = Err(std::io::Error::other("boom"));
        assert_eq!(err.ok_log(), None);
    }
}

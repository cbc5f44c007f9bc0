use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ResultOkLogExt;
use crate::fsutil;

use super::{Error, Result};

/// Default location of PMT telemetry endpoints.
pub const DEFAULT_SYSFS_ROOT: &str = "/sys/class/intel_pmt";

/// File holding an endpoint's unique id.
pub const GUID_FILE: &str = "guid";

const TELEM_PREFIX: &str = "telem";

/// A PMT telemetry endpoint found on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredDevice {
    /// Endpoint directory, e.g. `/sys/class/intel_pmt/telem0`.
    pub path: PathBuf,
    /// Unique id identifying the endpoint's catalog layout.
    pub guid: u64,
}

/// Lists the telemetry endpoints below `root`.
///
/// Every directory entry named `telem*` is an endpoint; its `guid` file holds
/// the unique id in hexadecimal. Endpoints whose guid cannot be read are
/// logged and skipped. The result is sorted by path.
///
/// # Errors
///
/// Returns [`Error::ReadDir`] if `root` cannot be listed.
///
/// # Example
///
/// ```no_run
/// use pmt_monitor::discovery::{discover, DEFAULT_SYSFS_ROOT};
///
/// for device in discover(DEFAULT_SYSFS_ROOT).unwrap() {
///     println!("{} ({:#x})", device.path.display(), device.guid);
/// }
/// ```
pub fn discover(root: impl AsRef<Path>) -> Result<Vec<DiscoveredDevice>> {
    let root = root.as_ref();
    let read_dir_err = |source| Error::ReadDir {
        path: root.to_path_buf(),
        source,
    };

    let mut devices = Vec::new();
    for entry in std::fs::read_dir(root).map_err(read_dir_err)? {
        let entry = entry.map_err(read_dir_err)?;
        let name = entry.file_name();
        if !name.to_string_lossy().starts_with(TELEM_PREFIX) {
            continue;
        }

        let path = entry.path();
        if let Some(guid) = read_guid(&path).ok_log() {
            log::trace!(
                target: "discovery",
                "discovered PMT endpoint: path={}, guid={:#x}",
                path.display(),
                guid
            );
            devices.push(DiscoveredDevice { path, guid });
        }
    }

    devices.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(devices)
}

/// Reads the unique id of the endpoint at `device_path`.
///
/// # Errors
///
/// - [`Error::ReadGuid`] if the `guid` file cannot be read.
/// - [`Error::InvalidGuid`] if its content is not a hexadecimal number.
pub fn read_guid(device_path: impl AsRef<Path>) -> Result<u64> {
    let path = device_path.as_ref().join(GUID_FILE);
    let value = fsutil::read_trimmed_line(&path)?;
    parse_guid(&value).ok_or(Error::InvalidGuid { path, value })
}

fn parse_guid(value: &str) -> Option<u64> {
    let hex = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    u64::from_str_radix(hex, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_endpoint(root: &Path, name: &str, guid: &str) -> PathBuf {
        let path = root.join(name);
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join(GUID_FILE), guid).unwrap();
        path
    }

    #[test]
    fn test_parse_guid() {
        assert_eq!(parse_guid("0x1a2b3c4d"), Some(0x1a2b_3c4d));
        assert_eq!(parse_guid("1A2B3C4D"), Some(0x1a2b_3c4d));
        assert_eq!(parse_guid("0xzz"), None);
        assert_eq!(parse_guid(""), None);
    }

    #[test]
    fn test_discover_sorted_endpoints() {
        let root = tempfile::tempdir().unwrap();
        let t1 = add_endpoint(root.path(), "telem1", "0x22\n");
        let t0 = add_endpoint(root.path(), "telem0", "0x11\n");
        std::fs::create_dir(root.path().join("crashlog0")).unwrap();

        let devices = discover(root.path()).unwrap();
        assert_eq!(
            devices,
            vec![
                DiscoveredDevice { path: t0, guid: 0x11 },
                DiscoveredDevice { path: t1, guid: 0x22 },
            ]
        );
    }

    #[test]
    fn test_discover_skips_unreadable_guid() {
        let root = tempfile::tempdir().unwrap();
        add_endpoint(root.path(), "telem0", "garbage");
        std::fs::create_dir(root.path().join("telem1")).unwrap();
        let good = add_endpoint(root.path(), "telem2", "0xabc");

        let devices = discover(root.path()).unwrap();
        assert_eq!(devices, vec![DiscoveredDevice { path: good, guid: 0xabc }]);
    }

    #[test]
    fn test_discover_missing_root() {
        let err = discover("/definitely/does/not/exist").unwrap_err();
        match err {
            Error::ReadDir { path, source } => {
                assert_eq!(path, PathBuf::from("/definitely/does/not/exist"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_read_guid_invalid() {
        let root = tempfile::tempdir().unwrap();
        let path = add_endpoint(root.path(), "telem0", "not-hex");
        match read_guid(&path).unwrap_err() {
            Error::InvalidGuid { value, .. } => assert_eq!(value, "not-hex"),
            other => panic!("unexpected error: {other}"),
        }
    }
}

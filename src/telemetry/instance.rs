//! Live, read-only mapping of a PMT endpoint's telemetry region.
//!
//! [`DeviceInstance::open`] maps `<device>/telem` for exactly the number of
//! bytes declared in `<device>/size`. The instance owns both the file handle
//! and the mapping and releases them together when dropped. Instances are
//! move-only; every accessor borrows the live instance, so the mapping can
//! never be read after release.
//!
//! Reads go straight to the shared mapping and observe whatever the hardware
//! last wrote. Separate reads are not consistent with each other; use
//! [`DeviceInstance::snapshot`] when several counters must come from the same
//! image.

use std::fs::File;
use std::path::Path;

use memmap2::{Mmap, MmapOptions};

use crate::fsutil::{self, ReadLineError};

use super::{CounterId, Device, Error, Reading, Result, SampleView};

/// Raw telemetry buffer of an endpoint.
pub const TELEM_FILE: &str = "telem";
/// Decimal byte count of [`TELEM_FILE`].
pub const SIZE_FILE: &str = "size";

/// Owned mapping of one device's telemetry region.
#[derive(Debug)]
pub struct DeviceInstance<'d> {
    device: &'d dyn Device,
    map: Mmap,
    _file: File,
}

impl<'d> DeviceInstance<'d> {
    /// Opens and maps the telemetry region of `device`.
    ///
    /// # Errors
    ///
    /// - [`Error::FileOpen`] if `telem` or `size` cannot be opened.
    /// - [`Error::ReadSize`], [`Error::InvalidSize`] or [`Error::ZeroSize`] if
    ///   `size` does not hold a positive decimal integer.
    /// - [`Error::Truncated`] if `telem` is a regular file shorter than the
    ///   declared size.
    /// - [`Error::Map`] if mapping fails.
    ///
    /// No resources are held after a failed open.
    pub fn open(device: &'d dyn Device) -> Result<Self> {
        let telem_path = device.path().join(TELEM_FILE);
        let file = File::open(&telem_path).map_err(|source| fsutil::FileOpenError {
            path: telem_path.clone(),
            source,
        })?;

        let size = region_size(device.path())?;
        check_region_len(&file, &telem_path, size)?;

        // SAFETY: the region is mapped read-only and only ever copied out of;
        // concurrent updates by the kernel change values, never the layout.
        let map = unsafe { MmapOptions::new().len(size).map(&file) }.map_err(|source| {
            Error::Map {
                path: telem_path.clone(),
                source,
            }
        })?;

        log::debug!(
            target: "device instance",
            "mapped telemetry region: path={}, unique_id={:#x}, size={}",
            telem_path.display(),
            device.unique_id(),
            size
        );

        Ok(Self {
            device,
            map,
            _file: file,
        })
    }

    pub fn device(&self) -> &'d dyn Device {
        self.device
    }

    /// Size of the mapping in bytes.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Current contents of the mapping.
    pub fn as_bytes(&self) -> &[u8] {
        &self.map
    }

    /// A view evaluating samples against the live mapping.
    pub fn view(&self) -> SampleView<'_> {
        SampleView::new(self.device, &self.map)
    }

    /// Extracts the raw value of the sample behind `id`.
    ///
    /// See [`SampleView::read_sample`].
    pub fn read_sample(&self, id: CounterId) -> Result<u64> {
        self.view().read_sample(id)
    }

    /// Evaluates the counter behind `id` against the current mapping.
    pub fn read_counter(&self, id: CounterId) -> Result<f64> {
        self.view().read_counter(id)
    }

    /// Evaluates the counter behind `id` and attaches its unit.
    pub fn read(&self, id: CounterId) -> Result<Reading> {
        self.view().read(id)
    }

    /// Copies the mapping so that several counters can be evaluated against
    /// one consistent image.
    pub fn snapshot(&self) -> Snapshot<'d> {
        Snapshot {
            device: self.device,
            bytes: self.map.to_vec(),
        }
    }
}

impl Drop for DeviceInstance<'_> {
    fn drop(&mut self) {
        log::trace!(
            target: "device instance",
            "releasing telemetry region: path={}, size={}",
            self.device.path().display(),
            self.map.len()
        );
    }
}

/// Point-in-time copy of a telemetry region.
#[derive(Debug, Clone)]
pub struct Snapshot<'d> {
    device: &'d dyn Device,
    bytes: Vec<u8>,
}

impl Snapshot<'_> {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn view(&self) -> SampleView<'_> {
        SampleView::new(self.device, &self.bytes)
    }
}

/// Reads the byte count declared in `<device_path>/size`.
///
/// # Errors
///
/// - [`Error::FileOpen`] or [`Error::ReadSize`] if the file cannot be read.
/// - [`Error::InvalidSize`] or [`Error::ZeroSize`] unless it holds a positive
///   decimal integer.
pub fn region_size(device_path: &Path) -> Result<usize> {
    read_declared_size(&device_path.join(SIZE_FILE))
}

fn read_declared_size(path: &Path) -> Result<usize> {
    let value = fsutil::read_trimmed_line(path).map_err(|err| match err {
        ReadLineError::Open(err) => Error::FileOpen(err),
        ReadLineError::Read { path, source } => Error::ReadSize { path, source },
    })?;

    let size = value
        .parse::<usize>()
        .map_err(|source| Error::InvalidSize {
            path: path.to_path_buf(),
            value: value.clone(),
            source,
        })?;

    if size == 0 {
        return Err(Error::ZeroSize {
            path: path.to_path_buf(),
        });
    }

    Ok(size)
}

/// Rejects regular files shorter than the declared size, empty ones included;
/// mapping past their end would fault on access. The kernel sizes the `telem`
/// attribute to the region, so a real endpoint always passes.
fn check_region_len(file: &File, path: &Path, declared: usize) -> Result<()> {
    let metadata = file.metadata().map_err(|source| Error::Map {
        path: path.to_path_buf(),
        source,
    })?;

    let actual = metadata.len();
    if metadata.is_file() && actual < declared as u64 {
        return Err(Error::Truncated {
            path: path.to_path_buf(),
            declared,
            actual,
        });
    }

    Ok(())
}

//! Families that ship with the crate.

use crate::telemetry::{self, Catalog, Device, Sample, Unit};

use super::{DiscoveredDevice, Family};

/// Family exposing every 64-bit word of a region as a raw counter named
/// `RAW::word<N>`, where word `N` starts at byte `8 * N`. A trailing partial
/// word is exposed with its remaining width.
///
/// It needs no knowledge of the endpoint's layout, so [`super::FamilyRegistry::builtin`]
/// installs it as the fallback for guids without a dedicated catalog. Values
/// are converted to `f64` on evaluation and lose precision above 2^53; use
/// `read_sample` for exact words.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawWords;

impl RawWords {
    pub const NAME: &'static str = "raw words";
    pub const UNIT: &'static str = "raw";

    pub fn counter_name(index: usize) -> String {
        format!("RAW::word{index}")
    }

    /// Builds the word catalog of `device`, sized by its `size` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the declared region size cannot be read.
    pub fn catalog(device: &DiscoveredDevice) -> telemetry::Result<Catalog> {
        let size = telemetry::region_size(&device.path)?;

        let mut builder = Catalog::builder(device.guid, &device.path);
        for (index, start) in (0..size).step_by(8).enumerate() {
            let width = (size - start).min(8) as u64 * 8;
            builder.add_raw(
                Self::counter_name(index),
                Sample::new(start as u64 * 8, width),
                Unit::new(Self::UNIT),
            );
        }
        builder.build()
    }
}

impl Family for RawWords {
    /// Never matches a real guid; the family is meant to be installed with
    /// [`super::FamilyRegistry::set_fallback`].
    fn unique_id(&self) -> u64 {
        u64::MAX
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn describe(&self, device: &DiscoveredDevice) -> telemetry::Result<Box<dyn Device>> {
        Ok(Box::new(Self::catalog(device)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::FamilyRegistry;
    use crate::telemetry::{DeviceInstance, SIZE_FILE, TELEM_FILE};

    fn endpoint(telem: &[u8]) -> (tempfile::TempDir, DiscoveredDevice) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TELEM_FILE), telem).unwrap();
        std::fs::write(dir.path().join(SIZE_FILE), telem.len().to_string()).unwrap();
        let device = DiscoveredDevice {
            path: dir.path().to_path_buf(),
            guid: 0x1234_5678,
        };
        (dir, device)
    }

    #[test]
    fn test_catalog_covers_whole_region() {
        let mut telem = 0x0102_0304_0506_0708u64.to_le_bytes().to_vec();
        telem.extend_from_slice(&[0xAA, 0xBB, 0xCC]);
        let (_dir, device) = endpoint(&telem);

        let catalog = RawWords::catalog(&device).unwrap();
        assert_eq!(catalog.unique_id(), 0x1234_5678);
        assert_eq!(catalog.counter_names(), vec!["RAW::word0", "RAW::word1"]);

        let tail = catalog.counter_id_by_name("RAW::word1").unwrap();
        assert_eq!(*catalog.sample_by_id(tail).unwrap(), Sample::new(64, 24));

        let instance = DeviceInstance::open(&catalog).unwrap();
        let word = catalog.counter_id_by_name("RAW::word0").unwrap();
        assert_eq!(instance.read_sample(word).unwrap(), 0x0102_0304_0506_0708);
        assert_eq!(instance.read_sample(tail).unwrap(), 0xCC_BBAA);
        assert_eq!(instance.read(tail).unwrap().to_string(), "13417386 raw");
    }

    #[test]
    fn test_catalog_requires_size() {
        let (dir, device) = endpoint(&[0u8; 8]);
        std::fs::remove_file(dir.path().join(SIZE_FILE)).unwrap();
        assert!(RawWords::catalog(&device).unwrap_err().is_io());
    }

    #[test]
    fn test_builtin_registry_falls_back_to_raw_words() {
        let (_dir, device) = endpoint(&[0u8; 16]);
        let registry = FamilyRegistry::builtin();

        assert!(registry.is_empty());
        assert_eq!(registry.resolve(device.guid).unwrap().name(), RawWords::NAME);
        let described = registry.describe(&device).unwrap();
        assert_eq!(described.counter_names(), vec!["RAW::word0", "RAW::word1"]);
    }
}

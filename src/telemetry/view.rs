use super::{CounterId, Device, Error, Reading, Result};

/// A device catalog paired with the bytes its samples are read from.
///
/// Views borrow both halves, so they cannot outlive the mapping or snapshot
/// that produced them.
#[derive(Debug, Clone, Copy)]
pub struct SampleView<'a> {
    device: &'a dyn Device,
    bytes: &'a [u8],
}

impl<'a> SampleView<'a> {
    pub fn new(device: &'a dyn Device, bytes: &'a [u8]) -> Self {
        Self { device, bytes }
    }

    pub fn device(&self) -> &'a dyn Device {
        self.device
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Extracts the raw value of the sample behind `id`.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownId`] if `id` is not in the catalog.
    /// - [`Error::SampleOutOfBounds`] if the field lies beyond the buffer.
    pub fn read_sample(&self, id: CounterId) -> Result<u64> {
        let sample = self.device.sample_by_id(id)?;
        sample
            .extract(self.bytes)
            .ok_or_else(|| Error::SampleOutOfBounds {
                id,
                start: sample.byte_offset(),
                end: sample.end_byte(),
                len: self.bytes.len(),
            })
    }

    /// Evaluates the counter behind `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownId`] for unknown ids and any error raised while
    /// reading the counter's operands.
    pub fn read_counter(&self, id: CounterId) -> Result<f64> {
        let counter = self.device.counter_by_id(id)?;
        counter.evaluate(self)
    }

    /// Evaluates the counter behind `id` and attaches its unit.
    pub fn read(&self, id: CounterId) -> Result<Reading> {
        let value = self.read_counter(id)?;
        Ok(self.device.unit_by_id(id)?.reading(value))
    }
}

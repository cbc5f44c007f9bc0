//! Location of a single bit-packed field inside a telemetry region.
//!
//! PMT packs fields into 64-bit words at arbitrary bit positions, but a field
//! never crosses the word that starts at its own first byte. Extraction relies
//! on that: at most eight bytes are ever read for one field.
//!
//! # Example
//!
//! ```rust
//! use pmt_monitor::telemetry::Sample;
//!
//! let sample = Sample::new(4, 4);
//! assert_eq!(sample.extract(&[0xFF, 0x00]), Some(0xF));
//! ```

use serde::Serialize;

/// Bit offset and bit width of a field within the telemetry buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Sample {
    /// Offset of the least significant bit, in bits from the start of the buffer.
    pub offset: u64,
    /// Width of the field in bits.
    pub size: u64,
}

impl Sample {
    pub const fn new(offset: u64, size: u64) -> Self {
        Self { offset, size }
    }

    /// Returns `true` if the field is non-empty and fits the 64-bit word
    /// starting at its first byte, i.e. `offset % 8 + size <= 64`.
    pub const fn is_valid(&self) -> bool {
        self.size >= 1 && self.size <= 64 - self.bit_shift() as u64
    }

    /// Index of the first byte holding the field.
    pub const fn byte_offset(&self) -> u64 {
        self.offset / 8
    }

    /// Position of the field's least significant bit within its first byte.
    pub const fn bit_shift(&self) -> u32 {
        (self.offset % 8) as u32
    }

    /// Number of bytes that have to be read to cover the field.
    pub const fn byte_len(&self) -> u64 {
        (self.size.saturating_add(self.bit_shift() as u64)).div_ceil(8)
    }

    /// One past the last byte covered by the field.
    pub const fn end_byte(&self) -> u64 {
        self.byte_offset() + self.byte_len()
    }

    /// Mask keeping the lowest `size` bits.
    pub const fn mask(&self) -> u64 {
        if self.size >= 64 {
            u64::MAX
        } else {
            (1u64 << self.size) - 1
        }
    }

    /// Extracts the raw, zero-extended field value from `buf`.
    ///
    /// Returns `None` if the field lies outside `buf`.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the sample violates the word invariant
    /// (see [`Sample::is_valid`]). Catalogs reject such samples when they
    /// are built.
    #[inline]
    pub fn extract(&self, buf: &[u8]) -> Option<u64> {
        debug_assert!(
            self.is_valid(),
            "sample at bit {} with width {} spans a 64-bit word",
            self.offset,
            self.size
        );
        if !self.is_valid() {
            return None;
        }

        let start = usize::try_from(self.byte_offset()).ok()?;
        let len = self.byte_len() as usize;
        let bytes = buf.get(start..start.checked_add(len)?)?;

        let mut word = [0u8; 8];
        word[..len].copy_from_slice(bytes);
        let raw = u64::from_le_bytes(word) >> self.bit_shift();
        Some(raw & self.mask())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_upper_nibble() {
        let sample = Sample::new(4, 4);
        assert_eq!(sample.extract(&[0xFF, 0x00]), Some(0xF));
    }

    #[test]
    fn test_extract_masks_to_width() {
        let sample = Sample::new(0, 3);
        assert_eq!(sample.extract(&[0b1111_1111]), Some(0b111));
    }

    #[test]
    fn test_byte_len_rounding() {
        assert_eq!(Sample::new(0, 8).byte_len(), 1);
        assert_eq!(Sample::new(0, 9).byte_len(), 2);
        assert_eq!(Sample::new(64, 64).byte_len(), 8);
        // unaligned fields also cover the bits below the shift
        assert_eq!(Sample::new(4, 8).byte_len(), 2);
    }

    #[test]
    fn test_extract_size_nine_spans_two_bytes() {
        let sample = Sample::new(0, 9);
        assert_eq!(sample.extract(&[0xFF, 0x01, 0xFF]), Some(0x1FF));
        assert_eq!(sample.extract(&[0x00, 0xFE, 0xFF]), Some(0));
    }

    #[test]
    fn test_extract_little_endian_word() {
        let buf = 0x1122_3344_5566_7788u64.to_le_bytes();
        assert_eq!(Sample::new(0, 64).extract(&buf), Some(0x1122_3344_5566_7788));
        assert_eq!(Sample::new(8, 16).extract(&buf), Some(0x5566));
        assert_eq!(Sample::new(56, 8).extract(&buf), Some(0x11));
    }

    #[test]
    fn test_extract_out_of_bounds() {
        assert_eq!(Sample::new(8, 8).extract(&[0xAA]), None);
        assert_eq!(Sample::new(0, 16).extract(&[0xAA]), None);
        assert_eq!(Sample::new(u64::MAX - 7, 1).extract(&[0xAA]), None);
    }

    #[test]
    fn test_validity() {
        assert!(Sample::new(0, 64).is_valid());
        assert!(Sample::new(7, 57).is_valid());
        assert!(!Sample::new(7, 58).is_valid());
        assert!(!Sample::new(0, 0).is_valid());
    }

    #[test]
    fn test_extract_every_legal_field_without_leaking_neighbours() {
        for shift in 0..8u64 {
            for size in 1..=(64 - shift) {
                let sample = Sample::new(16 + shift, size);
                let value = 0xA5C3_96E1_5A3C_691Eu64 & sample.mask();

                // surround the field with set bits so any leak shows up
                let mut buf = [0xFFu8; 32];
                let field_bits = sample.mask() << shift;
                let mut word = u64::from_le_bytes(buf[2..10].try_into().unwrap());
                word = (word & !field_bits) | (value << shift);
                buf[2..10].copy_from_slice(&word.to_le_bytes());

                assert_eq!(
                    sample.extract(&buf),
                    Some(value),
                    "shift={shift} size={size}"
                );
            }
        }
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn test_extract_word_crossing_field_asserts() {
        Sample::new(7, 58).extract(&[0u8; 16]);
    }
}

//! ttyrec wire format
//!
//! A recording is a flat sequence of frames, each a fixed 12-byte header followed by
//! the terminal output captured at that instant:
//!
//! ```text
//! offset 0   u32 LE  seconds
//! offset 4   u32 LE  microseconds
//! offset 8   u32 LE  data length
//! offset 12  [u8; length] terminal output
//! ```
//!
//! There is no file header, magic number or trailer; the stream simply ends after the
//! last data block.

use crate::error::HeaderField;
use crate::{Result, TtyrecError};
use tracing::warn;

/// Size of a frame header in bytes.
pub const HEADER_SIZE: usize = 12;

const MICROS_PER_SECOND: f64 = 1_000_000.0;
const U32_RANGE: f64 = 4_294_967_296.0;

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub seconds: u32,
    pub microseconds: u32,
    pub length: u32,
}

impl FrameHeader {
    /// Parse a header from its 12 raw bytes.
    pub fn parse(bytes: &[u8; HEADER_SIZE]) -> Self {
        let header = Self {
            seconds: parse_u32_le(bytes, 0),
            microseconds: parse_u32_le(bytes, 4),
            length: parse_u32_le(bytes, 8),
        };

        if header.microseconds >= 1_000_000 {
            warn!(
                "Non-canonical header: microseconds field is {} (seconds={})",
                header.microseconds, header.seconds
            );
        }

        header
    }

    /// Build a header from a timestamp in seconds and a data length.
    ///
    /// Every field is range-checked before packing, so a header that is returned always
    /// decodes back to the requested values (to microsecond precision).
    pub fn from_timestamp(timestamp: f64, length: usize) -> Result<Self> {
        let seconds = timestamp.floor();
        let microseconds = ((timestamp - seconds) * MICROS_PER_SECOND).round();

        Ok(Self {
            seconds: checked_u32(HeaderField::Seconds, seconds)?,
            microseconds: checked_u32(HeaderField::Microseconds, microseconds)?,
            length: checked_u32(HeaderField::Length, length as f64)?,
        })
    }

    /// Timestamp in seconds.
    pub fn timestamp(&self) -> f64 {
        self.seconds as f64 + self.microseconds as f64 / MICROS_PER_SECOND
    }

    /// Length of the data block that follows this header.
    pub fn data_len(&self) -> usize {
        self.length as usize
    }

    /// Pack into wire bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.seconds.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.microseconds.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.length.to_le_bytes());
        bytes
    }
}

fn parse_u32_le(data: &[u8; HEADER_SIZE], offset: usize) -> u32 {
    u32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}

fn checked_u32(field: HeaderField, value: f64) -> Result<u32> {
    if value.is_finite() && (0.0..=u32::MAX as f64).contains(&value) {
        return Ok(value as u32);
    }

    Err(TtyrecError::HeaderReconstruction { field, intended: value, achievable: wrap_u32(value) })
}

/// What a 32-bit unsigned field ends up holding when `value` is forced into it.
fn wrap_u32(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    value.trunc().rem_euclid(U32_RANGE) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_little_endian_fields() {
        let bytes = [
            0x10, 0x00, 0x00, 0x00, // seconds = 16
            0x20, 0xA1, 0x07, 0x00, // microseconds = 500_000
            0x05, 0x00, 0x00, 0x00, // length = 5
        ];
        let header = FrameHeader::parse(&bytes);
        assert_eq!(header, FrameHeader { seconds: 16, microseconds: 500_000, length: 5 });
        assert!((header.timestamp() - 16.5).abs() < 1e-12);
        assert_eq!(header.data_len(), 5);
        assert_eq!(header.to_bytes(), bytes);
    }

    #[test]
    fn encodes_fractional_timestamp() -> Result<()> {
        let header = FrameHeader::from_timestamp(1_234.25, 42)?;
        assert_eq!(header, FrameHeader { seconds: 1_234, microseconds: 250_000, length: 42 });
        Ok(())
    }

    #[test]
    fn rejects_negative_timestamp() {
        let err = FrameHeader::from_timestamp(-0.5, 0).unwrap_err();
        match err {
            TtyrecError::HeaderReconstruction { field, intended, achievable } => {
                assert_eq!(field, HeaderField::Seconds);
                assert_eq!(intended, -1.0);
                assert_eq!(achievable, u32::MAX);
            }
            other => panic!("Expected HeaderReconstruction, got {:?}", other),
        }
    }

    #[test]
    fn rejects_timestamp_past_u32_seconds() {
        let err = FrameHeader::from_timestamp(4_294_967_296.5, 0).unwrap_err();
        match err {
            TtyrecError::HeaderReconstruction { field, achievable, .. } => {
                assert_eq!(field, HeaderField::Seconds);
                assert_eq!(achievable, 0);
            }
            other => panic!("Expected HeaderReconstruction, got {:?}", other),
        }
    }

    #[test]
    fn rejects_nan_timestamp() {
        assert!(matches!(
            FrameHeader::from_timestamp(f64::NAN, 0),
            Err(TtyrecError::HeaderReconstruction { field: HeaderField::Seconds, .. })
        ));
    }

    #[test]
    fn largest_representable_values_encode() -> Result<()> {
        let header = FrameHeader::from_timestamp(u32::MAX as f64, u32::MAX as usize)?;
        assert_eq!(header.seconds, u32::MAX);
        assert_eq!(header.microseconds, 0);
        assert_eq!(header.length, u32::MAX);
        Ok(())
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn rejects_oversized_length() {
        let err = FrameHeader::from_timestamp(1.0, u32::MAX as usize + 1).unwrap_err();
        assert!(matches!(
            err,
            TtyrecError::HeaderReconstruction { field: HeaderField::Length, achievable: 0, .. }
        ));
    }

    proptest! {
        #[test]
        fn timestamp_survives_encode_and_parse(
            seconds in 0u32..u32::MAX,
            microseconds in 0u32..1_000_000u32,
            length in 0u32..u32::MAX,
        ) {
            let timestamp = seconds as f64 + microseconds as f64 / 1e6;
            let header = FrameHeader::from_timestamp(timestamp, length as usize).unwrap();
            let parsed = FrameHeader::parse(&header.to_bytes());

            prop_assert_eq!(parsed.length, length);
            prop_assert!((parsed.timestamp() - timestamp).abs() <= 2e-6,
                "{} decoded as {}", timestamp, parsed.timestamp());
        }
    }
}

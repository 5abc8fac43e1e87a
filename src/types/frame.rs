//! Decoded frame records

use std::time::Duration;

use serde::Serialize;

use crate::decoder::format::HEADER_SIZE;

/// One fully-resolved ttyrec frame.
///
/// Produced by [`FrameDecoder::next_frame`](crate::FrameDecoder::next_frame). Every
/// timestamp is in seconds; `header` is the 12-byte header re-encoded from `timestamp`
/// and the length of `data` after filtering, ready to be written back out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameRecord {
    /// Terminal output after the frame filter ran
    pub data: Vec<u8>,

    /// Timestamp exactly as stored in the input header
    pub orig_timestamp: f64,

    /// `orig_timestamp` shifted by the drift accumulated before this frame
    pub diffed_timestamp: f64,

    /// Final timestamp after threshold clamping and filtering
    pub timestamp: f64,

    /// Final timestamp of the previous frame (`None` for the first frame)
    pub prev_timestamp: Option<f64>,

    /// `timestamp - prev_timestamp`, or 0 when there is no previous frame
    pub diff: f64,

    /// Header bytes as read from the input
    pub orig_header: [u8; HEADER_SIZE],

    /// Header bytes re-encoded from the final timestamp and data length
    pub header: [u8; HEADER_SIZE],

    /// 1-based frame index
    pub frame: u64,

    /// Sum of `diff` over every frame after the first
    pub relative_time: f64,
}

impl FrameRecord {
    /// Delay to wait before showing this frame during playback.
    ///
    /// Negative or NaN gaps collapse to zero; gaps too large for a `Duration`
    /// saturate at [`Duration::MAX`].
    pub fn delay(&self) -> Duration {
        if self.diff > 0.0 {
            Duration::try_from_secs_f64(self.diff).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        }
    }

    /// Whether the frame filter or threshold changed this frame's header.
    pub fn is_modified(&self) -> bool {
        self.header != self.orig_header
    }

    /// Header followed by data, as the frame would appear in a ttyrec file.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE + self.data.len());
        bytes.extend_from_slice(&self.header);
        bytes.extend_from_slice(&self.data);
        bytes
    }
}

//! Decoder bookkeeping state

use serde::{Deserialize, Serialize};

/// Running state of a [`FrameDecoder`](crate::FrameDecoder).
///
/// Passed in through [`DecoderOptions`](crate::DecoderOptions) to resume decoding, and
/// read back with [`FrameDecoder::state`](crate::FrameDecoder::state) so a later
/// stream can continue where this one stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderState {
    /// Number of frames returned so far
    pub frame: u64,

    /// Final timestamp of the last returned frame
    pub prev_timestamp: Option<f64>,

    /// Drift added to every subsequent header timestamp
    pub accum_diff: f64,

    /// Cumulative inter-frame time, excluding the first frame
    pub relative_time: f64,
}

//! Decoder configuration

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::format::FrameHeader;
use crate::{DecoderState, Result, TtyrecError};

/// Options accepted by [`FrameDecoder::with_options`](crate::FrameDecoder::with_options).
///
/// Can be built in code or loaded from YAML:
///
/// ```rust
/// use ttyrec_frames::DecoderOptions;
///
/// let options = DecoderOptions::from_yaml(
///     "time_threshold: 2.5\ninitial_state:\n  frame: 10\n  prev_timestamp: 41.0\n",
/// )?;
/// assert_eq!(options.time_threshold, Some(2.5));
/// assert_eq!(options.initial_state.frame, 10);
/// # Ok::<(), ttyrec_frames::TtyrecError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecoderOptions {
    /// Largest gap allowed between consecutive frame timestamps, in seconds
    pub time_threshold: Option<f64>,

    /// State to start from, for resuming or chaining streams
    pub initial_state: DecoderState,
}

impl DecoderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap inter-frame gaps at `seconds`.
    pub fn with_time_threshold(mut self, seconds: f64) -> Self {
        self.time_threshold = Some(seconds);
        self
    }

    /// Start decoding from `state` instead of a fresh state.
    pub fn with_initial_state(mut self, state: DecoderState) -> Self {
        self.initial_state = state;
        self
    }

    /// Parse options from a YAML document and validate them.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let options: Self = serde_yaml_ng::from_str(yaml).map_err(|e| {
            TtyrecError::invalid_config(format!("Failed to parse decoder options: {}", e))
        })?;
        options.validate()?;
        debug!("Loaded decoder options: {:?}", options);
        Ok(options)
    }

    /// Check the options describe a usable decoder.
    ///
    /// The initial state must be one a decoder could have reached: a frame counter
    /// with room to advance, finite drift and relative time, and a previous timestamp
    /// that fits in a ttyrec header.
    pub fn validate(&self) -> Result<()> {
        if let Some(threshold) = self.time_threshold {
            if !threshold.is_finite() {
                return Err(TtyrecError::invalid_config(format!(
                    "time threshold must be finite, got {}",
                    threshold
                )));
            }
            if threshold < 0.0 {
                return Err(TtyrecError::invalid_config(format!(
                    "time threshold must be non-negative, got {}",
                    threshold
                )));
            }
        }

        let state = &self.initial_state;
        if state.frame == u64::MAX {
            return Err(TtyrecError::invalid_config(
                "initial frame counter has no room for another frame",
            ));
        }
        if !state.accum_diff.is_finite() {
            return Err(TtyrecError::invalid_config(format!(
                "initial accum_diff must be finite, got {}",
                state.accum_diff
            )));
        }
        if !state.relative_time.is_finite() {
            return Err(TtyrecError::invalid_config(format!(
                "initial relative_time must be finite, got {}",
                state.relative_time
            )));
        }
        if let Some(prev) = state.prev_timestamp {
            FrameHeader::from_timestamp(prev, 0).map_err(|e| {
                TtyrecError::invalid_config(format!("initial prev_timestamp is unusable: {}", e))
            })?;
        }

        Ok(())
    }
}

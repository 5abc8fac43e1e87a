//! Provider trait for frame sources

use crate::{FrameRecord, Result};

/// Trait for asynchronous ttyrec frame sources
///
/// Providers wrap a decoder and decide *when* a frame is handed out, e.g. pacing a
/// replay to the recording's own timing.
#[async_trait::async_trait]
pub trait Provider: Send + 'static {
    /// Get the next frame
    ///
    /// Returns:
    /// - `Ok(Some(frame))` - New frame available
    /// - `Ok(None)` - Stream ended (normal termination)
    /// - `Err(e)` - Error occurred
    async fn next_frame(&mut self) -> Result<Option<FrameRecord>>;

    /// Number of frames handed out so far
    fn frames_read(&self) -> u64;
}

//! Replay provider for ttyrec recordings

use std::io::{Read, Write};
use std::time::Duration;

use futures::Stream;
use tracing::{debug, info, trace};

use crate::provider::Provider;
use crate::{FrameDecoder, FrameRecord, Result};

const MIN_SPEED: f64 = 0.1;
const MAX_SPEED: f64 = 10.0;

/// Replay provider that hands out frames at the pace they were recorded
pub struct ReplayProvider<R> {
    /// Frame decoder
    decoder: FrameDecoder<R>,

    /// Playback speed multiplier (1.0 = normal, 2.0 = double speed)
    speed: f64,

    /// Frames handed out so far
    delivered: u64,
}

impl<R: Read + Send + 'static> ReplayProvider<R> {
    /// Create a replay provider over a configured decoder
    pub fn new(decoder: FrameDecoder<R>) -> Self {
        info!("Starting ttyrec replay after frame {}", decoder.frame());
        Self { decoder, speed: 1.0, delivered: 0 }
    }

    /// Set playback speed
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = if speed.is_nan() { 1.0 } else { speed.clamp(MIN_SPEED, MAX_SPEED) };
        debug!("Playback speed set to {}x", self.speed);
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// The underlying decoder, for inspecting drift and relative time
    pub fn decoder(&self) -> &FrameDecoder<R> {
        &self.decoder
    }

    /// Time to wait before handing out `frame`
    fn pacing_delay(&self, frame: &FrameRecord) -> Duration {
        Duration::try_from_secs_f64(frame.delay().as_secs_f64() / self.speed)
            .unwrap_or(Duration::MAX)
    }

    /// Turn the provider into a stream of frames.
    ///
    /// The stream ends after the last frame, or right after yielding an error.
    pub fn into_stream(self) -> impl Stream<Item = Result<FrameRecord>> + Send + 'static {
        futures::stream::unfold(Some(self), |state| async move {
            let mut provider = state?;
            match provider.next_frame().await {
                Ok(Some(frame)) => Some((Ok(frame), Some(provider))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }

    /// Play the recording into `out`, writing each frame's data as it comes due.
    ///
    /// Returns the number of frames written.
    pub async fn play_into<W: Write>(&mut self, out: &mut W) -> Result<u64> {
        let mut written = 0;
        while let Some(frame) = self.next_frame().await? {
            out.write_all(&frame.data)?;
            out.flush()?;
            written += 1;
        }
        debug!("Replay finished after {} frames", written);
        Ok(written)
    }
}

#[async_trait::async_trait]
impl<R: Read + Send + 'static> Provider for ReplayProvider<R> {
    async fn next_frame(&mut self) -> Result<Option<FrameRecord>> {
        let frame = match self.decoder.next_frame()? {
            Some(frame) => frame,
            None => {
                debug!("Reached end of replay");
                return Ok(None);
            }
        };

        // Wait for next frame timing (pacing)
        let delay = self.pacing_delay(&frame);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.delivered += 1;
        trace!("Frame {}: waited {:?}, {} bytes", frame.frame, delay, frame.data.len());

        Ok(Some(frame))
    }

    fn frames_read(&self) -> u64 {
        self.delivered
    }
}

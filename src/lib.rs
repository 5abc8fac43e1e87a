//! Frame-by-frame decoder for ttyrec terminal-session recordings.
//!
//! A ttyrec file is a sequence of 12-byte headers (seconds, microseconds, length),
//! each followed by the terminal output captured at that moment. This crate reads
//! those frames one at a time and resolves each into a [`FrameRecord`] carrying the
//! original and adjusted timestamps, the gap to the previous frame, and a re-encoded
//! header.
//!
//! # Features
//!
//! - **Threshold clamping**: cap idle gaps while keeping later frames consistent
//! - **Frame filters**: rewrite data or timestamps per frame
//! - **Resumable state**: continue decoding across chained recordings
//! - **Compressed input**: gzip and zstd recordings are detected automatically
//! - **Paced replay**: async playback at the recording's own speed
//!
//! ## Example
//!
//! ```rust,no_run
//! use ttyrec_frames::{DecoderOptions, Ttyrec};
//!
//! fn main() -> ttyrec_frames::Result<()> {
//!     let options = DecoderOptions::new().with_time_threshold(2.0);
//!     let mut decoder = Ttyrec::open_with("session.ttyrec.gz", options)?;
//!
//!     while let Some(frame) = decoder.next_frame()? {
//!         println!("#{} +{:.3}s {} bytes", frame.frame, frame.diff, frame.data.len());
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod error;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Decoding
pub mod decoder;
pub mod source;

// Replay
pub mod provider;
pub mod providers;

// Core exports
pub use error::*;
pub use types::*;

pub use decoder::{DecoderOptions, FrameDecoder, FrameFilter, FrameHeader, IdentityFilter};
pub use provider::Provider;
pub use providers::ReplayProvider;
pub use source::{Compression, Source};

use std::path::Path;

/// Unified entry point for opening ttyrec recordings.
///
/// Paths are opened with compression detection; `-` reads standard input.
pub struct Ttyrec;

impl Ttyrec {
    /// Open a recording with default decoder options.
    ///
    /// The returned decoder reads through a [`Source`], which is not seekable, so
    /// [`FrameDecoder::rewind`] is unavailable. Build the decoder from a
    /// [`File`](std::fs::File) directly to rewind an uncompressed recording.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file does not exist or is not readable
    /// - The file uses an unsupported compression format
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use ttyrec_frames::Ttyrec;
    ///
    /// # fn main() -> ttyrec_frames::Result<()> {
    /// let frames = Ttyrec::open("session.ttyrec")?.count();
    /// println!("{} frames", frames);
    /// # Ok(())
    /// # }
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<FrameDecoder<Source>> {
        Ok(FrameDecoder::new(source::open_source(path)?))
    }

    /// Open a recording with explicit decoder options.
    ///
    /// Invalid options are reported as [`TtyrecError::InvalidConfig`] once the source
    /// has been opened.
    pub fn open_with<P: AsRef<Path>>(
        path: P,
        options: DecoderOptions,
    ) -> Result<FrameDecoder<Source>> {
        FrameDecoder::with_options(source::open_source(path)?, options)
    }

    /// Open a recording for paced replay.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use ttyrec_frames::Ttyrec;
    ///
    /// #[tokio::main(flavor = "current_thread")]
    /// async fn main() -> ttyrec_frames::Result<()> {
    ///     let mut replay = Ttyrec::replay("session.ttyrec")?;
    ///     replay.set_speed(2.0);
    ///     replay.play_into(&mut std::io::stdout()).await?;
    ///     Ok(())
    /// }
    /// ```
    pub fn replay<P: AsRef<Path>>(path: P) -> Result<ReplayProvider<Source>> {
        Ok(ReplayProvider::new(Self::open(path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{RecordingBuilder, write_temp_recording};

    #[test]
    fn open_with_rejects_invalid_options() {
        let bytes = RecordingBuilder::new().frame_at(1.0, b"a").build();
        let path = write_temp_recording("invalid-options.ttyrec", &bytes);
        let result = Ttyrec::open_with(&path, DecoderOptions::new().with_time_threshold(-1.0));
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(TtyrecError::InvalidConfig { .. })));
    }

    #[test]
    fn open_with_applies_options() -> anyhow::Result<()> {
        let bytes = RecordingBuilder::new().frame_at(1.0, b"a").frame_at(60.0, b"b").build();
        let path = write_temp_recording("threshold.ttyrec", &bytes);
        let frames = Ttyrec::open_with(&path, DecoderOptions::new().with_time_threshold(2.0))?
            .collect::<Result<Vec<_>>>();
        std::fs::remove_file(&path).ok();

        let frames = frames?;
        assert_eq!(frames.len(), 2);
        assert!((frames[1].diff - 2.0).abs() < 1e-9);
        Ok(())
    }
}

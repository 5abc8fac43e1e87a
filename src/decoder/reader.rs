//! Frame-by-frame ttyrec decoder
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use ttyrec_frames::{DecoderOptions, FrameDecoder};
//! use std::fs::File;
//!
//! fn dump() -> ttyrec_frames::Result<()> {
//!     let file = File::open("session.ttyrec")?;
//!     let options = DecoderOptions::new().with_time_threshold(5.0);
//!     let mut decoder = FrameDecoder::with_options(file, options)?;
//!
//!     while let Some(frame) = decoder.next_frame()? {
//!         println!("frame {} at {:.6}s (+{:.3}s), {} bytes",
//!             frame.frame,
//!             frame.timestamp,
//!             frame.diff,
//!             frame.data.len());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Timestamp bookkeeping
//!
//! Each frame's header timestamp is shifted by the drift accumulated so far, clamped so
//! it is never more than the time threshold past the previous frame, then handed to the
//! frame filter. Whatever clamping and filtering moved is added to the drift, so later
//! frames keep the same spacing relative to each other as in the input.
//!
//! State is committed only once a frame has been read and its header re-encoded, so a
//! failed call leaves the decoder exactly as it was.

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};

use tracing::{debug, trace};

use super::filter::{FrameFilter, IdentityFilter};
use super::format::{FrameHeader, HEADER_SIZE};
use super::options::DecoderOptions;
use crate::{DecoderState, FrameRecord, FrameSection, Result, TtyrecError};

/// Upper bound on the buffer reserved up front for a data block; larger blocks grow
/// as they are read so a corrupt length field can't force a huge allocation.
const MAX_PREALLOC: usize = 64 * 1024;

/// Decodes ttyrec frames from a byte stream.
pub struct FrameDecoder<R> {
    reader: R,
    filter: Box<dyn FrameFilter>,
    time_threshold: Option<f64>,
    state: DecoderState,
    initial_state: DecoderState,
    exhausted: bool,
}

impl<R: Read> FrameDecoder<R> {
    /// Create a decoder with no time threshold and a fresh state.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            filter: Box::new(IdentityFilter),
            time_threshold: None,
            state: DecoderState::default(),
            initial_state: DecoderState::default(),
            exhausted: false,
        }
    }

    /// Create a decoder from validated options.
    ///
    /// Fails with [`TtyrecError::InvalidConfig`] before touching the stream if the time
    /// threshold is negative or not finite, or the initial state could not have come
    /// from a decoder (see [`DecoderOptions::validate`]).
    pub fn with_options(reader: R, options: DecoderOptions) -> Result<Self> {
        options.validate()?;

        debug!(
            "Creating frame decoder: threshold={:?}, initial_state={:?}",
            options.time_threshold, options.initial_state
        );

        Ok(Self {
            reader,
            filter: Box::new(IdentityFilter),
            time_threshold: options.time_threshold,
            state: options.initial_state,
            initial_state: options.initial_state,
            exhausted: false,
        })
    }

    /// Replace the frame filter.
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: FrameFilter + 'static,
    {
        self.filter = Box::new(filter);
        self
    }

    /// Read and resolve the next frame.
    ///
    /// Returns:
    /// - `Ok(Some(frame))` - a frame was decoded
    /// - `Ok(None)` - the stream ended cleanly on a frame boundary
    /// - `Err(e)` - the input is truncated or the frame's header can't be re-encoded
    pub fn next_frame(&mut self) -> Result<Option<FrameRecord>> {
        let frame = self.state.frame.checked_add(1).ok_or_else(|| {
            TtyrecError::invalid_config(format!("frame counter exhausted at {}", self.state.frame))
        })?;

        let mut orig_header = [0u8; HEADER_SIZE];
        let read = read_fully(&mut self.reader, &mut orig_header)?;
        if read == 0 {
            debug!("End of ttyrec stream after {} frames", self.state.frame);
            return Ok(None);
        }
        if read < HEADER_SIZE {
            return Err(TtyrecError::malformed(frame, FrameSection::Header, HEADER_SIZE, read));
        }

        let header = FrameHeader::parse(&orig_header);
        let prev_timestamp = self.state.prev_timestamp;
        let mut accum_diff = self.state.accum_diff;

        let orig_timestamp = header.timestamp();
        let diffed_timestamp = orig_timestamp + accum_diff;
        let mut timestamp = diffed_timestamp;

        if let (Some(threshold), Some(prev)) = (self.time_threshold, prev_timestamp) {
            if timestamp - prev > threshold {
                let clamped = prev + threshold;
                debug!(
                    "Frame {}: clamping {:.6}s gap to {:.6}s",
                    frame,
                    timestamp - prev,
                    threshold
                );
                accum_diff += clamped - timestamp;
                timestamp = clamped;
            }
        }

        let expected = header.data_len();
        let mut data = Vec::with_capacity(expected.min(MAX_PREALLOC));
        let read = self.reader.by_ref().take(expected as u64).read_to_end(&mut data)?;
        if read < expected {
            return Err(TtyrecError::malformed(frame, FrameSection::Data, expected, read));
        }

        let pre_filter = timestamp;
        let (data, timestamp) = self.filter.filter(data, pre_filter, prev_timestamp);
        if timestamp != pre_filter {
            debug!("Frame {}: filter moved timestamp {:.6} -> {:.6}", frame, pre_filter, timestamp);
        }

        let diff = match prev_timestamp {
            Some(prev) => timestamp - prev,
            None => 0.0,
        };

        let mut relative_time = self.state.relative_time;
        if frame != 1 {
            relative_time += diff;
        }

        accum_diff += timestamp - pre_filter;

        let header = FrameHeader::from_timestamp(timestamp, data.len())?.to_bytes();

        self.state =
            DecoderState { frame, prev_timestamp: Some(timestamp), accum_diff, relative_time };

        trace!(
            "Frame {}: orig={:.6} ts={:.6} diff={:.6} len={}",
            frame,
            orig_timestamp,
            timestamp,
            diff,
            data.len()
        );

        Ok(Some(FrameRecord {
            data,
            orig_timestamp,
            diffed_timestamp,
            timestamp,
            prev_timestamp,
            diff,
            orig_header,
            header,
            frame,
            relative_time,
        }))
    }

    /// Skip ahead to the next frame accepted by `predicate`.
    ///
    /// Skipped frames go through the same bookkeeping as frames returned by
    /// [`next_frame`](Self::next_frame). Returns `Ok(None)` if the stream ends first.
    pub fn grep<P>(&mut self, mut predicate: P) -> Result<Option<FrameRecord>>
    where
        P: FnMut(&FrameRecord) -> bool,
    {
        while let Some(frame) = self.next_frame()? {
            if predicate(&frame) {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }

    /// Skip ahead to the next frame whose (filtered) data contains `needle`.
    pub fn grep_bytes(&mut self, needle: &[u8]) -> Result<Option<FrameRecord>> {
        self.grep(|frame| contains(&frame.data, needle))
    }
}

impl<R: Read + Seek> FrameDecoder<R> {
    /// Seek back to the start of the stream and restore the state the decoder was
    /// created with.
    ///
    /// Only available for seekable readers such as a [`File`](std::fs::File) or a
    /// [`Cursor`](std::io::Cursor). Decoders opened through [`Ttyrec`](crate::Ttyrec)
    /// read a [`Source`](crate::Source) and cannot rewind.
    pub fn rewind(&mut self) -> Result<()> {
        self.reader.seek(SeekFrom::Start(0))?;
        self.state = self.initial_state;
        self.exhausted = false;
        debug!("Rewound ttyrec stream to frame {}", self.state.frame);
        Ok(())
    }
}

impl<R> FrameDecoder<R> {
    /// Number of frames returned so far, including any initial offset.
    pub fn frame(&self) -> u64 {
        self.state.frame
    }

    /// Final timestamp of the last returned frame.
    pub fn prev_timestamp(&self) -> Option<f64> {
        self.state.prev_timestamp
    }

    /// Drift that will be added to the next header timestamp.
    pub fn accum_diff(&self) -> f64 {
        self.state.accum_diff
    }

    /// Cumulative inter-frame time so far.
    pub fn relative_time(&self) -> f64 {
        self.state.relative_time
    }

    pub fn time_threshold(&self) -> Option<f64> {
        self.time_threshold
    }

    /// Snapshot of the current state, suitable as the initial state of a decoder for
    /// the stream that continues this one.
    pub fn state(&self) -> DecoderState {
        self.state
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Iterator for FrameDecoder<R> {
    type Item = Result<FrameRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        match self.next_frame() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.exhausted = true;
                None
            }
            Err(e) => {
                self.exhausted = true;
                Some(Err(e))
            }
        }
    }
}

impl<R> fmt::Debug for FrameDecoder<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameDecoder")
            .field("time_threshold", &self.time_threshold)
            .field("state", &self.state)
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}

/// Fill `buf` from `reader`, stopping early only at end of stream.
pub(crate) fn read_fully<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}

//! Frame filters
//!
//! A filter sees every frame after its data has been read and before the decoder does
//! its final bookkeeping. It may replace the data and move the timestamp; any timestamp
//! change is carried forward as drift so later frames stay consistent.

/// Per-frame transformation applied by [`FrameDecoder`](crate::FrameDecoder).
///
/// Implemented for every `FnMut(Vec<u8>, f64, Option<f64>) -> (Vec<u8>, f64)` closure,
/// so most callers never name this trait:
///
/// ```rust
/// use std::io::Cursor;
/// use ttyrec_frames::FrameDecoder;
///
/// let decoder = FrameDecoder::new(Cursor::new(Vec::new()))
///     .with_filter(|data: Vec<u8>, timestamp: f64, _prev: Option<f64>| {
///         (data.to_ascii_uppercase(), timestamp)
///     });
/// # drop(decoder);
/// ```
pub trait FrameFilter: Send {
    /// Returns the (possibly replaced) data and timestamp for this frame.
    ///
    /// `prev_timestamp` is the previous frame's final timestamp, `None` on the first frame.
    fn filter(&mut self, data: Vec<u8>, timestamp: f64, prev_timestamp: Option<f64>)
    -> (Vec<u8>, f64);
}

impl<F> FrameFilter for F
where
    F: FnMut(Vec<u8>, f64, Option<f64>) -> (Vec<u8>, f64) + Send,
{
    fn filter(
        &mut self,
        data: Vec<u8>,
        timestamp: f64,
        prev_timestamp: Option<f64>,
    ) -> (Vec<u8>, f64) {
        self(data, timestamp, prev_timestamp)
    }
}

/// Filter that returns every frame unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityFilter;

impl FrameFilter for IdentityFilter {
    fn filter(
        &mut self,
        data: Vec<u8>,
        timestamp: f64,
        _prev_timestamp: Option<f64>,
    ) -> (Vec<u8>, f64) {
        (data, timestamp)
    }
}

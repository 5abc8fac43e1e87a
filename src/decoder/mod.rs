//! ttyrec frame decoding
//!
//! This module turns a byte stream in the ttyrec format into [`FrameRecord`]s,
//! one frame per call, applying threshold clamping and an optional frame filter.
//!
//! [`FrameRecord`]: crate::FrameRecord

pub mod filter;
pub mod format;
pub mod options;
pub mod reader;

pub use filter::{FrameFilter, IdentityFilter};
pub use format::{FrameHeader, HEADER_SIZE};
pub use options::DecoderOptions;
pub use reader::FrameDecoder;

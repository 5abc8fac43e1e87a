//! Core types produced and consumed by the decoder.
//!
//! - [`FrameRecord`] is one decoded frame with every derived timestamp
//! - [`DecoderState`] is the decoder's running bookkeeping, also used to resume

mod frame;
mod state;

pub use frame::FrameRecord;
pub use state::DecoderState;

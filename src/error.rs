//! Error types for ttyrec decoding.
//!
//! All errors implement `std::error::Error` and carry enough structured context to
//! tell a misconfigured decoder apart from a damaged recording.
//!
//! ## Error Categories
//!
//! - **Configuration Errors**: invalid decoder options (e.g. a negative time threshold)
//! - **Malformed Input**: a header or data block shorter than its declared length
//! - **Header Reconstruction**: a re-encoded header field that does not fit in 32 bits
//! - **File / I/O Errors**: problems opening or reading the underlying stream
//!
//! None of these are retryable. Clean end-of-stream is never an error; the decoder
//! reports it as `Ok(None)`.
//!
//! ```rust
//! use ttyrec_frames::{FrameSection, TtyrecError};
//!
//! let error = TtyrecError::malformed(1, FrameSection::Header, 12, 11);
//! assert!(error.to_string().contains("expected 12-byte header, got 11"));
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ttyrec operations.
pub type Result<T, E = TtyrecError> = std::result::Result<T, E>;

/// Which part of a frame a short read happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSection {
    Header,
    Data,
}

impl fmt::Display for FrameSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameSection::Header => f.write_str("header"),
            FrameSection::Data => f.write_str("frame"),
        }
    }
}

/// Header field that failed to re-encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    Seconds,
    Microseconds,
    Length,
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderField::Seconds => f.write_str("seconds"),
            HeaderField::Microseconds => f.write_str("microseconds"),
            HeaderField::Length => f.write_str("length"),
        }
    }
}

/// Main error type for ttyrec operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TtyrecError {
    #[error("Invalid decoder configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Malformed ttyrec input in frame {frame}: expected {expected}-byte {section}, got {actual}")]
    MalformedInput { frame: u64, section: FrameSection, expected: usize, actual: usize },

    #[error(
        "Unable to reconstruct header: {field} should be {intended} but a 32-bit field would hold {achievable}"
    )]
    HeaderReconstruction { field: HeaderField, intended: f64, achievable: u32 },

    #[error("ttyrec file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while reading ttyrec stream")]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("{format} compressed recordings are not supported")]
    UnsupportedCompression { format: String },
}

impl TtyrecError {
    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            TtyrecError::InvalidConfig { .. } => vec![
                "Use a non-negative, finite time threshold",
                "Check the options document for typos in field names",
            ],
            TtyrecError::MalformedInput { .. } => vec![
                "Check the recording was not truncated while being written",
                "Verify the input is a ttyrec stream and not another format",
                "Decompress the file first if it uses an unsupported compressor",
            ],
            TtyrecError::HeaderReconstruction { .. } => vec![
                "Make sure the frame filter never produces negative timestamps",
                "Keep timestamps below 2^32 seconds",
                "Keep frame data below 4 GiB",
            ],
            TtyrecError::File { .. } => vec![
                "Check the file exists and is readable",
                "Check file permissions",
            ],
            TtyrecError::Io { .. } => vec![
                "Check the input stream is still open",
                "Verify the compressed data is not corrupted",
            ],
            TtyrecError::UnsupportedCompression { .. } => vec![
                "Decompress the recording externally and pipe it in",
                "Recompress it with gzip or zstd",
            ],
        }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        TtyrecError::File { path, source }
    }

    /// Helper constructor for configuration errors.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        TtyrecError::InvalidConfig { reason: reason.into() }
    }

    /// Helper constructor for short reads.
    pub fn malformed(frame: u64, section: FrameSection, expected: usize, actual: usize) -> Self {
        TtyrecError::MalformedInput { frame, section, expected, actual }
    }
}

impl From<std::io::Error> for TtyrecError {
    fn from(err: std::io::Error) -> Self {
        TtyrecError::Io { source: err }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn malformed_messages_name_expected_and_actual(
            frame in 1u64..1_000_000u64,
            expected in 1usize..100_000usize,
            actual in 0usize..100_000usize,
        ) {
            let header = TtyrecError::malformed(frame, FrameSection::Header, 12, actual % 12);
            let expected_header = format!("expected 12-byte header, got {}", actual % 12);
            prop_assert!(header.to_string().contains(&expected_header));

            let data = TtyrecError::malformed(frame, FrameSection::Data, expected, actual);
            let msg = data.to_string();
            let expected_data = format!("expected {}-byte frame, got {}", expected, actual);
            prop_assert!(msg.contains(&expected_data));
            prop_assert!(msg.contains(&frame.to_string()));
        }

        #[test]
        fn invalid_config_keeps_reason(reason in ".*") {
            let err = TtyrecError::invalid_config(reason.clone());
            prop_assert!(err.to_string().contains(&reason));
        }
    }

    #[test]
    fn header_reconstruction_names_field() {
        let err = TtyrecError::HeaderReconstruction {
            field: HeaderField::Seconds,
            intended: -1.0,
            achievable: u32::MAX,
        };
        let msg = err.to_string();
        assert!(msg.contains("seconds"));
        assert!(msg.contains("-1"));
        assert!(msg.contains("4294967295"));
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<TtyrecError>();

        let error = TtyrecError::invalid_config("test");
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn recovery_suggestions_are_descriptive() {
        let errors = [
            TtyrecError::invalid_config("negative"),
            TtyrecError::malformed(3, FrameSection::Data, 10, 4),
            TtyrecError::UnsupportedCompression { format: "bzip2".to_string() },
        ];

        for error in &errors {
            let suggestions = error.recovery_suggestions();
            assert!(!suggestions.is_empty());
            for suggestion in suggestions {
                assert!(suggestion.len() > 5);
            }
        }
    }

    #[test]
    fn io_errors_convert_and_chain() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: TtyrecError = io_err.into();
        match &err {
            TtyrecError::Io { source } => assert_eq!(source.to_string(), "pipe closed"),
            other => panic!("Expected Io error, got {:?}", other),
        }
        let source = std::error::Error::source(&err).expect("Io error should expose its source");
        assert_eq!(source.to_string(), "pipe closed");

        let file_err =
            TtyrecError::file_error(PathBuf::from("/tmp/session.ttyrec"), std::io::Error::other("x"));
        assert!(file_err.to_string().contains("session.ttyrec"));
    }
}

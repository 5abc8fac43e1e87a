//! Test utilities for building synthetic ttyrec recordings
//!
//! Shared by the unit tests and the benches, so both work from recordings generated
//! in code rather than fixture files.

#![cfg(any(test, feature = "benchmark"))]

use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::decoder::format::FrameHeader;

/// Builds a ttyrec byte stream frame by frame.
#[derive(Debug, Clone, Default)]
pub struct RecordingBuilder {
    bytes: Vec<u8>,
}

impl RecordingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame with an explicit header timestamp.
    pub fn frame(self, seconds: u32, microseconds: u32, data: &[u8]) -> Self {
        self.header(seconds, microseconds, data.len() as u32).raw(data)
    }

    /// Append a frame stamped `timestamp` seconds.
    ///
    /// # Panics
    ///
    /// Panics if the timestamp can't be represented in a ttyrec header.
    pub fn frame_at(self, timestamp: f64, data: &[u8]) -> Self {
        let header = FrameHeader::from_timestamp(timestamp, data.len())
            .unwrap_or_else(|e| panic!("Unrepresentable test timestamp {}: {}", timestamp, e));
        self.raw(&header.to_bytes()).raw(data)
    }

    /// Append only a header, which may disagree with the data that follows.
    pub fn header(self, seconds: u32, microseconds: u32, length: u32) -> Self {
        self.raw(&FrameHeader { seconds, microseconds, length }.to_bytes())
    }

    /// Append arbitrary bytes.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }

    pub fn cursor(self) -> Cursor<Vec<u8>> {
        Cursor::new(self.bytes)
    }
}

/// A shell-like session of `frames` frames with irregular gaps, including an
/// occasional long idle period.
pub fn sample_session(frames: usize) -> Vec<u8> {
    let mut builder = RecordingBuilder::new();
    let mut micros: u64 = 1_700_000_000 * 1_000_000;

    for i in 0..frames {
        let gap = match i % 50 {
            0 if i > 0 => 45_000_000,
            n if n % 7 == 0 => 1_200_000,
            n => 20_000 + (n as u64 * 13_337) % 180_000,
        };
        micros += gap;

        let data = match i % 4 {
            0 => format!("\x1b[32muser@host\x1b[0m:~$ frame {}\r\n", i),
            1 => "l".repeat(1 + i % 3),
            2 => format!("total {}\r\ndrwxr-xr-x  2 user user 4096 .\r\n", i * 4),
            _ => "\x1b[2J\x1b[H".to_string(),
        };

        builder = builder.frame(
            (micros / 1_000_000) as u32,
            (micros % 1_000_000) as u32,
            data.as_bytes(),
        );
    }

    builder.build()
}

/// Gzip-compress `bytes`.
pub fn gzip(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(bytes).expect("gzip encoding into memory cannot fail");
    encoder.finish().expect("gzip encoding into memory cannot fail")
}

/// Zstd-compress `bytes`.
pub fn zstd(bytes: &[u8]) -> Vec<u8> {
    zstd::encode_all(bytes, 0).expect("zstd encoding into memory cannot fail")
}

/// Write `bytes` to a fresh file under the system temp directory.
pub fn write_temp_recording(name: &str, bytes: &[u8]) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    let unique = COUNTER.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir()
        .join(format!("ttyrec-frames-{}-{}-{}", std::process::id(), unique, name));
    std::fs::write(&path, bytes)
        .unwrap_or_else(|e| panic!("Writing temp recording {}: {}", path.display(), e));
    path
}

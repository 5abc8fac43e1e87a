//! Input sources for recordings
//!
//! ttyrec files are commonly stored compressed. This module opens a path (or stdin for
//! `-`), looks at the first bytes of the stream, and wraps it in the matching
//! decompressor so the decoder always sees raw ttyrec bytes.
//!
//! | Magic          | Format | Handling                         |
//! |----------------|--------|----------------------------------|
//! | `1f 8b 08`       | gzip   | `flate2::bufread::MultiGzDecoder` |
//! | `28 b5 2f fd`    | zstd   | `zstd::stream::read::Decoder`     |
//! | `42 5a 68 31-39` | bzip2  | rejected                          |
//! | anything else    | raw    | passed through                    |
//!
//! A raw recording begins with the low bytes of a seconds field, so detection can in
//! principle misfire; [`wrap_reader_as`] skips detection when the format is known.

use std::fs::File;
use std::io::{self, BufReader, Chain, Cursor, Read};
use std::path::Path;

use flate2::bufread::MultiGzDecoder;
use tracing::{debug, info};

use crate::decoder::reader::read_fully;
use crate::{Result, TtyrecError};

/// Byte stream handed to the decoder.
pub type Source = Box<dyn Read + Send>;

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b, 0x08];
const ZSTD_MAGIC: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd];
const BZIP2_MAGIC: &[u8] = b"BZh";
const SNIFF_LEN: usize = 4;

/// Compression detected on an input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Zstd,
}

impl Compression {
    /// Identify the compression from the leading bytes of a stream.
    pub fn sniff(prefix: &[u8]) -> Result<Self> {
        if prefix.starts_with(GZIP_MAGIC) {
            Ok(Compression::Gzip)
        } else if prefix.starts_with(ZSTD_MAGIC) {
            Ok(Compression::Zstd)
        } else if prefix.starts_with(BZIP2_MAGIC)
            && matches!(prefix.get(3), Some(b'1'..=b'9'))
        {
            Err(TtyrecError::UnsupportedCompression { format: "bzip2".to_string() })
        } else {
            Ok(Compression::None)
        }
    }
}

/// Open a recording for decoding. `-` reads from standard input.
pub fn open_source<P: AsRef<Path>>(path: P) -> Result<Source> {
    let path = path.as_ref();

    if path == Path::new("-") {
        info!("Reading ttyrec stream from stdin");
        return wrap_reader(io::stdin());
    }

    let file = File::open(path).map_err(|e| TtyrecError::file_error(path.to_path_buf(), e))?;
    let (compression, reader) = sniff(file).map_err(|e| match e {
        TtyrecError::Io { source } => TtyrecError::file_error(path.to_path_buf(), source),
        other => other,
    })?;

    info!("Opened ttyrec file: {} ({:?})", path.display(), compression);
    decompress(reader, compression)
}

/// Wrap an arbitrary reader, decompressing it if needed.
pub fn wrap_reader<R: Read + Send + 'static>(reader: R) -> Result<Source> {
    let (compression, reader) = sniff(reader)?;
    decompress(reader, compression)
}

/// Read enough of the stream to recognise its magic bytes, then put them back in
/// front of the rest of the stream.
fn sniff<R: Read>(mut reader: R) -> Result<(Compression, Chain<Cursor<Vec<u8>>, R>)> {
    let mut prefix = vec![0u8; SNIFF_LEN];
    let filled = read_fully(&mut reader, &mut prefix)?;
    prefix.truncate(filled);

    let compression = Compression::sniff(&prefix)?;
    Ok((compression, Cursor::new(prefix).chain(reader)))
}

/// Wrap a reader whose compression is already known.
pub fn wrap_reader_as<R: Read + Send + 'static>(
    reader: R,
    compression: Compression,
) -> Result<Source> {
    decompress(reader, compression)
}

fn decompress<R: Read + Send + 'static>(reader: R, compression: Compression) -> Result<Source> {
    debug!("Input compression: {:?}", compression);
    let reader = BufReader::new(reader);
    match compression {
        Compression::None => Ok(Box::new(reader)),
        Compression::Gzip => Ok(Box::new(MultiGzDecoder::new(reader))),
        Compression::Zstd => Ok(Box::new(zstd::stream::read::Decoder::with_buffer(reader)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FrameDecoder;
    use crate::test_utils::{RecordingBuilder, gzip, write_temp_recording, zstd};
    use anyhow::{Context, Result};
    use std::path::PathBuf;

    fn recording() -> Vec<u8> {
        RecordingBuilder::new()
            .frame(1_700_000_000, 0, b"$ echo hi\r\n")
            .frame(1_700_000_000, 400_000, b"hi\r\n")
            .build()
    }

    fn decode(source: Source) -> Result<Vec<Vec<u8>>> {
        FrameDecoder::new(source)
            .map(|frame| frame.map(|frame| frame.data))
            .collect::<crate::Result<Vec<_>>>()
            .context("Decoding source")
    }

    #[test]
    fn sniffs_known_magic() -> Result<()> {
        assert_eq!(Compression::sniff(&[0x1f, 0x8b, 0x08, 0x00])?, Compression::Gzip);
        assert_eq!(Compression::sniff(&[0x28, 0xb5, 0x2f, 0xfd])?, Compression::Zstd);
        assert_eq!(Compression::sniff(&[0x00, 0xf1, 0x53, 0x65])?, Compression::None);
        assert_eq!(Compression::sniff(&[0x1f, 0x8b])?, Compression::None);
        assert_eq!(Compression::sniff(b"BZx0")?, Compression::None);
        assert_eq!(Compression::sniff(&[])?, Compression::None);
        Ok(())
    }

    #[test]
    fn bzip2_is_rejected() {
        let result = wrap_reader(Cursor::new(b"BZh91AY&SY".to_vec()));
        assert!(matches!(
            result,
            Err(TtyrecError::UnsupportedCompression { ref format }) if format == "bzip2"
        ));
    }

    #[test]
    fn raw_gzip_and_zstd_decode_identically() -> Result<()> {
        let raw = recording();
        let expected = decode(wrap_reader(Cursor::new(raw.clone()))?)?;

        assert_eq!(expected.len(), 2);
        assert_eq!(decode(wrap_reader(Cursor::new(gzip(&raw)))?)?, expected);
        assert_eq!(decode(wrap_reader(Cursor::new(zstd(&raw)))?)?, expected);
        Ok(())
    }

    #[test]
    fn concatenated_gzip_members_are_read() -> Result<()> {
        let first = RecordingBuilder::new().frame(10, 0, b"a").build();
        let second = RecordingBuilder::new().frame(11, 0, b"b").build();
        let mut bytes = gzip(&first);
        bytes.extend(gzip(&second));

        assert_eq!(decode(wrap_reader(Cursor::new(bytes))?)?, vec![b"a".to_vec(), b"b".to_vec()]);
        Ok(())
    }

    #[test]
    fn short_streams_pass_through() -> Result<()> {
        let source = wrap_reader(Cursor::new(vec![0x01, 0x02]))?;
        let err = FrameDecoder::new(source).next_frame().unwrap_err();
        assert!(err.to_string().contains("expected 12-byte header, got 2"));
        Ok(())
    }

    #[test]
    fn explicit_compression_skips_detection() -> Result<()> {
        let raw = recording();
        let source = wrap_reader_as(Cursor::new(gzip(&raw)), Compression::Gzip)?;
        assert_eq!(decode(source)?.len(), 2);
        Ok(())
    }

    #[test]
    fn opens_compressed_file_from_disk() -> Result<()> {
        let path = write_temp_recording("session.ttyrec.zst", &zstd(&recording()));
        let frames = decode(open_source(&path)?)?;
        std::fs::remove_file(&path).ok();

        assert_eq!(frames[1], b"hi\r\n");
        Ok(())
    }

    #[test]
    fn missing_file_reports_path() {
        let path = PathBuf::from("/definitely/not/here.ttyrec");
        match open_source(&path) {
            Err(TtyrecError::File { path: reported, .. }) => assert_eq!(reported, path),
            Err(other) => panic!("Expected File error, got {:?}", other),
            Ok(_) => panic!("Opening a missing file should fail"),
        }
    }
}

//! TibiaCAM `.cam` files
//!
//! | Field            | Size                      | Notes                                       |
//! |------------------|---------------------------|---------------------------------------------|
//! | Header           | 32 bytes                  | Unused                                      |
//! | Version          | 3 bytes                   | One decimal digit per byte, e.g. 7, 7, 2    |
//! | Padding          | 1 byte                    |                                             |
//! | Metadata length  | 4 bytes                   |                                             |
//! | Metadata         | (Metadata length) bytes   | Unused                                      |
//! | Payload length   | 4 bytes                   | Excludes the 13 byte LZMA header            |
//! | Payload          | 13 + (Payload length)     | LZMA-alone stream                           |
//!
//! The decompressed payload holds a 2 byte tag, a frame count biased by 57 and the frames. Each
//! frame is a 2 byte length, a 4 byte time, the data and a 4 byte trailer.

use std::io::Write;

use lzma_rs::decompress::{Options, Stream, UnpackedSize};
use tracing::{debug, instrument, trace, warn};

use super::{finish_raw, frame_capacity, unbias_frame_count, RecordingFormat, Source};
use crate::{
    error::{Error, Result},
    recording::{Decoded, Frame},
    stream::ByteReader,
};

const HEADER_LEN: usize = 32;

/// Properties byte, dictionary size and uncompressed size
const LZMA_HEADER_LEN: usize = 1 + 4 + 8;

const PAYLOAD_TAG_LEN: usize = 2;

const FRAME_TRAILER_LEN: usize = 4;

/// TibiaCAM
#[derive(Debug, Default, Copy, Clone)]
pub struct Cam;

impl RecordingFormat for Cam {
    fn name(&self) -> &'static str {
        "TibiaCAM"
    }

    fn extension(&self) -> &'static str {
        "cam"
    }

    #[instrument(skip_all, fields(file = source.name))]
    fn load(&self, source: &Source<'_>) -> Result<Decoded> {
        let mut reader = ByteReader::new(source.data);
        reader.skip(HEADER_LEN)?;

        let mut version = 0u16;
        for _ in 0..3 {
            version = version * 10 + u16::from(reader.read_u8()?);
        }
        reader.skip(1)?;

        let metadata = reader.read_u32()?;
        reader.skip(metadata as usize)?;

        let compressed = reader.read_u32()? as usize;
        debug!(version, metadata, compressed, "read header");

        let wanted = LZMA_HEADER_LEN.saturating_add(compressed);
        let (payload, mut error) = if reader.remaining() < wanted {
            (reader.read_rest(), Some(Error::EndOfStream))
        } else {
            (reader.read_bytes(wanted)?, None)
        };

        let inflated = match decompress(source.name, payload, error.is_some()) {
            Ok(inflated) => inflated,
            Err(e) if error.is_some() => {
                debug!(error = %e, "truncated before any data could be decompressed");
                return Err(Error::EndOfStream);
            }
            Err(e) => return Err(e),
        };
        debug!(inflated = inflated.len(), "decompressed payload");

        let mut frames = Vec::new();
        if let Err(e) = read_payload(&inflated, source.name, &mut frames) {
            error.get_or_insert(e);
        }

        finish_raw(Some(version), frames, error)
    }
}

/// Decompress an LZMA-alone stream
///
/// A `truncated` stream yields everything that could be decoded from the bytes present.
fn decompress(file: &str, payload: &[u8], truncated: bool) -> Result<Vec<u8>> {
    let options = Options {
        unpacked_size: UnpackedSize::ReadFromHeader,
        allow_incomplete: truncated,
        ..Default::default()
    };

    let mut stream = Stream::new_with_options(&options, Vec::new());
    stream
        .write_all(payload)
        .map_err(|e| Error::invalid(file, "payload", e, "an LZMA stream"))?;

    match stream.finish() {
        Ok(inflated) => {
            if truncated {
                warn!(
                    file,
                    inflated = inflated.len(),
                    "payload is truncated, keeping what was decompressed"
                );
            }
            Ok(inflated)
        }
        Err(e) => Err(Error::invalid(file, "payload", e, "an LZMA stream")),
    }
}

fn read_payload(payload: &[u8], file: &str, frames: &mut Vec<Frame>) -> Result<()> {
    let mut reader = ByteReader::new(payload);
    reader.skip(PAYLOAD_TAG_LEN)?;

    let count = unbias_frame_count(file, reader.read_u32()?)?;
    frames.reserve(frame_capacity(count));

    for index in 0..count {
        let length = reader.read_u16()?;
        let time = reader.read_u32()?;
        let data = reader.read_bytes(length.into())?;

        trace!(index, time, length, "read frame");
        frames.push(Frame::new(time, data));

        reader.skip(FRAME_TRAILER_LEN)?;
    }

    Ok(())
}

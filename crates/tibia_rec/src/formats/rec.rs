//! TibiCAM `.rec` files
//!
//! | Field            | Size                | Notes                                         |
//! |------------------|---------------------|-----------------------------------------------|
//! | Container version| 2 bytes             | 259, 515, 516, 517 or 518                     |
//! | Frame count      | 4 bytes             | Biased by 57 from container version 515       |
//! | Frames           |                     |                                               |
//!
//! Each frame is a length (4 bytes for 259, 2 bytes otherwise), a 4 byte time, the data and, for
//! encrypted containers, a 4 byte Adler-32 checksum of the encrypted data.

use tracing::{debug, instrument, trace};

use super::{finish_raw, frame_capacity, unbias_frame_count, RecordingFormat, Source};
use crate::{
    crypto::RecCipher,
    error::{Error, Result},
    recording::{Decoded, Frame},
    stream::ByteReader,
};

pub const CONTAINER_VERSIONS: [u16; 5] = [259, 515, 516, 517, 518];

/// TibiCAM
#[derive(Debug, Default, Copy, Clone)]
pub struct Rec;

impl RecordingFormat for Rec {
    fn name(&self) -> &'static str {
        "TibiCAM"
    }

    fn extension(&self) -> &'static str {
        "rec"
    }

    #[instrument(skip_all, fields(file = source.name))]
    fn load(&self, source: &Source<'_>) -> Result<Decoded> {
        let mut reader = ByteReader::new(source.data);

        let container = reader.read_u16()?;
        if !CONTAINER_VERSIONS.contains(&container) {
            return Err(Error::invalid(
                source.name,
                "container_version",
                container,
                "one of 259, 515, 516, 517, 518",
            ));
        }

        let stored = reader.read_u32()?;
        let count = if container >= 515 {
            unbias_frame_count(source.name, stored)?
        } else {
            stored
        };
        debug!(container, count, "read header");

        let header = Header {
            container,
            count,
            cipher: RecCipher::for_container(container),
        };

        let mut frames = Vec::with_capacity(frame_capacity(count));
        let error = read_frames(&mut reader, source.name, &header, &mut frames).err();

        finish_raw(None, frames, error)
    }
}

struct Header {
    container: u16,
    count: u32,
    cipher: Option<RecCipher>,
}

fn read_frames(
    reader: &mut ByteReader<'_>,
    file: &str,
    header: &Header,
    frames: &mut Vec<Frame>,
) -> Result<()> {
    for index in 0..header.count {
        let length = match header.container {
            259 => reader.read_u32()?,
            _ => reader.read_u16()?.into(),
        };
        if length == 0 {
            return Err(Error::invalid(file, "frame_length", length, "> 0"));
        }

        let time = reader.read_u32()?;
        let data = reader.read_bytes(length as usize)?;
        let data = match &header.cipher {
            Some(cipher) => {
                let checksum = reader.read_u32()?;
                cipher.decrypt(file, time, data, checksum)?
            }
            None => data.to_vec(),
        };

        trace!(index, time, length, "read frame");
        frames.push(Frame::new(time, data));
    }

    Ok(())
}

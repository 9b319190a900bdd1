//! TibiaMovie `.tmv` files
//!
//! The whole file is gzip compressed. The inflated stream starts with a 2 byte format version
//! (always 2), the 2 byte client version and a 4 byte length, followed by records:
//!
//! | Type | Payload                                          |
//! |------|--------------------------------------------------|
//! | 0    | 4 byte time delta, 2 byte length, data           |
//! | 1    | none                                             |

use std::io::Read;

use flate2::read::GzDecoder;
use tracing::{debug, instrument, trace};

use super::{finish_raw, RecordingFormat, Source};
use crate::{
    error::{Error, Result},
    recording::{Decoded, Frame},
    stream::ByteReader,
};

/// Signature of the newer TibiaMovie format
pub const TMV2_MAGIC: &[u8; 4] = b"TMV2";

const FORMAT_VERSION: u16 = 2;

const RECORD_FRAME: u8 = 0;
const RECORD_MARKER: u8 = 1;

/// TibiaMovie
#[derive(Debug, Default, Copy, Clone)]
pub struct Tmv;

impl RecordingFormat for Tmv {
    fn name(&self) -> &'static str {
        "TibiaMovie"
    }

    fn extension(&self) -> &'static str {
        "tmv"
    }

    #[instrument(skip_all, fields(file = source.name))]
    fn load(&self, source: &Source<'_>) -> Result<Decoded> {
        if source.data.starts_with(TMV2_MAGIC) {
            return Err(Error::NotImplemented {
                file: source.name.to_owned(),
                format: "TibiaMovie 2",
            });
        }

        let mut inflated = Vec::new();
        let mut error = match GzDecoder::new(source.data).read_to_end(&mut inflated) {
            Ok(_) => None,
            Err(e) if inflated.is_empty() => {
                return Err(Error::invalid(source.name, "payload", e, "a gzip stream"))
            }
            Err(e) => {
                debug!(error = %e, inflated = inflated.len(), "gzip stream is truncated");
                Some(Error::EndOfStream)
            }
        };

        let mut reader = ByteReader::new(&inflated);
        let format = reader.read_u16()?;
        if format != FORMAT_VERSION {
            return Err(Error::invalid(
                source.name,
                "format_version",
                format,
                FORMAT_VERSION,
            ));
        }

        let version = reader.read_u16()?;
        let declared = reader.read_u32()?;
        debug!(version, declared, "read header");

        let mut frames = Vec::new();
        if let Err(e) = read_records(&mut reader, source.name, &mut frames) {
            error = Some(e);
        }

        finish_raw(Some(version), frames, error)
    }
}

fn read_records(reader: &mut ByteReader<'_>, file: &str, frames: &mut Vec<Frame>) -> Result<()> {
    let mut time = 0u32;
    while !reader.is_empty() {
        match reader.read_u8()? {
            RECORD_FRAME => {
                time = time.saturating_add(reader.read_u32()?);
                let length = reader.read_u16()?;
                if length == 0 {
                    trace!(time, "skipping empty frame");
                    continue;
                }

                let data = reader.read_bytes(length.into())?;
                trace!(time, length, "read frame");
                frames.push(Frame::new(time, data));
            }
            RECORD_MARKER => trace!(time, "marker"),
            kind => return Err(Error::invalid(file, "record_type", kind, "0 or 1")),
        }
    }

    Ok(())
}

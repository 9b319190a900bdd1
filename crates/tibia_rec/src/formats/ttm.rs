//! TibiaTimeMachine `.ttm` files
//!
//! The header holds the client version, an optional server block (name and port) and the length
//! of the recording. Frames follow as a 2 byte length and the data. Between two frames a tag byte
//! advances the clock: `0` is followed by a 2 byte delta in milliseconds, `1` adds one second.

use tracing::{debug, instrument, trace};

use super::{RecordingFormat, Source};
use crate::{
    error::{Error, Result},
    recording::{Decoded, Frame, Recording},
    stream::ByteReader,
};

const TAG_DELTA: u8 = 0;
const TAG_SECOND: u8 = 1;
const SECOND_MS: u32 = 1000;

/// TibiaTimeMachine
#[derive(Debug, Default, Copy, Clone)]
pub struct Ttm;

impl RecordingFormat for Ttm {
    fn name(&self) -> &'static str {
        "TibiaTimeMachine"
    }

    fn extension(&self) -> &'static str {
        "ttm"
    }

    #[instrument(skip_all, fields(file = source.name))]
    fn load(&self, source: &Source<'_>) -> Result<Decoded> {
        let mut reader = ByteReader::new(source.data);

        let version = reader.read_u16()?;
        let server = reader.read_u8()?;
        if server > 0 {
            let name = reader.read_bytes(server.into())?;
            let port = reader.read_u16()?;
            debug!(server = %String::from_utf8_lossy(name), port, "recorded on custom server");
        }

        let declared = reader.read_u32()?;
        debug!(version, declared, "read header");

        let mut frames = Vec::new();
        let error = read_frames(&mut reader, source.name, &mut frames).err();

        Decoded::new(Recording::new(Some(version), frames), error)
    }
}

fn read_frames(reader: &mut ByteReader<'_>, file: &str, frames: &mut Vec<Frame>) -> Result<()> {
    let mut time = 0u32;
    loop {
        let length = reader.read_u16()?;
        let data = reader.read_bytes(length.into())?;
        if length == 0 {
            trace!(time, "skipped empty frame");
        } else {
            trace!(time, length, "read frame");
            frames.push(Frame::new(time, data));
        }

        if reader.is_empty() {
            return Ok(());
        }

        match reader.read_u8()? {
            TAG_DELTA => time = time.saturating_add(reader.read_u16()?.into()),
            TAG_SECOND => time = time.saturating_add(SECOND_MS),
            tag => return Err(Error::invalid(file, "frame_tag", tag, "0 or 1")),
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::Ttm;
    use crate::{
        error::{Error, Result},
        formats::{trp, RecordingFormat, Source},
        recording::Frame,
    };

    #[test]
    fn load_file() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            0xF8, 0x02,
            0x04, b'T', b'e', b's', b't', 0x1C, 0x1C,
            0x00, 0x00, 0x00, 0x00,
            // frame 0
            0x01, 0x00, 0xAA,
            0x00, 0xFA, 0x00,
            // frame 1
            0x02, 0x00, 0xBB, 0xCC,
            0x01,
            // frame 2
            0x01, 0x00, 0xDD,
        ];

        let decoded = Ttm.load(&Source::new("a.ttm", &input))?;
        let recording = decoded.recording();

        assert!(!decoded.is_partial());
        assert_eq!(recording.version(), Some(760));
        assert_eq!(recording.length(), 1250);
        assert_eq!(
            recording.frames(),
            &[
                Frame::new(0, [0xAA]),
                Frame::new(250, [0xBB, 0xCC]),
                Frame::new(1250, [0xDD]),
            ]
        );

        Ok(())
    }

    #[test]
    fn no_server_block() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            0x04, 0x03,
            0x00,
            0x00, 0x00, 0x00, 0x00,
            0x01, 0x00, 0xAA,
        ];

        let decoded = Ttm.load(&Source::new("a.ttm", &input))?;
        assert_eq!(decoded.recording().frames(), &[Frame::new(0, [0xAA])]);

        Ok(())
    }

    #[test]
    fn unknown_tag() {
        #[rustfmt::skip]
        let input = [
            0x04, 0x03,
            0x00,
            0x00, 0x00, 0x00, 0x00,
            0x01, 0x00, 0xAA,
            0x02,
            0x01, 0x00, 0xBB,
        ];

        let result = Ttm.load(&Source::new("a.ttm", &input));
        assert!(matches!(
            result,
            Err(Error::InvalidFile { field: "frame_tag", .. })
        ));
    }

    #[test]
    fn truncated_frame() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            0x04, 0x03,
            0x00,
            0x00, 0x00, 0x00, 0x00,
            0x01, 0x00, 0xAA,
            0x01,
            0x05, 0x00, 0xBB,
        ];

        let decoded = Ttm.load(&Source::new("a.ttm", &input))?;
        assert!(decoded.is_partial());
        assert_eq!(decoded.recording().frames(), &[Frame::new(0, [0xAA])]);

        Ok(())
    }

    #[test]
    fn empty_frames_are_skipped() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            0x04, 0x03,
            0x00,
            0x00, 0x00, 0x00, 0x00,
            0x01, 0x00, 0xAA,
            0x00, 0x64, 0x00,
            // empty
            0x00, 0x00,
            0x00, 0x64, 0x00,
            0x01, 0x00, 0xBB,
        ];

        let decoded = Ttm.load(&Source::new("a.ttm", &input))?;
        assert!(!decoded.is_partial());
        assert_eq!(
            decoded.recording().frames(),
            &[Frame::new(0, [0xAA]), Frame::new(200, [0xBB])]
        );

        let written = trp::encode(decoded.recording())?;
        let reloaded = trp::Trp.load(&Source::new("a.trp", &written))?;
        assert_eq!(reloaded.recording().frames(), decoded.recording().frames());

        Ok(())
    }
}

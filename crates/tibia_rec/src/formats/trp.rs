//! The canonical `.trp` format
//!

use std::io::{Cursor, Write};

use binrw::{BinRead, BinWrite};
use tracing::{debug, instrument};

use super::{frame_capacity, RecordingFormat, Source};
use crate::{
    error::{Error, Result},
    recording::{Decoded, Frame, Recording},
    stream::{ByteReader, ByteWriter},
};

pub const MAGIC: &[u8; 4] = b"TRP\0";

/// TRP file header
///
/// Always starts with "TRP\0". All data is stored in little endian format.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little, magic = b"TRP\0")]
pub struct TrpHeader {
    /// Client version, e.g. `772`
    pub version: u16,

    /// Length of the recording in milliseconds
    pub length: u32,

    /// The number of frames that follow the header
    pub frames: u32,
}

/// Tibia Replay
#[derive(Debug, Default, Copy, Clone)]
pub struct Trp;

impl RecordingFormat for Trp {
    fn name(&self) -> &'static str {
        "TRP"
    }

    fn extension(&self) -> &'static str {
        "trp"
    }

    #[instrument(skip_all, fields(file = source.name))]
    fn load(&self, source: &Source<'_>) -> Result<Decoded> {
        if source.data.len() >= MAGIC.len() && !source.data.starts_with(MAGIC) {
            return Err(Error::invalid(
                source.name,
                "magic",
                source.data[..MAGIC.len()].escape_ascii(),
                MAGIC.escape_ascii(),
            ));
        }

        let mut reader = ByteReader::new(source.data);
        let header = TrpHeader::read(&mut reader)?;
        debug!(?header, "read header");

        let mut frames = Vec::with_capacity(frame_capacity(header.frames));
        let error = read_frames(&mut reader, source.name, &header, &mut frames).err();

        let recording = Recording::with_length(Some(header.version), header.length, frames);
        Decoded::new(recording, error)
    }

    fn save(&self, recording: &Recording, writer: &mut dyn Write) -> Result<()> {
        writer.write_all(&encode(recording)?)?;
        Ok(())
    }
}

fn read_frames(
    reader: &mut ByteReader<'_>,
    file: &str,
    header: &TrpHeader,
    frames: &mut Vec<Frame>,
) -> Result<()> {
    for _ in 0..header.frames {
        let time = reader.read_u32()?;
        if time > header.length {
            return Err(Error::invalid(
                file,
                "frame_time",
                time,
                format!("<= {}", header.length),
            ));
        }

        let length = reader.read_u16()?;
        if length == 0 {
            return Err(Error::invalid(file, "frame_length", length, "> 0"));
        }

        let data = reader.read_bytes(length.into())?;
        frames.push(Frame::new(time, data));
    }

    Ok(())
}

/// Encode `recording` as a complete TRP file
///
/// Nothing is produced unless the recording has a version and every frame fits.
pub fn encode(recording: &Recording) -> Result<Vec<u8>> {
    let version = recording.version().ok_or(Error::MissingVersion)?;
    if let Some((index, frame)) = recording
        .frames()
        .iter()
        .enumerate()
        .find(|(_, frame)| frame.data.is_empty() || frame.data.len() > usize::from(u16::MAX))
    {
        return Err(Error::InvalidFrameSize {
            index,
            size: frame.data.len(),
        });
    }

    let frames = u32::try_from(recording.frames().len()).map_err(|_| {
        Error::invalid("recording", "frame_count", recording.frames().len(), u32::MAX)
    })?;

    let header = TrpHeader {
        version,
        length: recording.length(),
        frames,
    };

    let mut cursor = Cursor::new(Vec::new());
    header.write(&mut cursor)?;

    let mut writer = ByteWriter::new(cursor);
    for frame in recording.frames() {
        writer.write_u32(frame.time)?;
        writer.write_u16(frame.data.len() as u16)?;
        writer.write_bytes(&frame.data)?;
    }

    Ok(writer.into_inner().into_inner())
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::{BinRead, BinWrite};
    use pretty_assertions::assert_eq;

    use super::{encode, Trp, TrpHeader};
    use crate::{
        error::{Error, Result},
        formats::{RecordingFormat, Source},
        recording::{Frame, Recording},
    };

    #[test]
    fn read_header() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x54, 0x52, 0x50, 0x00,
            0x04, 0x03,
            0xE8, 0x03, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
        ]);

        let expected = TrpHeader {
            version: 772,
            length: 1000,
            frames: 2,
        };

        assert_eq!(TrpHeader::read(&mut input)?, expected);

        Ok(())
    }

    #[test]
    fn write_header() -> Result<()> {
        #[rustfmt::skip]
        let expected: Vec<u8> = vec![
            0x54, 0x52, 0x50, 0x00,
            0x04, 0x03,
            0xE8, 0x03, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
        ];

        let header = TrpHeader {
            version: 772,
            length: 1000,
            frames: 2,
        };

        let mut actual = Vec::new();
        header.write(&mut Cursor::new(&mut actual))?;

        assert_eq!(actual, expected);

        Ok(())
    }

    #[test]
    fn load_file() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            0x54, 0x52, 0x50, 0x00,
            0x04, 0x03,
            0xE8, 0x03, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
            // frame 0
            0x00, 0x00, 0x00, 0x00,
            0x02, 0x00,
            0xAA, 0xBB,
            // frame 1
            0xF4, 0x01, 0x00, 0x00,
            0x01, 0x00,
            0xCC,
        ];

        let decoded = Trp.load(&Source::new("a.trp", &input))?;
        let expected = Recording::with_length(
            Some(772),
            1000,
            vec![Frame::new(0, [0xAA, 0xBB]), Frame::new(500, [0xCC])],
        );

        assert!(!decoded.is_partial());
        assert_eq!(decoded.recording(), &expected);

        Ok(())
    }

    #[test]
    fn bad_magic() {
        let input = [0x54, 0x52, 0x51, 0x00, 0x04, 0x03, 0x00, 0x00, 0x00, 0x00];
        let result = Trp.load(&Source::new("a.trp", &input));

        assert!(matches!(
            result,
            Err(Error::InvalidFile { field: "magic", .. })
        ));
    }

    #[test]
    fn frame_after_end() {
        #[rustfmt::skip]
        let input = [
            0x54, 0x52, 0x50, 0x00,
            0x04, 0x03,
            0x0A, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0x0B, 0x00, 0x00, 0x00,
            0x01, 0x00,
            0xAA,
        ];

        let result = Trp.load(&Source::new("a.trp", &input));
        assert!(matches!(
            result,
            Err(Error::InvalidFile { field: "frame_time", .. })
        ));
    }

    #[test]
    fn empty_frame() {
        #[rustfmt::skip]
        let input = [
            0x54, 0x52, 0x50, 0x00,
            0x04, 0x03,
            0x0A, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00,
        ];

        let result = Trp.load(&Source::new("a.trp", &input));
        assert!(matches!(
            result,
            Err(Error::InvalidFile { field: "frame_length", .. })
        ));
    }

    #[test]
    fn truncated_after_first_frame() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            0x54, 0x52, 0x50, 0x00,
            0x04, 0x03,
            0x0A, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x01, 0x00,
            0xAA,
            0x05, 0x00,
        ];

        let decoded = Trp.load(&Source::new("a.trp", &input))?;
        assert!(decoded.is_partial());
        assert_eq!(decoded.recording().frames(), &[Frame::new(0, [0xAA])]);
        assert_eq!(decoded.recording().length(), 10);

        Ok(())
    }

    #[test]
    fn truncated_header() {
        let result = Trp.load(&Source::new("a.trp", &[0x54, 0x52, 0x50, 0x00, 0x04]));
        assert!(matches!(result, Err(Error::EndOfStream)));
    }

    #[test]
    fn encode_file() -> Result<()> {
        let recording = Recording::new(
            Some(760),
            vec![Frame::new(0, [0x01]), Frame::new(7, [0x02, 0x03])],
        );

        #[rustfmt::skip]
        let expected: Vec<u8> = vec![
            0x54, 0x52, 0x50, 0x00,
            0xF8, 0x02,
            0x07, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x01, 0x00,
            0x01,
            0x07, 0x00, 0x00, 0x00,
            0x02, 0x00,
            0x02, 0x03,
        ];

        assert_eq!(encode(&recording)?, expected);

        Ok(())
    }

    #[test]
    fn encode_requires_version() {
        let recording = Recording::new(None, vec![Frame::new(0, [0x01])]);
        assert!(matches!(encode(&recording), Err(Error::MissingVersion)));
    }

    #[test]
    fn encode_rejects_oversized_frame() {
        let recording = Recording::new(
            Some(772),
            vec![Frame::new(0, [0x01]), Frame::new(1, vec![0x00; 70_000])],
        );

        assert!(matches!(
            encode(&recording),
            Err(Error::InvalidFrameSize { index: 1, size: 70_000 })
        ));
    }
}

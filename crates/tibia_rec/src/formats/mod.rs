//! Decoders for every supported recording format
//!

use std::io::Write;

use crate::{
    error::{Error, Result},
    reassemble::{reassemble, rebase_times, Reassembled},
    recording::{Decoded, Frame, Recording},
};

pub mod cam;
pub mod rec;
pub mod tmv;
pub mod trp;
pub mod ttm;

pub use cam::Cam;
pub use rec::Rec;
pub use tmv::Tmv;
pub use trp::Trp;
pub use ttm::Ttm;

/// The complete contents of a recording file together with its name
#[derive(Debug, Clone, Copy)]
pub struct Source<'a> {
    /// File name, used for extension matching and error messages
    pub name: &'a str,

    /// Raw file contents
    pub data: &'a [u8],
}

impl<'a> Source<'a> {
    pub fn new(name: &'a str, data: &'a [u8]) -> Self {
        Self { name, data }
    }
}

/// A recording format that can be decoded, and possibly encoded
pub trait RecordingFormat: Send + Sync {
    /// Human readable name of the format
    fn name(&self) -> &'static str;

    /// File extension without the leading dot
    fn extension(&self) -> &'static str;

    /// Decode a complete file
    fn load(&self, source: &Source<'_>) -> Result<Decoded>;

    /// Encode `recording` into `writer`
    fn save(&self, recording: &Recording, writer: &mut dyn Write) -> Result<()> {
        let _ = (recording, writer);
        Err(Error::ReadOnlyFormat(self.name()))
    }

    /// Whether `name` carries this format's extension, ignoring case
    fn matches(&self, name: &str) -> bool {
        std::path::Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(self.extension()))
    }
}

/// Finish a format whose frames are raw network reads
///
/// Times are rebased to zero before the reads are split into packets. A trailing incomplete packet
/// counts as truncation.
pub(crate) fn finish_raw(
    version: Option<u16>,
    mut raw: Vec<Frame>,
    error: Option<Error>,
) -> Result<Decoded> {
    rebase_times(&mut raw);
    let Reassembled { frames, dangling } = reassemble(&raw);

    let error = match error {
        None if dangling > 0 => Some(Error::EndOfStream),
        error => error,
    };

    Decoded::new(Recording::new(version, frames), error)
}

/// Frame counts stored by TibiCAM are biased by this amount
pub(crate) const FRAME_COUNT_BIAS: u32 = 57;

pub(crate) fn unbias_frame_count(file: &str, stored: u32) -> Result<u32> {
    stored.checked_sub(FRAME_COUNT_BIAS).ok_or_else(|| {
        Error::invalid(file, "frame_count", stored, format!(">= {FRAME_COUNT_BIAS}"))
    })
}

/// Upper bound for preallocating frames from an untrusted count
pub(crate) fn frame_capacity(count: u32) -> usize {
    count.min(4096) as usize
}

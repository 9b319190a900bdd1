//! Types shared by every recording format

use tracing::debug;

use crate::error::{Error, Result};

/// One server packet together with the time it was received
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Frame {
    /// Milliseconds since the start of the recording
    pub time: u32,

    /// The packet payload
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(time: u32, data: impl Into<Vec<u8>>) -> Self {
        Self {
            time,
            data: data.into(),
        }
    }
}

/// A decoded play session
///
/// The version may be unknown when the source format does not declare it. It can be assigned
/// exactly once, see [`Recording::assign_version`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recording {
    version: Option<u16>,
    length: u32,
    frames: Vec<Frame>,
}

impl Recording {
    /// Create a recording whose length is the time of its last frame
    pub fn new(version: Option<u16>, frames: Vec<Frame>) -> Self {
        let length = frames.last().map(|frame| frame.time).unwrap_or_default();
        Self {
            version,
            length,
            frames,
        }
    }

    /// Create a recording with an explicitly declared length
    pub fn with_length(version: Option<u16>, length: u32, frames: Vec<Frame>) -> Self {
        Self {
            version,
            length,
            frames,
        }
    }

    /// Client version, e.g. `772` for 7.72
    pub fn version(&self) -> Option<u16> {
        self.version
    }

    /// Length of the recording in milliseconds
    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }

    /// Set the version of a recording that does not have one yet
    pub fn assign_version(&mut self, version: u16) -> Result<()> {
        match self.version {
            Some(current) => Err(Error::VersionAlreadySet(current)),
            None => {
                self.version = Some(version);
                Ok(())
            }
        }
    }

    /// Consume this recording and produce an otherwise identical one tagged with `version`
    ///
    /// Unlike [`Recording::assign_version`] this replaces a version read from the file. Only
    /// `tibia convert --overwrite-version` needs that; everything else should go through
    /// `assign_version`.
    pub fn with_overridden_version(self, version: u16) -> Self {
        Self {
            version: Some(version),
            ..self
        }
    }
}

/// Outcome of decoding a recording
#[derive(Debug)]
pub enum Decoded {
    /// The whole input was decoded
    Complete(Recording),

    /// The input was truncated, the recording holds every frame decoded before the failure
    Partial { recording: Recording, error: Error },
}

impl Decoded {
    /// Combine a recording with the error that stopped its decoding, if any
    ///
    /// Only [`Error::EndOfStream`] after at least one frame yields a partial result, every other
    /// error is returned as is.
    pub fn new(recording: Recording, error: Option<Error>) -> Result<Self> {
        match error {
            None => Ok(Decoded::Complete(recording)),
            Some(error) if error.is_end_of_stream() && !recording.frames().is_empty() => {
                debug!(frames = recording.frames().len(), "recording is truncated");
                Ok(Decoded::Partial { recording, error })
            }
            Some(error) => Err(error),
        }
    }

    pub fn recording(&self) -> &Recording {
        match self {
            Decoded::Complete(recording) => recording,
            Decoded::Partial { recording, .. } => recording,
        }
    }

    pub fn recording_mut(&mut self) -> &mut Recording {
        match self {
            Decoded::Complete(recording) => recording,
            Decoded::Partial { recording, .. } => recording,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Decoded::Complete(_) => None,
            Decoded::Partial { error, .. } => Some(error),
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, Decoded::Partial { .. })
    }

    pub fn into_recording(self) -> Recording {
        self.into_parts().0
    }

    pub fn into_parts(self) -> (Recording, Option<Error>) {
        match self {
            Decoded::Complete(recording) => (recording, None),
            Decoded::Partial { recording, error } => (recording, Some(error)),
        }
    }
}

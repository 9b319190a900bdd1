//! Format selection for loading and saving recordings
//!

use std::{
    fs::File,
    io::{self, Write},
    path::Path,
};

use bon::Builder;
use tracing::{debug, instrument, warn};

use crate::{
    error::{Error, Result},
    formats::{Cam, Rec, RecordingFormat, Source, Tmv, Trp, Ttm},
    guess::{infer_version, VersionTable},
    recording::{Decoded, Recording},
};

/// Options for [`Registry::load`]
#[derive(Builder, Debug, Default, Copy, Clone)]
pub struct LoadOptions<'a> {
    /// Accept recordings that could only be partially decoded
    #[builder(default)]
    pub force: bool,

    /// Infer the version of recordings that do not declare one
    pub versions: Option<&'a VersionTable>,
}

/// The ordered list of formats tried when loading
pub struct Registry {
    formats: Vec<&'static dyn RecordingFormat>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(vec![&Trp as &'static dyn RecordingFormat, &Rec, &Cam, &Ttm, &Tmv])
    }
}

impl Registry {
    pub fn new(formats: Vec<&'static dyn RecordingFormat>) -> Self {
        Self { formats }
    }

    /// Every registered format in probing order
    pub fn formats(&self) -> impl Iterator<Item = &'static dyn RecordingFormat> + '_ {
        self.formats.iter().copied()
    }

    /// The format whose extension `name` carries
    pub fn by_name(&self, name: &str) -> Option<&'static dyn RecordingFormat> {
        self.formats().find(|format| format.matches(name))
    }

    /// Read and decode the file at `path`
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(&self, path: impl AsRef<Path>, options: &LoadOptions<'_>) -> Result<Decoded> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let name = path.to_string_lossy();

        self.load_source(&Source::new(&name, &data), options)
    }

    /// Decode `source`, preferring the format matching its name
    ///
    /// When there is no matching format, or it rejects the file's signature or finds it truncated,
    /// every other format is tried in order. Any other failure of the matching format, such as a
    /// bad checksum, is returned right away. A partial result only counts as success when
    /// `options.force` is set. If nothing succeeds the error of the matching format is returned, or
    /// [`Error::UnsupportedFile`] when no format matched the name.
    pub fn load_source(&self, source: &Source<'_>, options: &LoadOptions<'_>) -> Result<Decoded> {
        let preferred = self.by_name(source.name);

        let mut first_error = None;
        if let Some(format) = preferred {
            match attempt(format, source, options.force) {
                Ok(decoded) => return Ok(finish(decoded, source, options)),
                Err(e) if !may_be_misnamed(&e) => return Err(e),
                Err(e) => {
                    debug!(format = format.name(), error = %e, "could not decode by extension");
                    first_error = Some(e);
                }
            }
        }

        let others = self
            .formats()
            .filter(|format| preferred.map_or(true, |p| p.name() != format.name()));
        for format in others {
            match attempt(format, source, options.force) {
                Ok(decoded) => {
                    warn!(
                        file = source.name,
                        format = format.name(),
                        "file extension does not match its content"
                    );
                    return Ok(finish(decoded, source, options));
                }
                Err(e) => debug!(format = format.name(), error = %e, "probe failed"),
            }
        }

        Err(first_error.unwrap_or_else(|| Error::UnsupportedFile(source.name.to_owned())))
    }

    /// Write `recording` to a new file at `path`
    ///
    /// The format is chosen by extension. Existing files are never overwritten and nothing is
    /// written unless the whole recording can be encoded.
    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn save(&self, recording: &Recording, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = self
            .by_name(&path.to_string_lossy())
            .ok_or_else(|| Error::UnsupportedFile(path.display().to_string()))?;

        if path.exists() {
            return Err(Error::AlreadyExists(path.to_path_buf()));
        }

        if recording.version().is_none() {
            return Err(Error::MissingVersion);
        }

        let mut buffer = Vec::new();
        format.save(recording, &mut buffer)?;

        let mut file = File::create_new(path).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => Error::AlreadyExists(path.to_path_buf()),
            _ => Error::IOError(e),
        })?;
        file.write_all(&buffer)?;

        debug!(bytes = buffer.len(), frames = recording.frames().len(), "saved recording");
        Ok(())
    }
}

/// Whether `error` suggests the file is of another format than its extension says
fn may_be_misnamed(error: &Error) -> bool {
    matches!(
        error,
        Error::EndOfStream
            | Error::InvalidFile {
                field: "magic" | "container_version" | "format_version" | "payload",
                ..
            }
    )
}

fn attempt(format: &dyn RecordingFormat, source: &Source<'_>, force: bool) -> Result<Decoded> {
    match format.load(source)? {
        Decoded::Partial { error, .. } if !force => Err(error),
        decoded => Ok(decoded),
    }
}

fn finish(mut decoded: Decoded, source: &Source<'_>, options: &LoadOptions<'_>) -> Decoded {
    if let Some(error) = decoded.error() {
        warn!(
            file = source.name,
            frames = decoded.recording().frames().len(),
            %error,
            "recording was only partially loaded"
        );
    }

    if let Some(table) = options.versions {
        infer_version(decoded.recording_mut(), table);
    }

    decoded
}

/// Load the file at `path` with the default registry
pub fn load(path: impl AsRef<Path>, force: bool) -> Result<Decoded> {
    Registry::default().load(path, &LoadOptions::builder().force(force).build())
}

/// Save `recording` to `path` with the default registry
pub fn save(recording: &Recording, path: impl AsRef<Path>) -> Result<()> {
    Registry::default().save(recording, path)
}

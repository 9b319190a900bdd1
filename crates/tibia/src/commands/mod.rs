use std::path::{Path, PathBuf};

use itertools::Itertools;
use tibia_rec::{Decoded, LoadOptions, Registry};
use tracing::warn;
use walkdir::WalkDir;

pub mod convert;
pub mod dump;
pub mod strings;
pub mod version;
pub mod world;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Convert recordings to TRP files
    Convert(convert::ConvertArgs),
    /// Print the header and, optionally, every frame of recordings
    Dump(dump::DumpArgs),
    /// Print the client version of recordings
    Version(version::VersionArgs),
    /// Guess the game world recordings were made on
    World(world::WorldArgs),
    /// Print the text found in recordings
    Strings(strings::StringsArgs),
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Convert(convert) => convert.handle(),
            Commands::Dump(dump) => dump.handle(),
            Commands::Version(version) => version.handle(),
            Commands::World(world) => world.handle(),
            Commands::Strings(strings) => strings.handle(),
        }
    }
}

/// Every file named in `inputs`, directories are walked recursively
pub(crate) fn collect_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    inputs
        .iter()
        .flat_map(|input| {
            WalkDir::new(input)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| !e.file_type().is_dir())
                .map(|e| e.into_path())
        })
        .unique()
        .collect()
}

/// Load `path`, logging the failure instead of returning it
pub(crate) fn load_or_warn(
    registry: &Registry,
    path: &Path,
    options: &LoadOptions<'_>,
) -> Option<Decoded> {
    match registry.load(path, options) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warn!(file = %path.display(), error = %e, "could not load file");
            None
        }
    }
}

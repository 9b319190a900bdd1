use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use clap::Args;
use itertools::Itertools;
use miette::{miette, Context, IntoDiagnostic, Result};
use rayon::prelude::*;
use tibia_rec::{guess::VersionTable, LoadOptions, Registry};
use tracing::{info, instrument, warn};

#[derive(Args)]
pub struct ConvertArgs {
    /// Keep files that end unexpectedly, with every frame read before the end
    #[arg(short, long, default_value_t = false)]
    force: bool,

    /// Place output files in a folder per version, e.g. `7.72`
    #[arg(short, long, default_value_t = false)]
    subfolder: bool,

    /// Use this version when none could be detected
    #[arg(short = 'c', long, value_name = "VERSION")]
    client_version: Option<u16>,

    /// Always use --client-version, even when a version was detected
    #[arg(short, long, default_value_t = false, requires = "client_version")]
    overwrite_version: bool,

    /// Delete every source file that was converted
    #[arg(short, long, default_value_t = false)]
    delete: bool,

    /// Convert this many files in parallel
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// A JSON file replacing the built-in release dates
    #[arg(short, long, value_name = "FILE")]
    milestones: Option<PathBuf>,

    /// Output files are placed in this directory
    #[arg(value_name = "OUTPUT_DIR")]
    output: PathBuf,

    /// Files to convert, or directories to scan for files
    #[arg(value_name = "FILE", required = true)]
    inputs: Vec<PathBuf>,
}

impl ConvertArgs {
    pub fn handle(&self) -> Result<()> {
        let table = match &self.milestones {
            Some(path) => {
                let file = File::open(path)
                    .into_diagnostic()
                    .context(format!("opening {}", path.display()))?;
                VersionTable::from_json(file)?
            }
            None => VersionTable::default(),
        };

        info!(
            force = self.force,
            subfolder = self.subfolder,
            client_version = ?self.client_version,
            overwrite_version = self.overwrite_version,
            delete = self.delete,
            output = %self.output.display(),
            "converting"
        );

        fs::create_dir_all(&self.output)
            .into_diagnostic()
            .context(format!("creating {}", self.output.display()))?;

        let files = super::collect_files(&self.inputs);
        let registry = Registry::default();
        let options = LoadOptions::builder()
            .force(self.force)
            .versions(&table)
            .build();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs.max(1))
            .build()
            .into_diagnostic()?;

        let converted = pool.install(|| {
            files
                .par_iter()
                .filter(|file| match self.convert(&registry, &options, file) {
                    Ok(output) => {
                        info!(file = %file.display(), output = %output.display(), "converted");
                        true
                    }
                    Err(e) => {
                        warn!(file = %file.display(), error = %e.chain().join(": "), "could not convert");
                        false
                    }
                })
                .count()
        });

        info!(
            processed = files.len(),
            converted,
            failed = files.len() - converted,
            "done"
        );

        Ok(())
    }

    #[instrument(skip_all, fields(file = %file.display()))]
    fn convert(&self, registry: &Registry, options: &LoadOptions<'_>, file: &Path) -> Result<PathBuf> {
        let recording = registry
            .load(file, options)
            .context("could not read file")?
            .into_recording();

        let version = match (recording.version(), self.client_version) {
            (_, Some(version)) if self.overwrite_version => version,
            (Some(version), _) | (None, Some(version)) => version,
            (None, None) => {
                return Err(miette!(
                    "could not guess the version and no version was set"
                ))
            }
        };
        let recording = recording.with_overridden_version(version);

        let directory = if self.subfolder {
            self.output.join(version_folder(version))
        } else {
            self.output.clone()
        };
        fs::create_dir_all(&directory)
            .into_diagnostic()
            .context(format!("creating {}", directory.display()))?;

        let output = directory.join(output_name(file)?);
        tibia_rec::save(&recording, &output).context("could not write file")?;

        if self.delete {
            fs::remove_file(file)
                .into_diagnostic()
                .context(format!("deleting {}", file.display()))?;
        }

        Ok(output)
    }
}

/// `772` is stored in `7.72`
fn version_folder(version: u16) -> String {
    let digits = version.to_string();
    let (major, minor) = digits.split_at(1);
    format!("{major}.{minor}")
}

fn output_name(file: &Path) -> Result<PathBuf> {
    let name = file
        .file_name()
        .ok_or(miette!("{} is not a file", file.display()))?;
    Ok(Path::new(name).with_extension("trp"))
}

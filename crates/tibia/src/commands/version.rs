use std::{fs::File, path::PathBuf};

use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use owo_colors::{OwoColorize, Stream};
use tibia_rec::{guess::VersionTable, LoadOptions, Registry};

#[derive(Args)]
pub struct VersionArgs {
    /// A JSON file replacing the built-in release dates
    #[arg(short, long, value_name = "FILE")]
    milestones: Option<PathBuf>,

    /// Files to check
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,
}

impl VersionArgs {
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

        let registry = Registry::default();
        let options = LoadOptions::builder().force(true).versions(&table).build();

        for file in &self.files {
            let Some(decoded) = super::load_or_warn(&registry, file, &options) else {
                continue;
            };

            match decoded.recording().version() {
                Some(version) => println!("{}: {}", file.display(), version),
                None => println!(
                    "{}: {}",
                    file.display(),
                    "UNKNOWN".if_supports_color(Stream::Stdout, |text| text.yellow())
                ),
            }
        }

        Ok(())
    }
}

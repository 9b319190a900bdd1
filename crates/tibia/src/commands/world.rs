use std::{fs::File, path::PathBuf};

use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use owo_colors::{OwoColorize, Stream};
use tibia_rec::{
    guess::{infer_world, WorldList},
    LoadOptions, Registry,
};

#[derive(Args)]
pub struct WorldArgs {
    /// A JSON array of world names replacing the built-in list
    #[arg(short, long, value_name = "FILE")]
    worlds: Option<PathBuf>,

    /// Files to check
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,
}

impl WorldArgs {
    pub fn handle(&self) -> Result<()> {
        let worlds = match &self.worlds {
            Some(path) => {
                let file = File::open(path)
                    .into_diagnostic()
                    .context(format!("opening {}", path.display()))?;
                WorldList::from_json(file)?
            }
            None => WorldList::default(),
        };

        let registry = Registry::default();
        let options = LoadOptions::builder().force(true).build();

        for file in &self.files {
            let Some(decoded) = super::load_or_warn(&registry, file, &options) else {
                continue;
            };

            match infer_world(decoded.recording().frames(), &worlds) {
                Some(world) => println!("{}: {}", file.display(), world),
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

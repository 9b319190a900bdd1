use std::path::PathBuf;

use clap::Args;
use miette::Result;
use tibia_rec::{hexdump::hex_dump, LoadOptions, Registry};

#[derive(Args)]
pub struct DumpArgs {
    /// Dump every frame
    #[arg(short, long, default_value_t = false)]
    full: bool,

    /// Skip files that can only be partially loaded
    #[arg(short, long, default_value_t = false)]
    no_force: bool,

    /// Files to dump
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,
}

impl DumpArgs {
    pub fn handle(&self) -> Result<()> {
        let registry = Registry::default();
        let options = LoadOptions::builder().force(!self.no_force).build();

        for file in &self.files {
            let Some(decoded) = super::load_or_warn(&registry, file, &options) else {
                continue;
            };
            let recording = decoded.recording();

            let version = recording
                .version()
                .map_or_else(|| "unknown".to_owned(), |v| v.to_string());
            println!(
                "'{}': Version: {} Length: {}ms Number of frames: {}",
                file.display(),
                version,
                recording.length(),
                recording.frames().len()
            );

            if self.full {
                for (index, frame) in recording.frames().iter().enumerate() {
                    println!(
                        "'{}': Frame: {} Time: {} Length: {}",
                        file.display(),
                        index,
                        frame.time,
                        frame.data.len()
                    );
                    print!("{}", hex_dump(&frame.data));
                }
            }
        }

        Ok(())
    }
}

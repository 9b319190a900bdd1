use std::path::PathBuf;

use clap::Args;
use miette::Result;
use tibia_rec::{
    guess::{normalize_counts, strings, unique_strings},
    LoadOptions, Registry,
};

#[derive(Args)]
pub struct StringsArgs {
    /// Print the name of the file before each string
    #[arg(short = 'f', long, default_value_t = false)]
    print_file_name: bool,

    /// Only print strings at least this long
    #[arg(short, long, default_value_t = 4)]
    min_len: usize,

    /// Skip duplicates, the output is sorted
    #[arg(short, long, default_value_t = false)]
    unique: bool,

    /// Replace the counts in frequent messages, e.g. `You lose X hitpoints`
    #[arg(short, long, default_value_t = false)]
    smart: bool,

    /// Skip files that can only be partially loaded
    #[arg(short, long, default_value_t = false)]
    no_force: bool,

    /// Files to search
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,
}

impl StringsArgs {
    pub fn handle(&self) -> Result<()> {
        let registry = Registry::default();
        let options = LoadOptions::builder().force(!self.no_force).build();

        for file in &self.files {
            let Some(decoded) = super::load_or_warn(&registry, file, &options) else {
                continue;
            };

            let mut found = strings(decoded.recording().frames(), self.min_len);
            if self.smart {
                found = found.iter().map(|s| normalize_counts(s)).collect();
            }
            if self.unique {
                found = unique_strings(found);
            }

            for string in found {
                if self.print_file_name {
                    println!("{}: {}", file.display(), string);
                } else {
                    println!("{string}");
                }
            }
        }

        Ok(())
    }
}

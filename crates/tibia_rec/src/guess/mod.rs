//! Heuristics recovering information a recording does not declare
//!

pub mod playback;
pub mod strings;
pub mod version;
pub mod world;

pub use playback::{highest_playable, PlaybackEngine};
pub use strings::{normalize_counts, strings, unique_strings};
pub use version::{infer_version, scan_version, Milestone, VersionTable};
pub use world::{infer_world, score_worlds, WorldList};

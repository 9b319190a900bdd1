//! Cross-checking a version by playing the recording back

use tracing::debug;

use crate::formats::Source;

/// Something that can replay a recording with the assets of a given client version
///
/// Playback failures are reported with the engine's own error type so they are never confused
/// with decoding errors.
pub trait PlaybackEngine {
    type Error: std::error::Error;

    /// Process every packet of `source` as client `version`
    fn play(&self, source: &Source<'_>, version: u16) -> Result<(), Self::Error>;
}

/// Every candidate `engine` can play `source` with, in the order given
pub fn playable_versions<E: PlaybackEngine>(
    engine: &E,
    source: &Source<'_>,
    candidates: impl IntoIterator<Item = u16>,
) -> Vec<u16> {
    candidates
        .into_iter()
        .filter(|&version| match engine.play(source, version) {
            Ok(()) => true,
            Err(e) => {
                debug!(file = source.name, version, error = %e, "playback failed");
                false
            }
        })
        .collect()
}

/// The newest candidate `engine` can play `source` with
pub fn highest_playable<E: PlaybackEngine>(
    engine: &E,
    source: &Source<'_>,
    candidates: impl IntoIterator<Item = u16>,
) -> Option<u16> {
    playable_versions(engine, source, candidates).into_iter().max()
}

//! Structural diff between the snapshot and the draft.

use rustc_hash::FxHashMap;

use crate::experiment::{Experiment, Track, TrackId};

/// Whether `current` differs from `original` in a way worth a cancel prompt.
///
/// - name, notes and mode must match exactly
/// - tracks pair up by remote id; a paired track must keep its name, and
///   its weighting too when the mode uses weightings
/// - a current track with no partner (including unpersisted ones) is an
///   addition and counts as a change
/// - original tracks missing from `current` do not count: deletions are
///   confirmed and applied remotely on their own
#[must_use]
pub fn has_differences(original: &Experiment, current: &Experiment) -> bool {
    if original.name() != current.name()
        || original.notes() != current.notes()
        || original.mode() != current.mode()
    {
        return true;
    }

    let compare_weightings = current.mode().uses_weightings();
    let originals: FxHashMap<TrackId, &Track> = original
        .tracks()
        .iter()
        .filter_map(|track| track.id().map(|id| (id, track)))
        .collect();

    current.tracks().iter().any(|track| {
        let Some(before) = track.id().and_then(|id| originals.get(&id)) else {
            return true;
        };
        before.name() != track.name()
            || (compare_weightings && before.weighting() != track.weighting())
    })
}

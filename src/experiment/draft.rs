//! Experiment Draft - the mutable working copy of an experiment under edit
//!
//! The draft owns track add/remove/rename primitives and answers local
//! validation queries. It never talks to the network.
//!
//! ## Name uniqueness
//!
//! The remote store keeps track names unique for the lifetime of an
//! experiment, so a candidate name is rejected when any *other* remaining
//! track holds it either as its current name or as the name it was loaded
//! with. A track may always take back its own original name. Names held only
//! by tracks that have since been deleted are free again.
//!
//! ## Renaming
//!
//! At most one track is being renamed at any time; the draft tracks it as
//! `active_edit`. A failed commit behaves like a cancel: the pending name is
//! reset and editing ends.

use super::{AssignmentMode, Experiment, Track, TrackKey};
use crate::ValidationError;

const MAX_WEIGHTING: u32 = 100;
const BALANCED_SUM: u64 = 100;

/// Key presses the rename text box forwards to the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameKey {
    /// Commit the pending name.
    Enter,
    /// Discard the pending name.
    Escape,
    /// Anything else; ignored.
    Other,
}

/// Mutable in-memory experiment plus the current rename target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentDraft {
    experiment: Experiment,
    active_edit: Option<TrackKey>,
}

impl ExperimentDraft {
    /// Start a draft from an experiment (usually a clone of the snapshot).
    #[must_use]
    pub const fn new(experiment: Experiment) -> Self {
        Self {
            experiment,
            active_edit: None,
        }
    }

    /// Get the experiment as currently edited.
    #[must_use]
    pub const fn experiment(&self) -> &Experiment {
        &self.experiment
    }

    /// Consume the draft, returning the edited experiment.
    #[must_use]
    pub fn into_experiment(self) -> Experiment {
        self.experiment
    }

    /// Get the tracks in display order.
    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        self.experiment.tracks()
    }

    /// Get a track by key.
    #[must_use]
    pub fn track(&self, key: TrackKey) -> Option<&Track> {
        self.experiment.track(key)
    }

    /// Number of tracks.
    #[must_use]
    pub fn track_count(&self) -> usize {
        self.experiment.tracks().len()
    }

    /// The track currently being renamed, if any.
    #[must_use]
    pub const fn active_edit(&self) -> Option<TrackKey> {
        self.active_edit
    }

    /// Whether `key` is the track currently being renamed.
    #[must_use]
    pub fn is_editing(&self, key: TrackKey) -> bool {
        self.active_edit == Some(key)
    }

    /// Set the experiment name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.experiment.set_name(name.into());
    }

    /// Set the experiment notes.
    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.experiment.set_notes(notes.into());
    }

    /// Switch the assignment mode.
    ///
    /// Existing weightings are kept; they are simply ignored while the mode
    /// does not use them.
    pub fn set_mode(&mut self, mode: AssignmentMode) {
        self.experiment.set_mode(mode);
    }

    /// Set one track's weighting.
    ///
    /// # Errors
    ///
    /// [`ValidationError::UnknownTrack`] if `key` is not in the draft,
    /// [`ValidationError::WeightOutOfRange`] above 100.
    pub fn set_weighting(
        &mut self,
        key: TrackKey,
        weighting: Option<u32>,
    ) -> Result<(), ValidationError> {
        check_weighting(weighting)?;
        self.track_mut(key)?.set_weighting(weighting);
        Ok(())
    }

    /// Append a new, unpersisted track.
    ///
    /// The weighting is dropped when the mode does not use weightings.
    ///
    /// # Errors
    ///
    /// [`ValidationError::EmptyName`] for a blank name,
    /// [`ValidationError::DuplicateName`] if any track currently holds or
    /// originally held the name, [`ValidationError::WeightOutOfRange`] above 100.
    pub fn add_track(
        &mut self,
        name: impl Into<String>,
        weighting: Option<u32>,
    ) -> Result<TrackKey, ValidationError> {
        let name = name.into();
        if is_blank(&name) {
            return Err(ValidationError::EmptyName);
        }
        if self.name_taken(&name, None) {
            return Err(ValidationError::DuplicateName(name));
        }
        let weighting = if self.experiment.mode().uses_weightings() {
            check_weighting(weighting)?;
            weighting
        } else {
            None
        };

        let track = Track::new(name).with_optional_weighting(weighting);
        let key = track.key();
        self.experiment.tracks_mut().push(track);
        Ok(key)
    }

    /// Remove exactly the track with this key.
    ///
    /// Returns the removed track and the index it occupied, or `None` if no
    /// such track exists. Removing the track being renamed ends the rename.
    pub fn remove_track(&mut self, key: TrackKey) -> Option<(usize, Track)> {
        let index = self.experiment.position(key)?;
        if self.active_edit == Some(key) {
            self.active_edit = None;
        }
        Some((index, self.experiment.tracks_mut().remove(index)))
    }

    /// Put a previously removed track back at `index` (clamped to the end).
    pub fn reinsert(&mut self, index: usize, track: Track) {
        let tracks = self.experiment.tracks_mut();
        let index = index.min(tracks.len());
        tracks.insert(index, track);
    }

    /// Start renaming `key`, ending any other rename.
    ///
    /// # Errors
    ///
    /// [`ValidationError::UnknownTrack`] if `key` is not in the draft.
    pub fn begin_rename(&mut self, key: TrackKey) -> Result<(), ValidationError> {
        self.track_mut(key)?.reset_pending_name();
        self.active_edit = Some(key);
        Ok(())
    }

    /// Update the in-progress name of a track.
    ///
    /// # Errors
    ///
    /// [`ValidationError::UnknownTrack`] if `key` is not in the draft.
    pub fn set_pending_name(
        &mut self,
        key: TrackKey,
        pending: impl Into<String>,
    ) -> Result<(), ValidationError> {
        self.track_mut(key)?.set_pending_name(pending.into());
        Ok(())
    }

    /// Apply the pending name.
    ///
    /// An empty or colliding pending name is discarded as if the rename had
    /// been cancelled, and the violation is returned.
    ///
    /// # Errors
    ///
    /// [`ValidationError::EmptyName`], [`ValidationError::DuplicateName`], or
    /// [`ValidationError::UnknownTrack`].
    pub fn commit_rename(&mut self, key: TrackKey) -> Result<(), ValidationError> {
        let pending = self.track_or_unknown(key)?.pending_name().to_owned();
        let violation = if is_blank(&pending) {
            Some(ValidationError::EmptyName)
        } else if self.name_taken(&pending, Some(key)) {
            Some(ValidationError::DuplicateName(pending))
        } else {
            None
        };

        let track = self.track_mut(key)?;
        match violation {
            Some(_) => track.reset_pending_name(),
            None => track.commit_pending_name(),
        }
        self.end_edit(key);
        violation.map_or(Ok(()), Err)
    }

    /// Discard the pending name and end editing.
    ///
    /// # Errors
    ///
    /// [`ValidationError::UnknownTrack`] if `key` is not in the draft.
    pub fn cancel_rename(&mut self, key: TrackKey) -> Result<(), ValidationError> {
        self.track_mut(key)?.reset_pending_name();
        self.end_edit(key);
        Ok(())
    }

    /// Route a key press from the rename box: Enter commits, Escape cancels.
    ///
    /// # Errors
    ///
    /// Whatever [`Self::commit_rename`] or [`Self::cancel_rename`] return.
    pub fn handle_rename_key(
        &mut self,
        key: TrackKey,
        press: RenameKey,
    ) -> Result<(), ValidationError> {
        match press {
            RenameKey::Enter => self.commit_rename(key),
            RenameKey::Escape => self.cancel_rename(key),
            RenameKey::Other => Ok(()),
        }
    }

    /// Sum of all weightings, counting missing ones as 0.
    #[must_use]
    pub fn weight_sum(&self) -> u64 {
        self.tracks()
            .iter()
            .map(|track| u64::from(track.weighting().unwrap_or(0)))
            .sum()
    }

    /// Replace missing weightings with 0 in weighted mode.
    pub fn normalize_weightings(&mut self) {
        if !self.experiment.mode().uses_weightings() {
            return;
        }
        for track in self.experiment.tracks_mut() {
            if track.weighting().is_none() {
                track.set_weighting(Some(0));
            }
        }
    }

    /// Whether the draft can be submitted as far as weightings go.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        !self.experiment.mode().uses_weightings() || self.weight_sum() == BALANCED_SUM
    }

    /// The share each track gets in uniform-random mode, `round(100 / n)`.
    ///
    /// `None` when there are no tracks.
    #[must_use]
    pub fn uniform_share_percent(&self) -> Option<u32> {
        let count = u32::try_from(self.track_count()).ok()?;
        if count == 0 {
            return None;
        }
        // round-half-up of 100 / count in integer arithmetic
        Some((200 + count) / (2 * count))
    }

    fn name_taken(&self, candidate: &str, except: Option<TrackKey>) -> bool {
        self.tracks()
            .iter()
            .filter(|track| Some(track.key()) != except)
            .any(|track| track.holds_name(candidate))
    }

    fn end_edit(&mut self, key: TrackKey) {
        if self.active_edit == Some(key) {
            self.active_edit = None;
        }
    }

    fn track_or_unknown(&self, key: TrackKey) -> Result<&Track, ValidationError> {
        self.experiment
            .track(key)
            .ok_or(ValidationError::UnknownTrack(key))
    }

    fn track_mut(&mut self, key: TrackKey) -> Result<&mut Track, ValidationError> {
        self.experiment
            .track_mut(key)
            .ok_or(ValidationError::UnknownTrack(key))
    }
}

fn is_blank(name: &str) -> bool {
    name.trim().is_empty()
}

const fn check_weighting(weighting: Option<u32>) -> Result<(), ValidationError> {
    match weighting {
        Some(w) if w > MAX_WEIGHTING => Err(ValidationError::WeightOutOfRange(w)),
        _ => Ok(()),
    }
}

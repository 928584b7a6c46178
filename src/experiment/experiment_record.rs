//! Experiment - root entity being edited

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Track, TrackKey};

/// Identifier assigned to an experiment by the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExperimentId(u64);

impl ExperimentId {
    /// Wrap a remote experiment identifier.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ExperimentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// How users are assigned to tracks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentMode {
    /// Track weightings are supplied by the user and must total 100.
    #[default]
    Weighted,
    /// Every track gets an equal share; weightings are ignored.
    UniformRandom,
    /// Assignments come from an uploaded spreadsheet; weightings are ignored.
    CsvUpload,
}

impl AssignmentMode {
    /// Whether per-track weightings are meaningful in this mode.
    #[must_use]
    pub const fn uses_weightings(self) -> bool {
        matches!(self, Self::Weighted)
    }
}

/// An experiment and its ordered tracks.
///
/// Track order is only meaningful for display; tracks are identified by
/// their remote id when comparing against a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Experiment {
    id: Option<ExperimentId>,
    name: String,
    notes: String,
    mode: AssignmentMode,
    tracks: Vec<Track>,
}

impl Experiment {
    /// Create a new, not yet persisted experiment with no tracks.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            notes: String::new(),
            mode: AssignmentMode::default(),
            tracks: Vec::new(),
        }
    }

    /// Create a builder for constructing an experiment with optional fields.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ExperimentBuilder {
        ExperimentBuilder::new(name)
    }

    /// Get the remote identifier, if the experiment exists remotely.
    #[must_use]
    pub const fn id(&self) -> Option<ExperimentId> {
        self.id
    }

    /// Get the experiment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the free-text notes.
    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Get the assignment mode.
    #[must_use]
    pub const fn mode(&self) -> AssignmentMode {
        self.mode
    }

    /// Get the tracks in display order.
    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Get a track by its local key.
    #[must_use]
    pub fn track(&self, key: TrackKey) -> Option<&Track> {
        self.tracks.iter().find(|track| track.key() == key)
    }

    pub(crate) fn position(&self, key: TrackKey) -> Option<usize> {
        self.tracks.iter().position(|track| track.key() == key)
    }

    pub(crate) fn track_mut(&mut self, key: TrackKey) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|track| track.key() == key)
    }

    pub(crate) fn tracks_mut(&mut self) -> &mut Vec<Track> {
        &mut self.tracks
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_notes(&mut self, notes: String) {
        self.notes = notes;
    }

    pub(crate) fn set_mode(&mut self, mode: AssignmentMode) {
        self.mode = mode;
    }
}

/// Builder for `Experiment`.
#[derive(Debug)]
pub struct ExperimentBuilder {
    id: Option<ExperimentId>,
    name: String,
    notes: String,
    mode: AssignmentMode,
    tracks: Vec<Track>,
}

impl ExperimentBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            notes: String::new(),
            mode: AssignmentMode::default(),
            tracks: Vec::new(),
        }
    }

    /// Set the remote identifier (the experiment already exists remotely).
    #[must_use]
    pub const fn id(mut self, id: ExperimentId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the notes.
    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Set the assignment mode.
    #[must_use]
    pub const fn mode(mut self, mode: AssignmentMode) -> Self {
        self.mode = mode;
        self
    }

    /// Append a track.
    #[must_use]
    pub fn track(mut self, track: Track) -> Self {
        self.tracks.push(track);
        self
    }

    /// Append several tracks.
    #[must_use]
    pub fn tracks(mut self, tracks: impl IntoIterator<Item = Track>) -> Self {
        self.tracks.extend(tracks);
        self
    }

    /// Build the `Experiment`.
    #[must_use]
    pub fn build(self) -> Experiment {
        Experiment {
            id: self.id,
            name: self.name,
            notes: self.notes,
            mode: self.mode,
            tracks: self.tracks,
        }
    }
}

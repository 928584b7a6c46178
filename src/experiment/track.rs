//! Track - one weighted branch of an experiment

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_TRACK_KEY: AtomicU64 = AtomicU64::new(1);

/// Local surrogate key identifying a track instance inside a draft.
///
/// Keys are allocated when a track value is created and survive cloning, so
/// a draft cloned from a snapshot refers to the same tracks by the same keys.
/// Two tracks with identical field values still have distinct keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackKey(u64);

impl TrackKey {
    fn next() -> Self {
        Self(NEXT_TRACK_KEY.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw key value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TrackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "track#{}", self.0)
    }
}

/// Identifier assigned to a track by the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(u64);

impl TrackId {
    /// Wrap a remote track identifier.
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

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A single track of an experiment.
///
/// Tracks without an `id` exist only in the local draft. Persisted tracks
/// remember the name they were loaded with (`original_name`), since the
/// remote store keeps track names unique for the experiment's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    key: TrackKey,
    id: Option<TrackId>,
    name: String,
    weighting: Option<u32>,
    pending_name: String,
    original_name: Option<String>,
    delete_ref: Option<String>,
}

impl Track {
    /// Create an unpersisted track with no weighting.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            key: TrackKey::next(),
            id: None,
            pending_name: name.clone(),
            name,
            weighting: None,
            original_name: None,
            delete_ref: None,
        }
    }

    /// Create a track that the remote store already knows about.
    ///
    /// The given name is also recorded as the track's original name.
    #[must_use]
    pub fn persisted(id: TrackId, name: impl Into<String>) -> Self {
        let mut track = Self::new(name);
        track.id = Some(id);
        track.original_name = Some(track.name.clone());
        track
    }

    /// Set the weighting percentage.
    #[must_use]
    pub const fn with_weighting(mut self, weighting: u32) -> Self {
        self.weighting = Some(weighting);
        self
    }

    /// Set an optional weighting percentage.
    #[must_use]
    pub const fn with_optional_weighting(mut self, weighting: Option<u32>) -> Self {
        self.weighting = weighting;
        self
    }

    /// Set the reference used to delete this track remotely.
    #[must_use]
    pub fn with_delete_ref(mut self, delete_ref: impl Into<String>) -> Self {
        self.delete_ref = Some(delete_ref.into());
        self
    }

    /// Get the local surrogate key.
    #[must_use]
    pub const fn key(&self) -> TrackKey {
        self.key
    }

    /// Get the remote identifier, if the track is persisted.
    #[must_use]
    pub const fn id(&self) -> Option<TrackId> {
        self.id
    }

    /// Whether the remote store has confirmed this track.
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Get the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the weighting percentage, if set.
    #[must_use]
    pub const fn weighting(&self) -> Option<u32> {
        self.weighting
    }

    /// Get the in-progress name while renaming.
    #[must_use]
    pub fn pending_name(&self) -> &str {
        &self.pending_name
    }

    /// Get the name this track had in the remote store when editing began.
    #[must_use]
    pub fn original_name(&self) -> Option<&str> {
        self.original_name.as_deref()
    }

    /// Get the reference for the remote delete call.
    ///
    /// Falls back to the remote id when the server supplied no explicit
    /// reference. Unpersisted tracks have none.
    #[must_use]
    pub fn delete_ref(&self) -> Option<String> {
        self.id?;
        self.delete_ref
            .clone()
            .or_else(|| self.id.map(|id| id.to_string()))
    }

    /// Whether `candidate` equals this track's current or original name.
    #[must_use]
    pub fn holds_name(&self, candidate: &str) -> bool {
        self.name == candidate || self.original_name.as_deref() == Some(candidate)
    }

    pub(crate) fn set_weighting(&mut self, weighting: Option<u32>) {
        self.weighting = weighting;
    }

    pub(crate) fn set_pending_name(&mut self, pending: String) {
        self.pending_name = pending;
    }

    pub(crate) fn reset_pending_name(&mut self) {
        self.pending_name.clone_from(&self.name);
    }

    pub(crate) fn commit_pending_name(&mut self) {
        self.name.clone_from(&self.pending_name);
    }
}

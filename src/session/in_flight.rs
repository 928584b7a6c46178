//! Bookkeeping for a remote call that is in flight.

use crate::experiment::{ExperimentDraft, Track};

use super::SessionState;

/// Holds the session busy for the duration of one remote call.
///
/// Dropping the guard returns the session to [`SessionState::Editing`] and
/// puts back an optimistically removed track, so a call that fails or whose
/// future is dropped mid-flight leaves the draft as it was before.
/// [`InFlight::commit`] keeps the removal.
pub(super) struct InFlight<'a> {
    state: &'a mut SessionState,
    draft: &'a mut ExperimentDraft,
    removed: Option<(usize, Track)>,
}

impl<'a> InFlight<'a> {
    pub(super) fn begin(
        state: &'a mut SessionState,
        draft: &'a mut ExperimentDraft,
        busy: SessionState,
        removed: Option<(usize, Track)>,
    ) -> Self {
        *state = busy;
        Self {
            state,
            draft,
            removed,
        }
    }

    /// The call succeeded; the removal stands.
    pub(super) fn commit(mut self) {
        self.removed = None;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some((index, track)) = self.removed.take() {
            self.draft.reinsert(index, track);
        }
        *self.state = SessionState::Editing;
    }
}

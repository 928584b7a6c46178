//! Experiment Edit Session - coordinates a draft with the remote store
//!
//! The session owns the [`ExperimentDraft`] exclusively, keeps the snapshot
//! the edit started from, and is the only place that talks to the
//! collaborators in [`crate::transport`].
//!
//! ## State machine
//!
//! ```text
//!            request_submit + submit
//! Editing ──────────────────────────> Submitting ──ok──> NavigatedAway
//!    ^  │                                   │
//!    │  │ delete_track (confirmed)          └──err──> Editing
//!    │  └──────────────> Deleting ──ok / err (rolled back)──> Editing
//!    │
//!    └── cancel (clean or confirmed) ──> NavigatedAway   (terminal)
//! ```
//!
//! While a remote call is outstanding every other operation fails with
//! [`Error::Busy`]; after navigation every operation fails with
//! [`Error::SessionClosed`].

mod attempt;
mod diff;
mod in_flight;

pub use attempt::{RemoteAttempt, RemoteOperation};
pub use diff::has_differences;

use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::experiment::{Experiment, ExperimentDraft, ExperimentPayload, TrackKey};
use crate::transport::{ConfirmPrompt, Navigator, RemoteTransport};
use crate::{Error, Result, ValidationError};

use in_flight::InFlight;

const UNSAVED_CHANGES_PROMPT: &str = "You have unsaved changes. Are you sure you want to cancel?";

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accepting edits.
    Editing,
    /// A create/update call is in flight.
    Submitting,
    /// A delete call for this track is in flight.
    Deleting(TrackKey),
    /// The user left the page; terminal.
    NavigatedAway,
}

/// What a session operation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Validation passed and the user confirmed; call `submit` next.
    ReadyToSubmit,
    /// The user answered "no" to a confirmation; nothing changed.
    Declined,
    /// The track is gone from the draft (and from the store when `remote`).
    TrackRemoved {
        /// Key of the removed track
        key: TrackKey,
        /// Whether a remote delete was performed
        remote: bool,
    },
    /// The session ended and navigated to `destination`.
    NavigatedAway {
        /// URL navigated to
        destination: String,
    },
}

/// Edit session over one experiment.
///
/// Generic over its collaborators; tests and demos use the in-memory ones
/// from [`crate::transport`].
#[derive(Debug)]
pub struct ExperimentEditSession<T, P, N> {
    snapshot: Experiment,
    draft: ExperimentDraft,
    transport: T,
    prompt: P,
    navigator: N,
    config: EditorConfig,
    state: SessionState,
    submit_confirmed: bool,
    attempts: Vec<RemoteAttempt>,
}

impl<T, P, N> ExperimentEditSession<T, P, N>
where
    T: RemoteTransport,
    P: ConfirmPrompt,
    N: Navigator,
{
    /// Start editing `snapshot`; the draft begins as an identical copy.
    #[must_use]
    pub fn new(
        snapshot: Experiment,
        transport: T,
        prompt: P,
        navigator: N,
        config: EditorConfig,
    ) -> Self {
        let draft = ExperimentDraft::new(snapshot.clone());
        Self {
            snapshot,
            draft,
            transport,
            prompt,
            navigator,
            config,
            state: SessionState::Editing,
            submit_confirmed: false,
            attempts: Vec::new(),
        }
    }

    /// Get the immutable snapshot the edit started from.
    #[must_use]
    pub const fn snapshot(&self) -> &Experiment {
        &self.snapshot
    }

    /// Get the draft for reading.
    #[must_use]
    pub const fn draft(&self) -> &ExperimentDraft {
        &self.draft
    }

    /// Get the draft for editing.
    ///
    /// Any confirmed-but-unsent submission must be confirmed again afterwards.
    ///
    /// # Errors
    ///
    /// [`Error::Busy`] while a remote call is in flight,
    /// [`Error::SessionClosed`] after navigation.
    pub fn draft_mut(&mut self) -> Result<&mut ExperimentDraft> {
        self.ensure_editing()?;
        self.submit_confirmed = false;
        Ok(&mut self.draft)
    }

    /// Get the session configuration.
    #[must_use]
    pub const fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Get the remote transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Get the confirmation prompt.
    #[must_use]
    pub const fn prompt(&self) -> &P {
        &self.prompt
    }

    /// Get the navigator.
    #[must_use]
    pub const fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Get the current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Whether a submit is in flight (the submit button should be disabled).
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.state == SessionState::Submitting
    }

    /// Whether a delete of `key` is in flight.
    #[must_use]
    pub fn is_deleting(&self, key: TrackKey) -> bool {
        self.state == SessionState::Deleting(key)
    }

    /// Whether the session has navigated away.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state == SessionState::NavigatedAway
    }

    /// Every remote call issued so far, oldest first.
    #[must_use]
    pub fn attempts(&self) -> &[RemoteAttempt] {
        &self.attempts
    }

    /// The payload `submit` would send for the current draft.
    #[must_use]
    pub fn payload(&self) -> ExperimentPayload {
        self.draft.experiment().to_payload()
    }

    /// Whether the draft differs from the snapshot.
    ///
    /// See [`has_differences`] for the rules; deleted tracks do not count.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        has_differences(&self.snapshot, self.draft.experiment())
    }

    /// Validate the draft and ask the user to confirm the submission.
    ///
    /// Nothing is sent here. A confirmed request arms [`Self::submit`].
    ///
    /// # Errors
    ///
    /// [`ValidationError::MissingName`] for an unnamed experiment,
    /// [`ValidationError::WeightMismatch`] with the actual sum when weighted
    /// tracks do not total 100, the length errors when
    /// [`EditorConfig::enforce_limits_locally`] is set, and
    /// [`Error::Busy`]/[`Error::SessionClosed`] outside of editing.
    pub fn request_submit(&mut self) -> Result<Outcome> {
        self.ensure_editing()?;
        self.submit_confirmed = false;
        if let Err(err) = self.validate_for_submit() {
            debug!(error = %err, "submission blocked by validation");
            return Err(err.into());
        }

        let experiment = self.draft.experiment();
        let message = format!(
            "Save experiment \"{}\" with {} track(s)?",
            experiment.name(),
            experiment.tracks().len()
        );
        if !self.prompt.confirm(&message) {
            return Ok(Outcome::Declined);
        }
        self.submit_confirmed = true;
        Ok(Outcome::ReadyToSubmit)
    }

    /// Send the whole draft to the remote store.
    ///
    /// Creates the experiment when it has no remote id, updates it
    /// otherwise. Missing weightings are sent as 0 in weighted mode; the draft
    /// itself is not changed. Success ends the session by navigating to the
    /// parent page; failure, or dropping the future before it completes,
    /// returns to editing with the draft untouched.
    ///
    /// # Errors
    ///
    /// [`Error::SubmitNotConfirmed`] without a confirmed
    /// [`Self::request_submit`], [`Error::SubmitRejected`] when the store
    /// refuses (retryable), [`Error::Busy`]/[`Error::SessionClosed`] outside
    /// of editing.
    pub async fn submit(&mut self) -> Result<Outcome> {
        self.ensure_editing()?;
        if !std::mem::take(&mut self.submit_confirmed) {
            return Err(Error::SubmitNotConfirmed);
        }

        let mut payload = self.draft.experiment().to_payload();
        if payload.mode.uses_weightings() {
            for track in &mut payload.tracks {
                track.weighting.get_or_insert(0);
            }
        }
        info!(
            experiment = %payload.name,
            tracks = payload.tracks.len(),
            "submitting experiment"
        );

        let guard = InFlight::begin(
            &mut self.state,
            &mut self.draft,
            SessionState::Submitting,
            None,
        );
        let (operation, result) = match payload.id {
            Some(id) => (
                RemoteOperation::UpdateExperiment(id),
                self.transport.update_experiment(id, &payload).await,
            ),
            None => (
                RemoteOperation::CreateExperiment,
                self.transport.create_experiment(&payload).await,
            ),
        };
        drop(guard);
        self.attempts
            .push(RemoteAttempt::new(operation, result.is_ok()));

        match result {
            Ok(()) => {
                info!(experiment = %payload.name, "experiment saved");
                Ok(self.navigate_away())
            }
            Err(source) => {
                warn!(experiment = %payload.name, error = %source, "experiment submission rejected");
                Err(Error::SubmitRejected {
                    name_limit: self.config.name_char_limit,
                    notes_limit: self.config.notes_char_limit,
                    source,
                })
            }
        }
    }

    /// Delete a track.
    ///
    /// Unpersisted tracks are dropped from the draft without prompting or
    /// calling the store. Persisted tracks need confirmation; the track is
    /// then removed optimistically and exactly one remote delete is sent. If
    /// that fails, or the future is dropped before it completes, the track is
    /// put back where it was.
    ///
    /// # Errors
    ///
    /// [`ValidationError::UnknownTrack`] for a key not in the draft,
    /// [`Error::DeleteRejected`] when the store refuses (retryable; the draft
    /// is rolled back), [`Error::Busy`]/[`Error::SessionClosed`] outside of
    /// editing.
    pub async fn delete_track(&mut self, key: TrackKey) -> Result<Outcome> {
        self.ensure_editing()?;
        let track = self
            .draft
            .track(key)
            .ok_or(ValidationError::UnknownTrack(key))?;
        let Some(delete_ref) = track.delete_ref() else {
            self.draft.remove_track(key);
            self.submit_confirmed = false;
            debug!(%key, "removed unpersisted track");
            return Ok(Outcome::TrackRemoved { key, remote: false });
        };
        let name = track.name().to_owned();

        let message = format!(
            "Are you sure you want to delete track \"{name}\"?  \
             This will also delete any URLs associated with that track."
        );
        if !self.prompt.confirm(&message) {
            return Ok(Outcome::Declined);
        }

        // Optimistic removal; the guard puts the track back unless committed.
        let removed = self
            .draft
            .remove_track(key)
            .ok_or(ValidationError::UnknownTrack(key))?;
        self.submit_confirmed = false;
        let guard = InFlight::begin(
            &mut self.state,
            &mut self.draft,
            SessionState::Deleting(key),
            Some(removed),
        );

        let result = self.transport.delete_track(&delete_ref).await;
        self.attempts.push(RemoteAttempt::new(
            RemoteOperation::DeleteTrack { key, delete_ref },
            result.is_ok(),
        ));

        match result {
            Ok(()) => {
                guard.commit();
                info!(track = %name, "track deleted");
                Ok(Outcome::TrackRemoved { key, remote: true })
            }
            Err(source) => {
                drop(guard);
                warn!(track = %name, error = %source, "track delete rejected, restored");
                Err(Error::DeleteRejected { track: name, source })
            }
        }
    }

    /// Leave without saving.
    ///
    /// Navigates immediately when nothing changed; otherwise only after the
    /// user confirms discarding the draft.
    ///
    /// # Errors
    ///
    /// [`Error::Busy`]/[`Error::SessionClosed`] outside of editing.
    pub fn cancel(&mut self) -> Result<Outcome> {
        self.ensure_editing()?;
        if self.has_unsaved_changes() && !self.prompt.confirm(UNSAVED_CHANGES_PROMPT) {
            return Ok(Outcome::Declined);
        }
        info!("edit cancelled");
        Ok(self.navigate_away())
    }

    fn validate_for_submit(&self) -> std::result::Result<(), ValidationError> {
        let experiment = self.draft.experiment();
        if experiment.name().trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        if self.config.enforce_limits_locally {
            let actual = experiment.name().chars().count();
            if actual > self.config.name_char_limit {
                return Err(ValidationError::NameTooLong {
                    actual,
                    limit: self.config.name_char_limit,
                });
            }
            let actual = experiment.notes().chars().count();
            if actual > self.config.notes_char_limit {
                return Err(ValidationError::NotesTooLong {
                    actual,
                    limit: self.config.notes_char_limit,
                });
            }
        }
        if !self.draft.is_balanced() {
            return Err(ValidationError::WeightMismatch(self.draft.weight_sum()));
        }
        Ok(())
    }

    fn ensure_editing(&self) -> Result<()> {
        match self.state {
            SessionState::Editing => Ok(()),
            SessionState::NavigatedAway => Err(Error::SessionClosed),
            SessionState::Submitting | SessionState::Deleting(_) => Err(Error::Busy),
        }
    }

    fn navigate_away(&mut self) -> Outcome {
        self.state = SessionState::NavigatedAway;
        self.submit_confirmed = false;
        let destination = self.config.parent_page.clone();
        self.navigator.navigate_to(&destination);
        Outcome::NavigatedAway { destination }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::{AssignmentMode, ExperimentId, Track, TrackId};
    use crate::transport::{MemoryTransport, RecordingNavigator, ScriptedPrompt};

    type TestSession = ExperimentEditSession<MemoryTransport, ScriptedPrompt, RecordingNavigator>;

    fn session(snapshot: Experiment, answer: bool) -> TestSession {
        ExperimentEditSession::new(
            snapshot,
            MemoryTransport::new(),
            ScriptedPrompt::always(answer),
            RecordingNavigator::new(),
            EditorConfig::with_parent_page("/parent"),
        )
    }

    fn persisted_snapshot() -> Experiment {
        Experiment::builder("Exp")
            .id(ExperimentId::new(9))
            .track(Track::persisted(TrackId::new(1), "A").with_weighting(50))
            .track(Track::persisted(TrackId::new(2), "B").with_weighting(50))
            .build()
    }

    #[test]
    fn test_new_session_is_clean() {
        let session = session(persisted_snapshot(), true);
        assert_eq!(session.state(), SessionState::Editing);
        assert!(!session.has_unsaved_changes());
        assert!(!session.has_unsaved_changes());
        assert_eq!(session.draft().experiment(), session.snapshot());
    }

    #[test]
    fn test_request_submit_missing_name() {
        let mut session = session(Experiment::new(""), true);
        let err = session.request_submit().unwrap_err();
        assert_eq!(err.as_validation(), Some(&ValidationError::MissingName));
        assert_eq!(session.prompt().times_asked(), 0);
    }

    #[test]
    fn test_request_submit_enforces_limits_when_configured() {
        let mut session = ExperimentEditSession::new(
            Experiment::new("x".repeat(251)),
            MemoryTransport::new(),
            ScriptedPrompt::always(true),
            RecordingNavigator::new(),
            EditorConfig {
                enforce_limits_locally: true,
                ..EditorConfig::default()
            },
        );
        let err = session.request_submit().unwrap_err();
        assert_eq!(
            err.as_validation(),
            Some(&ValidationError::NameTooLong {
                actual: 251,
                limit: 250
            })
        );
    }

    #[tokio::test]
    async fn test_submit_requires_confirmation() {
        let mut session = session(persisted_snapshot(), false);
        assert_eq!(session.request_submit().unwrap(), Outcome::Declined);
        assert!(matches!(
            session.submit().await,
            Err(Error::SubmitNotConfirmed)
        ));
        assert_eq!(session.transport().submit_calls(), 0);
    }

    #[tokio::test]
    async fn test_draft_mut_disarms_submit() {
        let mut session = session(persisted_snapshot(), true);
        assert_eq!(session.request_submit().unwrap(), Outcome::ReadyToSubmit);
        session.draft_mut().unwrap().set_notes("late edit");
        assert!(matches!(
            session.submit().await,
            Err(Error::SubmitNotConfirmed)
        ));
    }

    #[tokio::test]
    async fn test_submit_updates_existing_experiment() {
        let mut session = session(persisted_snapshot(), true);
        session.request_submit().unwrap();
        let outcome = session.submit().await.unwrap();

        assert_eq!(
            outcome,
            Outcome::NavigatedAway {
                destination: "/parent".into()
            }
        );
        assert!(session.is_closed());
        assert_eq!(
            session.attempts()[0].operation(),
            &RemoteOperation::UpdateExperiment(ExperimentId::new(9))
        );
        assert!(session.transport().experiment(ExperimentId::new(9)).is_some());
        assert_eq!(session.navigator().visited(), vec!["/parent"]);
    }

    #[tokio::test]
    async fn test_submit_normalizes_missing_weightings() {
        let snapshot = Experiment::builder("Exp")
            .track(Track::new("A").with_weighting(100))
            .track(Track::new("B"))
            .build();
        let mut session = session(snapshot, true);
        session.request_submit().unwrap();
        session.submit().await.unwrap();

        let stored = session.transport().experiment(ExperimentId::new(1)).unwrap();
        assert_eq!(stored.tracks[1].weighting, Some(0));
        assert_eq!(session.draft().tracks()[1].weighting(), None);
    }

    #[tokio::test]
    async fn test_rejected_submit_leaves_missing_weightings_clean() {
        let snapshot = Experiment::builder("Exp")
            .id(ExperimentId::new(9))
            .track(Track::persisted(TrackId::new(1), "A").with_weighting(100))
            .track(Track::persisted(TrackId::new(2), "B"))
            .build();
        let mut session = session(snapshot, true);
        session.transport().fail_next_submits(1);
        session.request_submit().unwrap();

        assert!(matches!(
            session.submit().await,
            Err(Error::SubmitRejected { .. })
        ));
        assert_eq!(session.state(), SessionState::Editing);
        assert!(!session.has_unsaved_changes());
    }

    #[tokio::test]
    async fn test_closed_session_rejects_everything() {
        let mut session = session(persisted_snapshot(), true);
        session.cancel().unwrap();

        assert!(matches!(session.cancel(), Err(Error::SessionClosed)));
        assert!(matches!(session.draft_mut(), Err(Error::SessionClosed)));
        assert!(matches!(session.request_submit(), Err(Error::SessionClosed)));
        let key = session.draft().tracks()[0].key();
        assert!(matches!(
            session.delete_track(key).await,
            Err(Error::SessionClosed)
        ));
    }

    #[test]
    fn test_cancel_with_changes_declined() {
        let mut session = session(persisted_snapshot(), false);
        session.draft_mut().unwrap().set_mode(AssignmentMode::UniformRandom);

        assert_eq!(session.cancel().unwrap(), Outcome::Declined);
        assert_eq!(session.state(), SessionState::Editing);
        assert_eq!(
            session.prompt().asked(),
            vec![UNSAVED_CHANGES_PROMPT.to_owned()]
        );
        assert!(session.navigator().visited().is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_track() {
        let mut session = session(persisted_snapshot(), true);
        let stray = Track::new("stray").key();
        let err = session.delete_track(stray).await.unwrap_err();
        assert_eq!(
            err.as_validation(),
            Some(&ValidationError::UnknownTrack(stray))
        );
    }
}

//! In-memory collaborators using `DashMap`.
//!
//! [`MemoryTransport`] stands in for the remote store: it keeps submitted
//! experiments, enforces the store's uniqueness and length rules, records
//! every call, and can be told to fail the next N submits or deletes.
//! [`ScriptedPrompt`] and [`RecordingNavigator`] answer and record the UI side.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
#[cfg(feature = "tokio")]
use std::time::Duration;

use dashmap::{DashMap, DashSet};

use super::{ConfirmPrompt, Navigator, RemoteError, RemoteTransport};
use crate::config::{DEFAULT_NAME_CHAR_LIMIT, DEFAULT_NOTES_CHAR_LIMIT};
use crate::experiment::{ExperimentId, ExperimentPayload};

/// One call received by a [`MemoryTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    /// `create_experiment` with the submitted name
    Create(String),
    /// `update_experiment`
    Update(ExperimentId),
    /// `delete_track` with the delete reference
    DeleteTrack(String),
}

/// Remote store backed by concurrent hash maps.
///
/// # Example
///
/// ```rust
/// use track_editor::experiment::Experiment;
/// use track_editor::transport::{MemoryTransport, RemoteTransport};
///
/// # async fn example() {
/// let transport = MemoryTransport::new();
/// transport.fail_next_submits(1);
/// let payload = Experiment::new("Exp").to_payload();
/// assert!(transport.create_experiment(&payload).await.is_err());
/// assert!(transport.create_experiment(&payload).await.is_ok());
/// # }
/// ```
#[derive(Debug)]
pub struct MemoryTransport {
    experiments: DashMap<ExperimentId, ExperimentPayload>,
    deleted_refs: DashSet<String>,
    calls: Mutex<Vec<TransportCall>>,
    next_id: AtomicU64,
    failing_submits: AtomicUsize,
    failing_deletes: AtomicUsize,
    #[cfg(feature = "tokio")]
    latency: Option<Duration>,
}

impl MemoryTransport {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            experiments: DashMap::new(),
            deleted_refs: DashSet::new(),
            calls: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            failing_submits: AtomicUsize::new(0),
            failing_deletes: AtomicUsize::new(0),
            #[cfg(feature = "tokio")]
            latency: None,
        }
    }

    /// Delay every call by `latency`, like a slow network.
    #[cfg(feature = "tokio")]
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Store an existing experiment, e.g. one the session will edit.
    pub fn seed(&self, id: ExperimentId, payload: ExperimentPayload) {
        self.next_id.fetch_max(id.get() + 1, Ordering::Relaxed);
        self.experiments.insert(id, payload);
    }

    /// Make the next `count` create/update calls fail.
    pub fn fail_next_submits(&self, count: usize) {
        self.failing_submits.store(count, Ordering::SeqCst);
    }

    /// Make the next `count` delete calls fail.
    pub fn fail_next_deletes(&self, count: usize) {
        self.failing_deletes.store(count, Ordering::SeqCst);
    }

    /// All calls received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<TransportCall> {
        self.lock_calls().clone()
    }

    /// Number of create/update calls received.
    #[must_use]
    pub fn submit_calls(&self) -> usize {
        self.lock_calls()
            .iter()
            .filter(|call| matches!(call, TransportCall::Create(_) | TransportCall::Update(_)))
            .count()
    }

    /// Number of delete calls received.
    #[must_use]
    pub fn delete_calls(&self) -> usize {
        self.lock_calls()
            .iter()
            .filter(|call| matches!(call, TransportCall::DeleteTrack(_)))
            .count()
    }

    /// Stored experiment by id.
    #[must_use]
    pub fn experiment(&self, id: ExperimentId) -> Option<ExperimentPayload> {
        self.experiments.get(&id).map(|entry| entry.value().clone())
    }

    /// Number of stored experiments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    /// Whether no experiments are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }

    /// Whether a delete for this reference succeeded.
    #[must_use]
    pub fn was_deleted(&self, delete_ref: &str) -> bool {
        self.deleted_refs.contains(delete_ref)
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<TransportCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: TransportCall) {
        self.lock_calls().push(call);
    }

    #[cfg(feature = "tokio")]
    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    #[cfg(not(feature = "tokio"))]
    #[allow(clippy::unused_async)]
    async fn simulate_latency(&self) {}

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn check_payload(
        &self,
        id: Option<ExperimentId>,
        payload: &ExperimentPayload,
    ) -> Result<(), RemoteError> {
        if payload.name.chars().count() > DEFAULT_NAME_CHAR_LIMIT
            || payload.notes.chars().count() > DEFAULT_NOTES_CHAR_LIMIT
        {
            return Err(RemoteError::Rejected("field too long".into()));
        }
        let duplicate = self
            .experiments
            .iter()
            .any(|entry| Some(*entry.key()) != id && entry.value().name == payload.name);
        if duplicate {
            return Err(RemoteError::Rejected("duplicate experiment name".into()));
        }
        Ok(())
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteTransport for MemoryTransport {
    async fn create_experiment(&self, payload: &ExperimentPayload) -> Result<(), RemoteError> {
        self.record(TransportCall::Create(payload.name.clone()));
        self.simulate_latency().await;
        if Self::take_failure(&self.failing_submits) {
            return Err(RemoteError::Unavailable("scripted failure".into()));
        }
        self.check_payload(None, payload)?;

        let id = ExperimentId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut stored = payload.clone();
        stored.id = Some(id);
        self.experiments.insert(id, stored);
        Ok(())
    }

    async fn update_experiment(
        &self,
        id: ExperimentId,
        payload: &ExperimentPayload,
    ) -> Result<(), RemoteError> {
        self.record(TransportCall::Update(id));
        self.simulate_latency().await;
        if Self::take_failure(&self.failing_submits) {
            return Err(RemoteError::Unavailable("scripted failure".into()));
        }
        self.check_payload(Some(id), payload)?;
        self.experiments.insert(id, payload.clone());
        Ok(())
    }

    async fn delete_track(&self, delete_ref: &str) -> Result<(), RemoteError> {
        self.record(TransportCall::DeleteTrack(delete_ref.to_owned()));
        self.simulate_latency().await;
        if Self::take_failure(&self.failing_deletes) {
            return Err(RemoteError::Unavailable("scripted failure".into()));
        }
        // Deleting an already deleted track is not an error.
        self.deleted_refs.insert(delete_ref.to_owned());
        Ok(())
    }
}

/// Prompt that replays scripted answers and records every question.
#[derive(Debug)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<bool>>,
    fallback: bool,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    /// Answer every question with `answer`.
    #[must_use]
    pub const fn always(answer: bool) -> Self {
        Self {
            answers: Mutex::new(VecDeque::new()),
            fallback: answer,
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Answer with `answers` in order, then with `fallback`.
    #[must_use]
    pub fn script(answers: impl IntoIterator<Item = bool>, fallback: bool) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            fallback,
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Every message asked so far.
    #[must_use]
    pub fn asked(&self) -> Vec<String> {
        self.asked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of questions asked so far.
    #[must_use]
    pub fn times_asked(&self) -> usize {
        self.asked.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl ConfirmPrompt for ScriptedPrompt {
    fn confirm(&self, message: &str) -> bool {
        self.asked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_owned());
        self.answers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(self.fallback)
    }
}

/// Navigator that only remembers where it was sent.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    /// Create a navigator with no history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every URL navigated to, in order.
    #[must_use]
    pub fn visited(&self) -> Vec<String> {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate_to(&self, url: &str) {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_owned());
    }
}

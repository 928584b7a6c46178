//! Remote Attempt - log entry for every call a session sends to the store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::experiment::{ExperimentId, TrackKey};

/// Which remote operation was attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteOperation {
    /// Experiment created from the draft.
    CreateExperiment,
    /// Existing experiment replaced by the draft.
    UpdateExperiment(ExperimentId),
    /// Persisted track deleted.
    DeleteTrack {
        /// Local key of the track
        key: TrackKey,
        /// Reference passed to the store
        delete_ref: String,
    },
}

/// One remote call and how it ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAttempt {
    operation: RemoteOperation,
    recorded_at: DateTime<Utc>,
    succeeded: bool,
}

impl RemoteAttempt {
    pub(crate) fn new(operation: RemoteOperation, succeeded: bool) -> Self {
        Self {
            operation,
            recorded_at: Utc::now(),
            succeeded,
        }
    }

    /// Get the attempted operation.
    #[must_use]
    pub const fn operation(&self) -> &RemoteOperation {
        &self.operation
    }

    /// Get the time the outcome was recorded.
    #[must_use]
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    /// Whether the store accepted the call.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.succeeded
    }
}

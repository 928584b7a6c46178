//! Error types for Track-Editor
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)

use thiserror::Error;

use crate::experiment::TrackKey;
use crate::transport::RemoteError;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Problems detected locally, before anything is sent to the remote store.
///
/// A validation failure never leaves the draft half-mutated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A track name was empty or blank
    #[error("Track name is empty\nEnter a name for the track")]
    EmptyName,

    /// A track name collides with another track's current or original name
    #[error(
        "Sorry, there is already another track named \"{0}\". \
         Each track in an experiment must have a unique name."
    )]
    DuplicateName(String),

    /// Weighted experiment whose track weightings do not add up to 100
    #[error("The weights need to add up to 100%.  They currently add up to {0}%.")]
    WeightMismatch(u64),

    /// A single weighting outside of `[0, 100]`
    #[error("Track weighting {0}% is out of range\nWeightings are percentages between 0 and 100")]
    WeightOutOfRange(u32),

    /// Experiment has no name
    #[error("Experiment name is required")]
    MissingName,

    /// Experiment name exceeds the configured limit
    #[error("Experiment name is {actual} characters long; the limit is {limit}")]
    NameTooLong {
        /// Character count of the submitted name
        actual: usize,
        /// Configured maximum
        limit: usize,
    },

    /// Experiment notes exceed the configured limit
    #[error("Experiment notes are {actual} characters long; the limit is {limit}")]
    NotesTooLong {
        /// Character count of the submitted notes
        actual: usize,
        /// Configured maximum
        limit: usize,
    },

    /// No track with this key exists in the draft
    #[error("Unknown track {0}")]
    UnknownTrack(TrackKey),
}

/// Track-Editor error types
#[derive(Error, Debug)]
pub enum Error {
    /// Local validation failed; nothing was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Remote store rejected the experiment submission
    #[error(
        "Sorry, an error occurred when submitting the form. Please make sure that the \
         experiment name is unique and under {name_limit} characters and that notes are \
         less than {notes_limit} characters."
    )]
    SubmitRejected {
        /// Configured name limit quoted in the message
        name_limit: usize,
        /// Configured notes limit quoted in the message
        notes_limit: usize,
        /// Opaque transport failure
        #[source]
        source: RemoteError,
    },

    /// Remote store rejected a track deletion; the draft was rolled back
    #[error("An error occurred while deleting track \"{track}\". Please try again.")]
    DeleteRejected {
        /// Name of the track that was restored
        track: String,
        /// Opaque transport failure
        #[source]
        source: RemoteError,
    },

    /// A remote operation is still in flight
    #[error("Another operation is still in progress\nWait for it to finish before retrying")]
    Busy,

    /// The session already navigated away
    #[error("Edit session is closed; no further changes are possible")]
    SessionClosed,

    /// `submit` was called without a confirmed `request_submit`
    #[error("Submission has not been confirmed\nCall request_submit and confirm first")]
    SubmitNotConfirmed,

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration file could not be parsed
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the user can simply try the same operation again.
    ///
    /// Remote rejections are retryable; the session is back in editing and
    /// the draft matches the last confirmed remote state.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::SubmitRejected { .. } | Self::DeleteRejected { .. } | Self::Busy
        )
    }

    /// The validation failure behind this error, if any.
    #[must_use]
    pub const fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

//! Collaborators the edit session talks to
//!
//! - [`RemoteTransport`]: the remote store (create/update experiment, delete track)
//! - [`ConfirmPrompt`]: a blocking yes/no question to the user
//! - [`Navigator`]: leaves the edit page
//!
//! Remote failures are opaque: the store returns no structured reason.
//!
//! # Example
//!
//! ```rust
//! use track_editor::experiment::Experiment;
//! use track_editor::transport::{MemoryTransport, RemoteTransport};
//!
//! # async fn example() -> Result<(), track_editor::transport::RemoteError> {
//! let transport = MemoryTransport::new();
//! let payload = Experiment::new("Exp").to_payload();
//! transport.create_experiment(&payload).await?;
//! transport.delete_track("/track/1/delete").await?;
//! assert_eq!(transport.delete_calls(), 1);
//! # Ok(())
//! # }
//! ```

mod memory;

pub use memory::{MemoryTransport, RecordingNavigator, ScriptedPrompt, TransportCall};

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;

use crate::experiment::{ExperimentId, ExperimentPayload};

/// Opaque failure reported by the remote store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The store answered but refused the request.
    #[error("remote store rejected the request: {0}")]
    Rejected(String),

    /// The store could not be reached.
    #[error("remote store unavailable: {0}")]
    Unavailable(String),
}

/// Remote experiment store.
///
/// Every call runs to completion; there is no cancellation. Timeouts are
/// the implementation's business.
pub trait RemoteTransport: Send + Sync {
    /// Create a new experiment from the full payload.
    fn create_experiment(
        &self,
        payload: &ExperimentPayload,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Replace an existing experiment with the full payload.
    fn update_experiment(
        &self,
        id: ExperimentId,
        payload: &ExperimentPayload,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Delete one persisted track by its delete reference.
    fn delete_track(&self, delete_ref: &str)
        -> impl Future<Output = Result<(), RemoteError>> + Send;
}

impl<T: RemoteTransport> RemoteTransport for Arc<T> {
    fn create_experiment(
        &self,
        payload: &ExperimentPayload,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send {
        (**self).create_experiment(payload)
    }

    fn update_experiment(
        &self,
        id: ExperimentId,
        payload: &ExperimentPayload,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send {
        (**self).update_experiment(id, payload)
    }

    fn delete_track(
        &self,
        delete_ref: &str,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send {
        (**self).delete_track(delete_ref)
    }
}

/// Blocking yes/no confirmation.
pub trait ConfirmPrompt {
    /// Ask the user; `true` means proceed.
    fn confirm(&self, message: &str) -> bool;
}

impl<P: ConfirmPrompt> ConfirmPrompt for Arc<P> {
    fn confirm(&self, message: &str) -> bool {
        (**self).confirm(message)
    }
}

/// Page navigation.
pub trait Navigator {
    /// Leave the edit page for `url`.
    fn navigate_to(&self, url: &str);
}

impl<N: Navigator> Navigator for Arc<N> {
    fn navigate_to(&self, url: &str) {
        (**self).navigate_to(url);
    }
}

//! # Track-Editor: Experiment Editing State Manager
//!
//! **Version**: 0.1.0
//!
//! Track-Editor holds the client-side state of an experiment while a user edits
//! it: the weighted *tracks* users are routed into, local validation of every
//! edit, structural diffing against the snapshot the edit started from, and
//! remote submit/delete calls with optimistic updates and rollback.
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Poka-Yoke safety**: Invalid drafts never reach the network
//! - **Jidoka**: A failed remote delete rolls the draft back to the confirmed state
//! - **Genchi Genbutsu**: Dirty checks diff the draft against the real snapshot
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use track_editor::config::EditorConfig;
//! use track_editor::experiment::{AssignmentMode, Experiment, Track, TrackId};
//! use track_editor::session::{ExperimentEditSession, Outcome};
//! use track_editor::transport::{MemoryTransport, RecordingNavigator, ScriptedPrompt};
//!
//! # async fn example() -> track_editor::Result<()> {
//! let snapshot = Experiment::builder("Homework feedback")
//!     .mode(AssignmentMode::Weighted)
//!     .track(Track::persisted(TrackId::new(1), "Control").with_weighting(100))
//!     .build();
//!
//! let mut session = ExperimentEditSession::new(
//!     snapshot,
//!     MemoryTransport::new(),
//!     ScriptedPrompt::always(true),
//!     RecordingNavigator::new(),
//!     EditorConfig::default(),
//! );
//!
//! session.draft_mut()?.add_track("Treatment", Some(0))?;
//! if session.request_submit()? == Outcome::ReadyToSubmit {
//!     session.submit().await?;
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod config;
pub mod error;
pub mod experiment;
pub mod logging;
pub mod session;
pub mod transport;

pub use error::{Error, Result, ValidationError};

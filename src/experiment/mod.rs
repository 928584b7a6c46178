//! Experiment data model and the editable draft
//!
//! ## Schema Overview
//!
//! ```text
//! Experiment (1) ──< Track (N)
//!     │                 ├── key        local surrogate, identity within a draft
//!     │                 ├── id         remote id, None until persisted
//!     │                 └── weighting  percentage, Weighted mode only
//!     └── mode: Weighted | UniformRandom | CsvUpload
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use track_editor::experiment::{Experiment, ExperimentDraft, Track, TrackId};
//!
//! let snapshot = Experiment::builder("Quiz hints")
//!     .track(Track::persisted(TrackId::new(1), "No hints").with_weighting(50))
//!     .build();
//!
//! let mut draft = ExperimentDraft::new(snapshot.clone());
//! draft.add_track("Hints", Some(50)).unwrap();
//! assert!(draft.is_balanced());
//! ```

mod draft;
mod experiment_record;
mod payload;
mod track;

pub use draft::{ExperimentDraft, RenameKey};
pub use experiment_record::{AssignmentMode, Experiment, ExperimentBuilder, ExperimentId};
pub use payload::{ExperimentPayload, TrackPayload};
pub use track::{Track, TrackId, TrackKey};

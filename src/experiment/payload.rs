//! Wire formats: the submit payload and the server-provided snapshot.
//!
//! ## Submit payload
//!
//! ```text
//! {"id": 4, "name": "...", "notes": "...", "mode": "WEIGHTED",
//!  "uniformRandom": false, "csvUpload": false,
//!  "tracks": [{"id": 12, "name": "A", "weighting": 60}, ...]}
//! ```
//!
//! The `uniformRandom`/`csvUpload` flags duplicate `mode` for backends that
//! read the boolean form.
//!
//! ## Server snapshot
//!
//! ```text
//! {"id": 4, "name": "...", "notes": "...", "uniformRandom": false,
//!  "csvUpload": false,
//!  "tracks": [{"id": 12, "name": "A", "weighting": 60, "deleteURL": "..."}]}
//! ```

use serde::{Deserialize, Serialize};

use super::{AssignmentMode, Experiment, ExperimentId, Track, TrackId};
use crate::Result;

/// Full serialized experiment sent on submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentPayload {
    /// Remote id, `None` when creating
    pub id: Option<ExperimentId>,
    /// Experiment name
    pub name: String,
    /// Free-text notes
    pub notes: String,
    /// Assignment mode
    pub mode: AssignmentMode,
    /// `mode == UniformRandom`
    pub uniform_random: bool,
    /// `mode == CsvUpload`
    pub csv_upload: bool,
    /// Tracks in display order
    pub tracks: Vec<TrackPayload>,
}

/// One serialized track inside an [`ExperimentPayload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackPayload {
    /// Remote id, `None` for tracks added in this session
    pub id: Option<TrackId>,
    /// Track name
    pub name: String,
    /// Weighting percentage
    pub weighting: Option<u32>,
}

impl ExperimentPayload {
    /// Serialize to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerExperiment {
    #[serde(default)]
    id: Option<ExperimentId>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    uniform_random: bool,
    #[serde(default)]
    csv_upload: bool,
    #[serde(default)]
    tracks: Vec<ServerTrack>,
}

#[derive(Debug, Deserialize)]
struct ServerTrack {
    #[serde(default)]
    id: Option<TrackId>,
    name: String,
    #[serde(default)]
    weighting: Option<u32>,
    #[serde(default, rename = "deleteURL")]
    delete_url: Option<String>,
}

impl From<ServerTrack> for Track {
    fn from(wire: ServerTrack) -> Self {
        let track = match wire.id {
            Some(id) => Self::persisted(id, wire.name),
            None => Self::new(wire.name),
        };
        let track = track.with_optional_weighting(wire.weighting);
        match wire.delete_url {
            Some(url) => track.with_delete_ref(url),
            None => track,
        }
    }
}

impl Experiment {
    /// Build the payload `submit` transmits.
    #[must_use]
    pub fn to_payload(&self) -> ExperimentPayload {
        ExperimentPayload {
            id: self.id(),
            name: self.name().to_owned(),
            notes: self.notes().to_owned(),
            mode: self.mode(),
            uniform_random: self.mode() == AssignmentMode::UniformRandom,
            csv_upload: self.mode() == AssignmentMode::CsvUpload,
            tracks: self
                .tracks()
                .iter()
                .map(|track| TrackPayload {
                    id: track.id(),
                    name: track.name().to_owned(),
                    weighting: track.weighting(),
                })
                .collect(),
        }
    }

    /// Parse the snapshot JSON the server embeds in the edit page.
    ///
    /// A CSV-upload flag takes precedence over uniform-random; with neither
    /// flag set the experiment is weighted.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Serialization`] for malformed JSON.
    pub fn from_server_json(json: &str) -> Result<Self> {
        let wire: ServerExperiment = serde_json::from_str(json)?;
        let mode = if wire.csv_upload {
            AssignmentMode::CsvUpload
        } else if wire.uniform_random {
            AssignmentMode::UniformRandom
        } else {
            AssignmentMode::Weighted
        };

        let mut builder = Self::builder(wire.name)
            .notes(wire.notes)
            .mode(mode)
            .tracks(wire.tracks.into_iter().map(Track::from));
        if let Some(id) = wire.id {
            builder = builder.id(id);
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_server_json() {
        let json = r#"{
            "id": 4, "name": "Exp", "notes": "n", "uniformRandom": false,
            "tracks": [
                {"id": 12, "name": "A", "weighting": 60, "deleteURL": "/track/12/delete"},
                {"id": 13, "name": "B", "weighting": null}
            ]
        }"#;
        let experiment = Experiment::from_server_json(json).unwrap();

        assert_eq!(experiment.id(), Some(ExperimentId::new(4)));
        assert_eq!(experiment.mode(), AssignmentMode::Weighted);
        assert_eq!(experiment.tracks().len(), 2);

        let a = &experiment.tracks()[0];
        assert_eq!(a.id(), Some(TrackId::new(12)));
        assert_eq!(a.weighting(), Some(60));
        assert_eq!(a.original_name(), Some("A"));
        assert_eq!(a.delete_ref().as_deref(), Some("/track/12/delete"));

        let b = &experiment.tracks()[1];
        assert_eq!(b.weighting(), None);
        assert_eq!(b.delete_ref().as_deref(), Some("13"));
    }

    #[test]
    fn test_from_server_json_modes() {
        let uniform = Experiment::from_server_json(r#"{"name": "u", "uniformRandom": true}"#).unwrap();
        assert_eq!(uniform.mode(), AssignmentMode::UniformRandom);
        assert!(uniform.id().is_none());

        let csv = Experiment::from_server_json(
            r#"{"name": "c", "uniformRandom": true, "csvUpload": true}"#,
        )
        .unwrap();
        assert_eq!(csv.mode(), AssignmentMode::CsvUpload);
    }

    #[test]
    fn test_from_server_json_rejects_garbage() {
        let err = Experiment::from_server_json("{not json").unwrap_err();
        assert!(matches!(err, crate::Error::Serialization(_)));
    }

    #[test]
    fn test_payload_fields() {
        let experiment = Experiment::builder("Exp")
            .mode(AssignmentMode::UniformRandom)
            .track(Track::persisted(TrackId::new(1), "A"))
            .track(Track::new("B"))
            .build();
        let payload = experiment.to_payload();

        assert!(payload.uniform_random);
        assert!(!payload.csv_upload);
        assert_eq!(payload.tracks[0].id, Some(TrackId::new(1)));
        assert_eq!(payload.tracks[1].id, None);

        let json: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
        assert_eq!(json["mode"], "UNIFORM_RANDOM");
        assert_eq!(json["uniformRandom"], true);
        assert_eq!(json["tracks"][1]["name"], "B");
        assert!(json["id"].is_null());
    }
}

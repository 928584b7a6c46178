//! Experiment draft tests
//!
//! Track add/remove/rename rules and the weighting queries, exercised
//! through the public API only.

use track_editor::experiment::{
    AssignmentMode, Experiment, ExperimentDraft, RenameKey, Track, TrackId,
};
use track_editor::ValidationError;

fn loaded_draft() -> ExperimentDraft {
    ExperimentDraft::new(
        Experiment::builder("Exp")
            .track(Track::persisted(TrackId::new(1), "Alpha").with_weighting(50))
            .track(Track::persisted(TrackId::new(2), "Beta").with_weighting(50))
            .build(),
    )
}

// =============================================================================
// Weightings
// =============================================================================

#[test]
fn test_added_track_without_weighting_counts_as_zero() {
    let mut draft = loaded_draft();
    draft.add_track("Gamma", None).unwrap();

    assert_eq!(draft.weight_sum(), 100);
    assert!(draft.is_balanced());
}

#[test]
fn test_balance_follows_sum_in_weighted_mode() {
    let mut draft = loaded_draft();
    let key = draft.add_track("Gamma", Some(10)).unwrap();
    assert_eq!(draft.weight_sum(), 110);
    assert!(!draft.is_balanced());

    draft.set_weighting(key, Some(0)).unwrap();
    assert!(draft.is_balanced());
}

#[test]
fn test_uniform_share_two_and_three_tracks() {
    let mut draft = loaded_draft();
    draft.set_mode(AssignmentMode::UniformRandom);
    assert_eq!(draft.uniform_share_percent(), Some(50));

    draft.add_track("Gamma", None).unwrap();
    assert_eq!(draft.uniform_share_percent(), Some(33));
}

#[test]
fn test_csv_mode_drops_new_weighting() {
    let mut draft = loaded_draft();
    draft.set_mode(AssignmentMode::CsvUpload);
    let key = draft.add_track("Gamma", Some(90)).unwrap();

    assert_eq!(draft.track(key).unwrap().weighting(), None);
    assert!(draft.is_balanced());
}

// =============================================================================
// Names
// =============================================================================

#[test]
fn test_add_rejects_current_name() {
    let mut draft = loaded_draft();
    assert_eq!(
        draft.add_track("Alpha", None),
        Err(ValidationError::DuplicateName("Alpha".into()))
    );
    assert_eq!(draft.track_count(), 2);
}

#[test]
fn test_names_are_case_sensitive() {
    let mut draft = loaded_draft();
    assert!(draft.add_track("alpha", None).is_ok());
}

#[test]
fn test_add_rejects_original_name_of_renamed_track() {
    let mut draft = loaded_draft();
    let alpha = draft.tracks()[0].key();
    draft.begin_rename(alpha).unwrap();
    draft.set_pending_name(alpha, "Alpha 2").unwrap();
    draft.commit_rename(alpha).unwrap();

    assert_eq!(
        draft.add_track("Alpha", None),
        Err(ValidationError::DuplicateName("Alpha".into()))
    );
}

#[test]
fn test_add_accepts_name_of_removed_track() {
    let mut draft = loaded_draft();
    let beta = draft.tracks()[1].key();
    draft.remove_track(beta).unwrap();

    assert!(draft.add_track("Beta", Some(50)).is_ok());
}

#[test]
fn test_rename_rejects_other_tracks_original_name() {
    let mut draft = loaded_draft();
    let alpha = draft.tracks()[0].key();
    let beta = draft.tracks()[1].key();

    // Free up "Alpha" as a current name, it stays reserved as original name
    draft.set_pending_name(alpha, "First").unwrap();
    draft.commit_rename(alpha).unwrap();

    draft.begin_rename(beta).unwrap();
    draft.set_pending_name(beta, "Alpha").unwrap();
    assert_eq!(
        draft.handle_rename_key(beta, RenameKey::Enter),
        Err(ValidationError::DuplicateName("Alpha".into()))
    );
    assert_eq!(draft.track(beta).unwrap().name(), "Beta");
    assert_eq!(draft.track(beta).unwrap().pending_name(), "Beta");
    assert_eq!(draft.active_edit(), None);
}

#[test]
fn test_rename_to_same_name_is_allowed() {
    let mut draft = loaded_draft();
    let alpha = draft.tracks()[0].key();
    draft.begin_rename(alpha).unwrap();
    assert!(draft.commit_rename(alpha).is_ok());
}

// =============================================================================
// Identity
// =============================================================================

#[test]
fn test_identical_tracks_removed_individually() {
    let twin_a = Track::new("Twin").with_weighting(10);
    let twin_b = Track::new("Twin").with_weighting(10);
    let a_key = twin_a.key();
    let b_key = twin_b.key();

    let mut draft = ExperimentDraft::new(
        Experiment::builder("Exp").track(twin_a).track(twin_b).build(),
    );
    let (index, removed) = draft.remove_track(b_key).unwrap();

    assert_eq!(index, 1);
    assert_eq!(removed.key(), b_key);
    assert_eq!(draft.track_count(), 1);
    assert_eq!(draft.tracks()[0].key(), a_key);
}

#[test]
fn test_removing_edited_track_ends_edit() {
    let mut draft = loaded_draft();
    let alpha = draft.tracks()[0].key();
    draft.begin_rename(alpha).unwrap();
    draft.remove_track(alpha).unwrap();
    assert_eq!(draft.active_edit(), None);
}

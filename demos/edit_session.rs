//! Edit Session Example
//!
//! Walks through a typical edit: load a snapshot, add and rename tracks,
//! hit a validation error, survive a failed delete, then submit.
//!
//! Run with: cargo run --example edit_session

use std::sync::Arc;

use anyhow::Context;
use track_editor::config::EditorConfig;
use track_editor::experiment::{Experiment, RenameKey};
use track_editor::session::{ExperimentEditSession, Outcome};
use track_editor::transport::{MemoryTransport, RecordingNavigator, ScriptedPrompt};

const SNAPSHOT: &str = r#"{
    "id": 4,
    "name": "Reading quiz feedback",
    "notes": "Spring term",
    "uniformRandom": false,
    "tracks": [
        {"id": 10, "name": "Control", "weighting": 50, "deleteURL": "/tracks/10/delete"},
        {"id": 11, "name": "Video", "weighting": 50, "deleteURL": "/tracks/11/delete"}
    ]
}"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    track_editor::logging::init("track_editor=info");
    println!("=== Track-Editor Edit Session ===\n");

    // -------------------------------------------------------------------------
    // 1. Load the server snapshot
    // -------------------------------------------------------------------------
    let snapshot = Experiment::from_server_json(SNAPSHOT).context("parsing snapshot")?;
    let transport = Arc::new(MemoryTransport::new());
    if let Some(id) = snapshot.id() {
        transport.seed(id, snapshot.to_payload());
    }
    let navigator = Arc::new(RecordingNavigator::new());

    let mut session = ExperimentEditSession::new(
        snapshot,
        Arc::clone(&transport),
        ScriptedPrompt::always(true),
        Arc::clone(&navigator),
        EditorConfig::with_parent_page("/course/42/experiments"),
    );
    println!("1. Loaded \"{}\"", session.snapshot().name());

    // -------------------------------------------------------------------------
    // 2. Add a track and rename it
    // -------------------------------------------------------------------------
    let text = {
        let draft = session.draft_mut()?;
        let key = draft.add_track("Txt", Some(0))?;
        draft.begin_rename(key)?;
        draft.set_pending_name(key, "Text")?;
        draft.handle_rename_key(key, RenameKey::Enter)?;
        key
    };
    println!(
        "2. Added track \"{}\"; unsaved changes: {}",
        session.draft().track(text).map_or("?", |t| t.name()),
        session.has_unsaved_changes()
    );

    // -------------------------------------------------------------------------
    // 3. Unbalanced weightings are caught locally
    // -------------------------------------------------------------------------
    session.draft_mut()?.set_weighting(text, Some(20))?;
    match session.request_submit() {
        Err(err) => println!("3. Blocked: {err}"),
        Ok(outcome) => println!("3. Unexpected: {outcome:?}"),
    }

    // -------------------------------------------------------------------------
    // 4. A failed delete rolls back
    // -------------------------------------------------------------------------
    let video = session.draft().tracks()[1].key();
    transport.fail_next_deletes(1);
    if let Err(err) = session.delete_track(video).await {
        println!("4. {err} ({} tracks remain)", session.draft().track_count());
    }
    session.delete_track(video).await?;
    println!("   Retried: {} tracks remain", session.draft().track_count());

    // -------------------------------------------------------------------------
    // 5. Balance and submit
    // -------------------------------------------------------------------------
    session.draft_mut()?.set_weighting(text, Some(50))?;
    if session.request_submit()? == Outcome::ReadyToSubmit {
        let outcome = session.submit().await?;
        println!("5. {outcome:?}");
    }

    println!("\nRemote attempts:");
    for attempt in session.attempts() {
        println!(
            "   {} {:?} ok={}",
            attempt.recorded_at().format("%H:%M:%S%.3f"),
            attempt.operation(),
            attempt.succeeded()
        );
    }
    println!("Navigated to: {:?}", navigator.visited());

    Ok(())
}

//! Session lifecycle through the workspace: open, switch, save, reopen, submit

use std::sync::Arc;
use std::time::Instant;

use pitchcraft_editor::{Catalog, ComposeSession, EngineConfig};
use pitchcraft_workspace::{
    ChannelEditSink, DraftStore, FileCatalogSource, FileDraftStore, LogEditSink, MemoryDraftStore,
    PersistOutcome, StaticCatalogSource, Workspace,
};

const PRODUCTION: &str = r#"{
    "variant": "production",
    "blocks": [
        { "title": "Risk Assessment", "anchor": "[Risk Assessment Placeholder]",
          "options": [
            { "label": "Low", "previewText": "This matter presents low risk." },
            { "label": "High", "previewText": "This matter presents high risk." }
          ] },
        { "title": "Costs", "anchor": "[Costs Placeholder]",
          "options": [ { "label": "Fixed", "previewText": "A fixed fee of [Amount].", "snippetId": 41 } ] }
    ]
}"#;

const TRIAL: &str = r#"[
    { "title": "Trial Notes", "anchor": "[Trial Notes Placeholder]",
      "options": [ { "label": "Short", "previewText": "A short trial." } ] }
]"#;

fn catalogs() -> StaticCatalogSource {
    StaticCatalogSource::new()
        .with(Catalog::from_json("production", PRODUCTION).unwrap())
        .with(Catalog::from_json("trial", TRIAL).unwrap())
}

fn workspace_with(drafts: Arc<dyn DraftStore>) -> Workspace {
    Workspace::new(
        Arc::new(catalogs()),
        drafts,
        Arc::new(LogEditSink),
        EngineConfig::default(),
    )
}

fn compose(session: &mut ComposeSession) {
    session.insert_option("Risk Assessment", "Low", true).unwrap();
    session.insert_option("Costs", "Fixed", true).unwrap();
}

#[tokio::test]
async fn test_missing_catalog_falls_back_to_empty() {
    let ws = workspace_with(Arc::new(MemoryDraftStore::new()));
    let session = ws.open_session("s1", "archived").await;
    assert!(session.catalog().is_empty());
    assert_eq!(session.catalog().variant(), "archived");
    assert!(session.document().plain_text().starts_with("Dear [Enquiry.First_Name],"));
}

#[tokio::test]
async fn test_switch_catalog_keeps_current_on_failure() {
    let ws = workspace_with(Arc::new(MemoryDraftStore::new()));
    let mut session = ws.open_session("s1", "production").await;
    compose(&mut session);
    let before = session.document().markup();

    assert!(!ws.switch_catalog(&mut session, "archived").await);
    assert_eq!(session.catalog().variant(), "production");
    assert_eq!(session.document().markup(), before);

    assert!(ws.switch_catalog(&mut session, "trial").await);
    assert_eq!(session.catalog().variant(), "trial");
    assert!(session.document().plain_text().contains("[Trial Notes Placeholder]"));
}

#[tokio::test]
async fn test_save_and_reopen_restores_draft_and_history() {
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace_with(Arc::new(FileDraftStore::new(dir.path())));

    let mut session = ws.open_session("matter-7", "production").await;
    compose(&mut session);
    let typed = session
        .document()
        .markup()
        .replace("<s>This matter presents low risk.</s>", "<s>This matter presents very low risk.</s>");
    session.edit_text(&typed, Instant::now()).unwrap();
    let composed = session.document().markup();

    // Pending typing is committed before the write
    assert_eq!(ws.close_session(session).await, PersistOutcome::Saved);
    assert!(dir.path().join("matter-7.json").exists());

    let mut reopened = ws.open_session("matter-7", "production").await;
    assert_eq!(reopened.document().markup(), composed);
    assert!(reopened
        .edit_state()
        .is_snippet_edited("Risk Assessment", "Low"));
    assert!(reopened.history().can_undo());

    reopened.undo().unwrap();
    assert!(reopened
        .document()
        .plain_text()
        .contains("This matter presents low risk."));
}

#[tokio::test]
async fn test_rejected_write_is_retried_trimmed() {
    let sizing = workspace_with(Arc::new(MemoryDraftStore::new()));
    let mut session = sizing.open_session("s1", "production").await;
    compose(&mut session);
    let full = serde_json::to_string(&session.draft_state()).unwrap().len();
    let trimmed = serde_json::to_string(&session.draft_state().trimmed())
        .unwrap()
        .len();
    assert!(trimmed < full);

    let store = Arc::new(MemoryDraftStore::with_limit(trimmed));
    let ws = workspace_with(store.clone());
    assert_eq!(ws.save_session(&mut session).await, PersistOutcome::SavedTrimmed);

    let stored = store.read("s1").await.unwrap().unwrap();
    assert!(stored.undo.is_empty());
    assert_eq!(stored.markup, session.document().markup());

    // Reopening a trimmed draft starts a fresh history on the saved text
    let reopened = ws.open_session("s1", "production").await;
    assert_eq!(reopened.document().markup(), session.document().markup());
    assert!(!reopened.history().can_undo());
}

#[tokio::test]
async fn test_failed_write_leaves_session_intact() {
    let ws = workspace_with(Arc::new(MemoryDraftStore::with_limit(8)));
    let mut session = ws.open_session("s1", "production").await;
    compose(&mut session);
    let before = session.document().markup();

    assert_eq!(ws.save_session(&mut session).await, PersistOutcome::Failed);
    assert_eq!(session.document().markup(), before);
    assert!(session.structured_index().is_inserted("Costs"));
}

#[tokio::test]
async fn test_unreadable_history_restores_text_only() {
    let store = Arc::new(MemoryDraftStore::new());
    let ws = workspace_with(store.clone());
    let mut session = ws.open_session("s1", "production").await;
    compose(&mut session);
    let mut state = session.draft_state();
    state.undo = vec!["not a snapshot".into()];
    store.write("s1", &state).await.unwrap();

    let reopened = ws.open_session("s1", "production").await;
    assert_eq!(reopened.document().markup(), state.markup);
    assert!(reopened.structured_index().is_inserted("Risk Assessment"));
}

#[tokio::test]
async fn test_submit_edit_reaches_sink() {
    let (sink, mut rx) = ChannelEditSink::channel(4);
    let ws = Workspace::new(
        Arc::new(catalogs()),
        Arc::new(MemoryDraftStore::new()),
        Arc::new(sink),
        EngineConfig::default(),
    );
    let mut session = ws.open_session("s1", "production").await;
    compose(&mut session);

    let handle = ws.submit_edit(&session, "Costs", "Fixed", Some(2)).unwrap();
    handle.await.unwrap().unwrap();

    let edit = rx.recv().await.unwrap();
    assert_eq!(edit.block_title, "Costs");
    assert_eq!(edit.option_label, "Fixed");
    assert_eq!(edit.snippet_id, Some(41));
    assert_eq!(edit.sort_order, Some(2));
    assert!(edit.content.contains("A fixed fee of"));

    assert!(ws.submit_edit(&session, "Costs", "Hourly", None).is_err());
}

#[tokio::test]
async fn test_file_catalog_source_feeds_session() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("production.json"), PRODUCTION).unwrap();
    let ws = Workspace::new(
        Arc::new(FileCatalogSource::new(dir.path())),
        Arc::new(MemoryDraftStore::new()),
        Arc::new(LogEditSink),
        EngineConfig::default(),
    );

    let mut session = ws.open_session("s1", "production").await;
    assert!(session.insert_option("Risk Assessment", "High", true).unwrap());
    assert_eq!(session.structured_index().selected("Risk Assessment"), vec!["High"]);
}

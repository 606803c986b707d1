//! Owns the async collaborators of a compose session.
//!
//! Every method that touches a session does its I/O first and then hands
//! the finished result over in one call, so the session only ever sees
//! whole catalogs and whole drafts.

use std::sync::Arc;

use pitchcraft_editor::{Catalog, ComposeSession, EngineConfig};
use tokio::task::JoinHandle;

use crate::error::WorkspaceResult;
use crate::sources::CatalogSource;
use crate::store::DraftStore;
use crate::submit::SnippetEditSink;

/// How a draft write went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    Saved,
    /// The full draft was rejected; the retry without history succeeded
    SavedTrimmed,
    Failed,
}

pub struct Workspace {
    catalogs: Arc<dyn CatalogSource>,
    drafts: Arc<dyn DraftStore>,
    sink: Arc<dyn SnippetEditSink>,
    config: EngineConfig,
}

impl Workspace {
    pub fn new(
        catalogs: Arc<dyn CatalogSource>,
        drafts: Arc<dyn DraftStore>,
        sink: Arc<dyn SnippetEditSink>,
        config: EngineConfig,
    ) -> Self {
        Self {
            catalogs,
            drafts,
            sink,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start a session for `variant`, resuming any stored draft.
    ///
    /// A catalog that fails to load leaves the session on an empty
    /// catalog. A stored draft that cannot be read or restored is
    /// skipped and the session starts from the base letter.
    pub async fn open_session(&self, id: &str, variant: &str) -> ComposeSession {
        let catalog = match self.catalogs.load(variant).await {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::warn!(
                    source = self.catalogs.name(),
                    variant,
                    error = %e,
                    "Catalog unavailable, continuing with an empty catalog"
                );
                Catalog::empty(variant)
            }
        };
        let mut session = ComposeSession::new(id, catalog, self.config.clone());

        let stored = match self.drafts.read(id).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(session = id, error = %e, "Failed to read stored draft");
                None
            }
        };
        if let Some(state) = stored {
            let fallback = state.trimmed();
            if let Err(e) = session.apply_restored_state(state) {
                tracing::warn!(
                    session = id,
                    error = %e,
                    "Stored history unusable, restoring draft text only"
                );
                if let Err(e) = session.apply_restored_state(fallback) {
                    tracing::warn!(session = id, error = %e, "Failed to restore draft");
                }
            }
        }

        tracing::info!(
            session = id,
            variant = session.catalog().variant(),
            version = session.document().version,
            "Opened session"
        );
        session
    }

    /// Load `variant` and swap it into the session. On failure the
    /// session keeps its current catalog and `false` is returned.
    pub async fn switch_catalog(&self, session: &mut ComposeSession, variant: &str) -> bool {
        match self.catalogs.load(variant).await {
            Ok(catalog) => {
                session.apply_catalog(catalog);
                true
            }
            Err(e) => {
                tracing::warn!(
                    session = %session.id,
                    current = session.catalog().variant(),
                    requested = variant,
                    error = %e,
                    "Catalog unavailable, keeping the current one"
                );
                false
            }
        }
    }

    /// Commit pending typing and write the draft.
    ///
    /// A rejected write is retried once without history or known values.
    /// If that fails too the failure is logged and the session is left
    /// untouched.
    pub async fn save_session(&self, session: &mut ComposeSession) -> PersistOutcome {
        session.flush();
        let state = session.draft_state();
        let key = session.id.clone();

        let err = match self.drafts.write(&key, &state).await {
            Ok(()) => {
                tracing::debug!(session = %key, store = self.drafts.name(), "Saved draft");
                return PersistOutcome::Saved;
            }
            Err(e) => e,
        };
        tracing::warn!(session = %key, error = %err, "Draft write failed, retrying trimmed");

        match self.drafts.write(&key, &state.trimmed()).await {
            Ok(()) => PersistOutcome::SavedTrimmed,
            Err(e) => {
                tracing::error!(session = %key, error = %e, "Giving up on saving draft");
                PersistOutcome::Failed
            }
        }
    }

    /// Save and drop the session
    pub async fn close_session(&self, mut session: ComposeSession) -> PersistOutcome {
        let outcome = self.save_session(&mut session).await;
        tracing::info!(session = %session.id, ?outcome, "Closed session");
        outcome
    }

    /// Offer a snippet's current text back to the catalog owners.
    ///
    /// Delivery runs in the background; the handle resolves once the
    /// sink has taken the edit or refused it.
    pub fn submit_edit(
        &self,
        session: &ComposeSession,
        block: &str,
        label: &str,
        sort_order: Option<u32>,
    ) -> WorkspaceResult<JoinHandle<WorkspaceResult<()>>> {
        let edit = session.propose_edit(block, label, sort_order)?;
        let sink = Arc::clone(&self.sink);
        Ok(tokio::spawn(async move {
            let result = sink.submit(edit).await;
            if let Err(e) = &result {
                tracing::warn!(sink = sink.name(), error = %e, "Failed to submit snippet edit");
            }
            result
        }))
    }
}

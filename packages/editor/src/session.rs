//! # Compose Session
//!
//! One drafting session: a catalog, the live draft, its snapshot
//! history and the structured index derived from it.
//!
//! Every committed change runs the same sequence:
//!
//! ```text
//! reduce → commit pre-snapshot → swap draft → commit post-snapshot → rebuild index
//! ```
//!
//! Free-text edits skip the snapshot pair and commit through the debounce
//! instead. Edits aimed at a locked block are absorbed: the call succeeds
//! with `false` and the draft is untouched.

use std::time::Instant;

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::context::Context;
use crate::document::{Document, Snapshot};
use crate::draft::{DraftState, ProposedEdit};
use crate::edit_detector::{snippet_edit_ranges, EditRange, EditState};
use crate::index::StructuredIndex;
use crate::mutations::{BlockOp, MutationError, OptionChoice, Patch, SnippetRef};
use crate::pipeline::Materializer;
use crate::substitution::{expand, ExpandOptions};
use crate::undo_stack::{HistoryState, UndoStack};
use crate::EditorError;

/// Outcome of a structural operation
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    /// Draft version after the operation
    pub version: u64,

    /// False when the operation was absorbed or changed nothing
    pub changed: bool,

    pub patches: Vec<Patch>,
}

pub struct ComposeSession {
    /// Unique session identifier
    pub id: String,

    catalog: Catalog,
    document: Document,
    index: StructuredIndex,
    history: UndoStack,

    /// Values known while drafting, filled in as options are inserted
    context: Context,

    config: EngineConfig,
}

impl ComposeSession {
    /// Start from the catalog's base letter
    pub fn new(id: impl Into<String>, catalog: Catalog, config: EngineConfig) -> Self {
        let document = Document::from_catalog(&catalog);
        Self::with_document(id, catalog, document, config)
    }

    pub fn with_document(
        id: impl Into<String>,
        catalog: Catalog,
        document: Document,
        config: EngineConfig,
    ) -> Self {
        let mut history = UndoStack::with_limits(config.history_capacity, config.debounce());
        history.reset(document.snapshot());
        let index = StructuredIndex::rebuild(&document, &catalog);
        Self {
            id: id.into(),
            catalog,
            document,
            index,
            history,
            context: Context::default(),
            config,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn structured_index(&self) -> &StructuredIndex {
        &self.index
    }

    pub fn edit_state(&self) -> EditState {
        self.index.edit_state()
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn set_context(&mut self, context: Context) {
        self.context = context;
    }

    /// Apply one structural operation
    pub fn apply(&mut self, op: BlockOp) -> Result<MutationResult, EditorError> {
        if self.history.state() == HistoryState::Replaying {
            return Err(EditorError::Replaying);
        }

        let reduced = match op.reduce(&self.document, &self.catalog, Some(&self.context)) {
            Ok(reduced) => reduced,
            Err(MutationError::Locked(title)) => {
                tracing::debug!(block = %title, op = op.name(), "Ignoring edit to locked block");
                return Ok(self.unchanged());
            }
            Err(err) => {
                tracing::warn!(op = op.name(), error = %err, "Block operation rejected");
                return Err(err.into());
            }
        };

        if reduced.document.tree() == self.document.tree() {
            return Ok(self.unchanged());
        }

        self.history.commit_immediate(self.document.snapshot())?;
        let version = self.document.version;
        self.document = reduced.document;
        self.document.version = version;
        self.document.bump_version();
        self.history.commit_immediate(self.document.snapshot())?;
        self.refresh();

        tracing::info!(
            session = %self.id,
            op = op.name(),
            block = op.block(),
            version = self.document.version,
            "Applied block operation"
        );

        Ok(MutationResult {
            version: self.document.version,
            changed: true,
            patches: reduced.patches,
        })
    }

    pub fn insert_option(
        &mut self,
        block: &str,
        options: impl Into<OptionChoice>,
        replace: bool,
    ) -> Result<bool, EditorError> {
        self.apply(BlockOp::InsertOption {
            block: block.to_string(),
            options: options.into(),
            replace,
        })
        .map(|r| r.changed)
    }

    pub fn append_option(&mut self, block: &str, option: &str) -> Result<bool, EditorError> {
        self.apply(BlockOp::AppendOption {
            block: block.to_string(),
            option: option.to_string(),
        })
        .map(|r| r.changed)
    }

    pub fn remove_option(&mut self, block: &str, option: &str) -> Result<bool, EditorError> {
        self.apply(BlockOp::RemoveOption {
            block: block.to_string(),
            option: option.to_string(),
        })
        .map(|r| r.changed)
    }

    pub fn clear_block(&mut self, block: &str) -> Result<bool, EditorError> {
        self.apply(BlockOp::ClearBlock {
            block: block.to_string(),
        })
        .map(|r| r.changed)
    }

    pub fn toggle_lock(&mut self, block: &str) -> Result<bool, EditorError> {
        self.apply(BlockOp::ToggleLock {
            block: block.to_string(),
        })
        .map(|r| r.changed)
    }

    pub fn reorder_sentence(
        &mut self,
        block: &str,
        label: &str,
        from: usize,
        to: usize,
    ) -> Result<bool, EditorError> {
        self.apply(BlockOp::ReorderSentence {
            snippet: SnippetRef::new(block, label),
            from,
            to,
        })
        .map(|r| r.changed)
    }

    pub fn delete_sentence(&mut self, block: &str, label: &str, index: usize) -> Result<bool, EditorError> {
        self.apply(BlockOp::DeleteSentence {
            snippet: SnippetRef::new(block, label),
            index,
        })
        .map(|r| r.changed)
    }

    /// Replace the draft with text from the free-form editing surface.
    /// The change becomes an undo point once `debounce` passes quietly.
    pub fn edit_text(&mut self, markup: &str, now: Instant) -> Result<bool, EditorError> {
        if self.history.state() == HistoryState::Replaying {
            return Err(EditorError::Replaying);
        }

        let mut next = Document::from_markup(markup);
        if next.tree() == self.document.tree() {
            return Ok(false);
        }
        if let Some(title) = self.changed_locked_block(&next) {
            tracing::debug!(block = %title, "Ignoring free-text edit to locked block");
            return Ok(false);
        }

        next.version = self.document.version;
        next.bump_version();
        self.document = next;
        self.history.commit_debounced(self.document.snapshot(), now)?;
        self.refresh();
        Ok(true)
    }

    /// Commit a debounced edit whose quiet period has passed
    pub fn tick(&mut self, now: Instant) -> bool {
        self.history.flush_due(now)
    }

    /// Commit any pending edit immediately
    pub fn flush(&mut self) -> bool {
        self.history.flush()
    }

    pub fn undo(&mut self) -> Result<bool, EditorError> {
        let live = self.document.snapshot();
        self.history.begin_replay();
        let target = self.history.undo(&live);
        if let Some(snapshot) = &target {
            self.restore(snapshot);
        }
        self.history.end_replay();
        Ok(target.is_some())
    }

    pub fn redo(&mut self) -> Result<bool, EditorError> {
        self.history.begin_replay();
        let target = self.history.redo();
        if let Some(snapshot) = &target {
            self.restore(snapshot);
        }
        self.history.end_replay();
        Ok(target.is_some())
    }

    /// Swap in a different catalog, starting over from its base letter
    pub fn apply_catalog(&mut self, catalog: Catalog) {
        tracing::info!(
            session = %self.id,
            from = self.catalog.variant(),
            to = catalog.variant(),
            "Switching catalog"
        );
        let version = self.document.version;
        self.catalog = catalog;
        self.document = Document::from_catalog(&self.catalog);
        self.document.version = version;
        self.document.bump_version();
        self.history.reset(self.document.snapshot());
        self.refresh();
    }

    /// Resume a persisted draft as a single change
    pub fn apply_restored_state(&mut self, state: DraftState) -> Result<(), EditorError> {
        if state.variant != self.catalog.variant() {
            tracing::warn!(
                stored = %state.variant,
                current = self.catalog.variant(),
                "Restoring a draft composed against another catalog variant"
            );
        }

        let undo = state
            .undo
            .into_iter()
            .map(Snapshot::parse)
            .collect::<Result<Vec<_>, _>>()?;
        let redo = state
            .redo
            .into_iter()
            .map(Snapshot::parse)
            .collect::<Result<Vec<_>, _>>()?;

        let mut document = Document::from_markup(&state.markup);
        document.version = self.document.version;
        document.bump_version();

        if undo.is_empty() {
            self.history.reset(document.snapshot());
        } else {
            self.history.restore_entries(undo, redo, document.snapshot());
        }
        self.document = document;
        self.context = self.context.merged(&state.context);
        self.refresh();

        tracing::info!(session = %self.id, version = self.document.version, "Restored draft");
        Ok(())
    }

    pub fn draft_state(&self) -> DraftState {
        let (undo, redo) = self.history.entries();
        DraftState {
            session_id: self.id.clone(),
            variant: self.catalog.variant().to_string(),
            markup: self.document.markup(),
            index: self.index.clone(),
            undo: undo.into_iter().map(Snapshot::into_string).collect(),
            redo: redo.into_iter().map(Snapshot::into_string).collect(),
            context: self.context.clone(),
        }
    }

    /// Expand tokens in arbitrary text against the session's known values
    pub fn expand(&self, text: &str, options: ExpandOptions) -> String {
        expand(text, &self.context, options)
    }

    /// Produce the letter to send. `context` overlays the session's
    /// known values.
    pub fn materialize(&self, context: &Context, strip: bool) -> Result<String, EditorError> {
        let context = self.context.merged(context);
        Materializer::run(&self.document, &self.catalog, &context, &self.config, strip)
    }

    /// Package a snippet's current text as a suggested catalog change
    pub fn propose_edit(
        &self,
        block: &str,
        label: &str,
        sort_order: Option<u32>,
    ) -> Result<ProposedEdit, EditorError> {
        let template = self
            .catalog
            .block(block)
            .ok_or_else(|| MutationError::UnknownBlock(block.to_string()))?;
        let (_, region) = self
            .document
            .region(template)
            .ok_or_else(|| MutationError::BlockNotFound(block.to_string()))?;
        let snippet = region
            .snippet(label)
            .ok_or_else(|| MutationError::SnippetNotFound {
                block: block.to_string(),
                label: label.to_string(),
            })?;

        Ok(ProposedEdit {
            block_title: block.to_string(),
            option_label: label.to_string(),
            snippet_id: snippet
                .snippet_id
                .or_else(|| template.option(label).and_then(|o| o.snippet_id)),
            content: snippet.plain_text(),
            sort_order,
        })
    }

    /// Word ranges of a snippet that differ from its inserted text
    pub fn edit_ranges(&self, block: &str, label: &str) -> Result<Vec<EditRange>, EditorError> {
        let template = self
            .catalog
            .block(block)
            .ok_or_else(|| MutationError::UnknownBlock(block.to_string()))?;
        let snippet = self
            .document
            .region(template)
            .and_then(|(_, region)| region.snippet(label))
            .ok_or_else(|| MutationError::SnippetNotFound {
                block: block.to_string(),
                label: label.to_string(),
            })?;
        Ok(snippet_edit_ranges(snippet))
    }

    fn restore(&mut self, snapshot: &Snapshot) {
        let version = self.document.version;
        self.document = Document::restore(snapshot);
        self.document.version = version;
        self.document.bump_version();
        self.refresh();
    }

    fn refresh(&mut self) {
        self.index = StructuredIndex::rebuild(&self.document, &self.catalog);
    }

    fn unchanged(&self) -> MutationResult {
        MutationResult {
            version: self.document.version,
            changed: false,
            patches: Vec::new(),
        }
    }

    /// First locked block whose region differs in `next`
    fn changed_locked_block(&self, next: &Document) -> Option<&str> {
        for title in &self.index.locked_blocks {
            let Some(block) = self.catalog.block(title) else {
                continue;
            };
            let current = self.document.region(block).map(|(_, r)| r);
            let proposed = next.region(block).map(|(_, r)| r);
            if current != proposed {
                return Some(title.as_str());
            }
        }
        None
    }
}

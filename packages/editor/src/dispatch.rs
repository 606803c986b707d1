//! Host-owned routing of UI actions to session operations.
//!
//! Handlers are keyed by `(block, action)`. A handler registered for a
//! specific block wins over the wildcard handler for the same action, so
//! a host can special-case one block without touching the rest.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::session::ComposeSession;
use crate::EditorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    InsertOption,
    AppendOption,
    RemoveOption,
    ClearBlock,
    ToggleLock,
    ReorderSentence,
    DeleteSentence,
    Undo,
    Redo,
}

/// Arguments carried by a UI action; unused fields are ignored
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionPayload {
    pub options: Vec<String>,
    pub label: Option<String>,
    pub replace: bool,
    pub from: usize,
    pub to: usize,
    pub index: usize,
}

impl ActionPayload {
    pub fn option(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    fn label(&self) -> &str {
        self.label
            .as_deref()
            .or_else(|| self.options.first().map(String::as_str))
            .unwrap_or_default()
    }
}

pub type ActionHandler =
    Box<dyn Fn(&mut ComposeSession, &str, &ActionPayload) -> Result<bool, EditorError> + Send + Sync>;

#[derive(Default)]
pub struct DispatchTable {
    handlers: HashMap<(Option<String>, ActionKind), ActionHandler>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wildcard handlers for every action, mapped onto the session
    pub fn standard() -> Self {
        let mut table = Self::new();
        table.register(ActionKind::InsertOption, |s, block, p| {
            let options = if p.options.is_empty() {
                vec![p.label().to_string()]
            } else {
                p.options.clone()
            };
            s.insert_option(block, options, p.replace)
        });
        table.register(ActionKind::AppendOption, |s, block, p| {
            s.append_option(block, p.label())
        });
        table.register(ActionKind::RemoveOption, |s, block, p| {
            s.remove_option(block, p.label())
        });
        table.register(ActionKind::ClearBlock, |s, block, _| s.clear_block(block));
        table.register(ActionKind::ToggleLock, |s, block, _| s.toggle_lock(block));
        table.register(ActionKind::ReorderSentence, |s, block, p| {
            s.reorder_sentence(block, p.label(), p.from, p.to)
        });
        table.register(ActionKind::DeleteSentence, |s, block, p| {
            s.delete_sentence(block, p.label(), p.index)
        });
        table.register(ActionKind::Undo, |s, _, _| s.undo());
        table.register(ActionKind::Redo, |s, _, _| s.redo());
        table
    }

    pub fn register<F>(&mut self, kind: ActionKind, handler: F)
    where
        F: Fn(&mut ComposeSession, &str, &ActionPayload) -> Result<bool, EditorError> + Send + Sync + 'static,
    {
        self.handlers.insert((None, kind), Box::new(handler));
    }

    pub fn register_for<F>(&mut self, block: impl Into<String>, kind: ActionKind, handler: F)
    where
        F: Fn(&mut ComposeSession, &str, &ActionPayload) -> Result<bool, EditorError> + Send + Sync + 'static,
    {
        self.handlers.insert((Some(block.into()), kind), Box::new(handler));
    }

    pub fn dispatch(
        &self,
        session: &mut ComposeSession,
        block: &str,
        kind: ActionKind,
        payload: &ActionPayload,
    ) -> Result<bool, EditorError> {
        let handler = self
            .handlers
            .get(&(Some(block.to_string()), kind))
            .or_else(|| self.handlers.get(&(None, kind)))
            .ok_or_else(|| EditorError::UnhandledAction {
                block: block.to_string(),
                kind,
            })?;
        handler(session, block, payload)
    }
}

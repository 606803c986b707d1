//! Serializable records that leave the engine: persisted drafts and
//! proposed snippet edits.

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::index::StructuredIndex;

/// Everything needed to resume a composition later
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftState {
    pub session_id: String,
    pub variant: String,
    pub markup: String,

    /// Derived; kept so readers need not re-parse, ignored on restore
    #[serde(default)]
    pub index: StructuredIndex,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub undo: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub redo: Vec<String>,

    #[serde(default, skip_serializing_if = "Context::is_empty")]
    pub context: Context,
}

impl DraftState {
    /// Smaller payload for a retry after a failed write: history, known
    /// values and the derived index are dropped
    pub fn trimmed(&self) -> Self {
        Self {
            session_id: self.session_id.clone(),
            variant: self.variant.clone(),
            markup: self.markup.clone(),
            index: StructuredIndex::default(),
            undo: Vec::new(),
            redo: Vec::new(),
            context: Context::default(),
        }
    }
}

/// A user's rewrite of a snippet, offered back to the catalog owners
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedEdit {
    pub block_title: String,
    pub option_label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet_id: Option<u64>,

    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<u32>,
}

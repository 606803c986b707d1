//! Error types for the editor

use pitchcraft_common::CommonError;
use thiserror::Error;

use crate::dispatch::ActionKind;
use crate::mutations::MutationError;
use crate::pipeline::Stage;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error("Substitution step out of order: expected {expected:?}, found {found:?}")]
    SubstitutionOrderViolation { expected: Stage, found: Stage },

    #[error("Catalog load failed: {0}")]
    CatalogLoad(String),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("History is replaying")]
    Replaying,

    #[error("No handler registered for {kind:?} on block '{block}'")]
    UnhandledAction { block: String, kind: ActionKind },

    #[error(transparent)]
    Common(#[from] CommonError),
}

impl EditorError {
    /// Errors the caller should surface but that leave the draft intact
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, EditorError::SubstitutionOrderViolation { .. })
    }
}

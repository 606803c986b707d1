//! # Pitchcraft Editor
//!
//! Composition engine for templated letters.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ markup: draft text ⇄ region tree            │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: ComposeSession                      │
//! │  - Block operations as pure reducers        │
//! │  - Snapshot undo/redo with debounce         │
//! │  - Structured index + edit detection        │
//! │  - Placeholder expansion                    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ Materializer: draft → letter to send        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The draft is the source of truth**: the structured index and
//!    edit state are always rebuilt from it, never patched
//! 2. **Operations are values**: a [`BlockOp`] can be logged, replayed
//!    and dispatched by a host-owned [`DispatchTable`]
//! 3. **Locks absorb edits**: changes aimed at a locked block are
//!    dropped without error
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pitchcraft_editor::{Catalog, ComposeSession, Context, EngineConfig};
//!
//! let catalog = Catalog::from_json("production", &source)?;
//! let mut session = ComposeSession::new("draft-1", catalog, EngineConfig::default());
//!
//! session.insert_option("Risk Assessment", "Low", true)?;
//! session.undo()?;
//!
//! let letter = session.materialize(&Context::new().with_amount(1500.0), true)?;
//! ```

pub mod catalog;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod document;
pub mod draft;
pub mod edit_detector;
pub mod index;
pub mod mutations;
pub mod pipeline;
pub mod session;
pub mod substitution;
pub mod undo_stack;

mod errors;

pub use catalog::{Catalog, TemplateBlock, TemplateOption};
pub use config::{EngineConfig, OutputFormat};
pub use context::Context;
pub use dispatch::{ActionHandler, ActionKind, ActionPayload, DispatchTable};
pub use document::{Document, Location, Lookup, Snapshot};
pub use draft::{DraftState, ProposedEdit};
pub use edit_detector::{compute_edited_state, diff_words, EditRange, EditState};
pub use errors::EditorError;
pub use index::{Selection, StructuredIndex};
pub use mutations::{BlockOp, MutationError, OptionChoice, Patch, SnippetRef};
pub use pipeline::{Materializer, Stage};
pub use session::{ComposeSession, MutationResult};
pub use substitution::{expand, unresolved_tokens, ExpandOptions};
pub use undo_stack::{HistoryState, UndoStack};

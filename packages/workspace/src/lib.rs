//! Async glue around a compose session.
//!
//! Catalog fetches, draft persistence and snippet-edit submission run on
//! tokio and never touch a document directly. Their results are handed
//! to the session as single atomic changes.

pub mod error;
pub mod host;
pub mod sources;
pub mod store;
pub mod submit;
pub mod watcher;

pub use error::{WorkspaceError, WorkspaceResult};
pub use host::{PersistOutcome, Workspace};
pub use sources::{CatalogSource, FileCatalogSource, StaticCatalogSource};
pub use store::{DraftStore, FileDraftStore, MemoryDraftStore};
pub use submit::{ChannelEditSink, LogEditSink, SnippetEditSink};
pub use watcher::CatalogWatcher;

//! Draft persistence.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use pitchcraft_editor::DraftState;
use tokio::sync::Mutex;

use crate::error::{WorkspaceError, WorkspaceResult};

#[async_trait]
pub trait DraftStore: Send + Sync {
    fn name(&self) -> &'static str;

    /// `None` when nothing was stored under `key`
    async fn read(&self, key: &str) -> WorkspaceResult<Option<DraftState>>;

    async fn write(&self, key: &str, state: &DraftState) -> WorkspaceResult<()>;
}

/// One JSON file per session key
pub struct FileDraftStore {
    dir: PathBuf,
}

impl FileDraftStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> WorkspaceResult<PathBuf> {
        let plain = key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if key.is_empty() || key.starts_with('.') || !plain {
            return Err(WorkspaceError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl DraftStore for FileDraftStore {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn read(&self, key: &str) -> WorkspaceResult<Option<DraftState>> {
        let path = self.path_for(key)?;
        let source = match tokio::fs::read_to_string(&path).await {
            Ok(source) => source,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&source)?))
    }

    async fn write(&self, key: &str, state: &DraftState) -> WorkspaceResult<()> {
        let path = self.path_for(key)?;
        let failed = |e: std::io::Error| WorkspaceError::PersistenceWrite {
            key: key.to_string(),
            reason: e.to_string(),
        };

        let json = serde_json::to_string_pretty(state)?;
        tokio::fs::create_dir_all(&self.dir).await.map_err(failed)?;

        // Readers never see a half-written draft
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, json).await.map_err(failed)?;
        tokio::fs::rename(&staging, &path).await.map_err(failed)?;

        tracing::debug!(key, path = %path.display(), "Wrote draft");
        Ok(())
    }
}

/// In-memory store. A byte limit makes oversized writes fail the way a
/// full backing store would.
#[derive(Default)]
pub struct MemoryDraftStore {
    entries: Mutex<HashMap<String, String>>,
    limit: Option<usize>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: Mutex::default(),
            limit: Some(limit),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn read(&self, key: &str) -> WorkspaceResult<Option<DraftState>> {
        match self.entries.lock().await.get(key) {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    async fn write(&self, key: &str, state: &DraftState) -> WorkspaceResult<()> {
        let json = serde_json::to_string(state)?;
        if let Some(limit) = self.limit {
            if json.len() > limit {
                return Err(WorkspaceError::PersistenceWrite {
                    key: key.to_string(),
                    reason: format!("{} bytes exceeds limit of {}", json.len(), limit),
                });
            }
        }
        self.entries.lock().await.insert(key.to_string(), json);
        Ok(())
    }
}

use notify::event::{EventKind, ModifyKind};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::path::Path;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::error::WorkspaceResult;

/// Reports catalog files in one directory that were written or created,
/// by variant name.
pub struct CatalogWatcher {
    _watcher: RecommendedWatcher,
    receiver: Receiver<notify::Result<Event>>,
}

impl CatalogWatcher {
    pub fn new(dir: impl AsRef<Path>) -> WorkspaceResult<Self> {
        let (tx, rx) = channel();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;

        watcher.watch(dir.as_ref(), RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
        })
    }

    /// Block until some catalog changes. `None` once the watcher is gone.
    pub fn next_change(&self) -> Option<String> {
        loop {
            match self.receiver.recv() {
                Ok(Ok(event)) => {
                    if let Some(variant) = changed_variant(&event) {
                        return Some(variant);
                    }
                }
                Ok(Err(e)) => tracing::warn!(error = %e, "Catalog watch error"),
                Err(_) => return None,
            }
        }
    }

    /// Like [`next_change`](Self::next_change) but gives up after `timeout`
    pub fn next_change_timeout(&self, timeout: Duration) -> Option<String> {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            let left = deadline.saturating_duration_since(std::time::Instant::now());
            match self.receiver.recv_timeout(left) {
                Ok(Ok(event)) => {
                    if let Some(variant) = changed_variant(&event) {
                        return Some(variant);
                    }
                }
                Ok(Err(e)) => tracing::warn!(error = %e, "Catalog watch error"),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    pub fn try_next_change(&self) -> Option<String> {
        while let Ok(res) = self.receiver.try_recv() {
            if let Ok(event) = res {
                if let Some(variant) = changed_variant(&event) {
                    return Some(variant);
                }
            }
        }
        None
    }
}

fn changed_variant(event: &Event) -> Option<String> {
    let relevant = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any | ModifyKind::Name(_))
    );
    if !relevant {
        return None;
    }
    event.paths.iter().find_map(|path| variant_of(path))
}

fn variant_of(path: &Path) -> Option<String> {
    if path.extension()? != "json" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if stem.starts_with('.') {
        return None;
    }
    Some(stem.to_string())
}

//! # Undo/Redo Stack
//!
//! Snapshot history for a draft.
//!
//! ## Design
//!
//! - The top of the undo stack always mirrors the last committed draft
//! - A structural operation commits the draft before and after it, so
//!   one undo steps back over exactly that operation
//! - Free-text edits commit through a debounce: a burst of typing
//!   becomes one undo point once the draft has been quiet long enough
//! - Committing the same snapshot twice in a row is a no-op
//! - Any new commit clears the redo stack
//! - Only the newest `max_levels` snapshots are kept
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//! stack.commit_immediate(doc.snapshot())?;
//! // ...mutate doc...
//! stack.commit_immediate(doc.snapshot())?;
//!
//! if let Some(previous) = stack.undo(&doc.snapshot()) {
//!     doc = Document::restore(&previous);
//! }
//! ```

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::document::Snapshot;
use crate::EditorError;

/// Whether the history is currently restoring a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryState {
    Idle,
    Replaying,
}

#[derive(Debug, Clone)]
struct PendingCommit {
    snapshot: Snapshot,
    deadline: Instant,
}

#[derive(Debug)]
pub struct UndoStack {
    /// Committed snapshots (most recent last)
    undo_stack: VecDeque<Snapshot>,

    /// Snapshots stepped back over (most recent last)
    redo_stack: Vec<Snapshot>,

    /// Maximum number of snapshots kept
    max_levels: usize,

    debounce: Duration,

    pending: Option<PendingCommit>,

    state: HistoryState,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoStack {
    /// 50 levels, 300ms debounce
    pub fn new() -> Self {
        Self::with_limits(50, Duration::from_millis(300))
    }

    pub fn with_limits(max_levels: usize, debounce: Duration) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_levels: max_levels.max(1),
            debounce,
            pending: None,
            state: HistoryState::Idle,
        }
    }

    pub fn state(&self) -> HistoryState {
        self.state
    }

    /// Commit now, cancelling any pending debounced commit. Returns
    /// whether a new entry was pushed.
    pub fn commit_immediate(&mut self, snapshot: Snapshot) -> Result<bool, EditorError> {
        self.ensure_idle()?;
        self.pending = None;
        self.redo_stack.clear();
        Ok(self.push(snapshot))
    }

    /// Schedule a commit for `now + debounce`, replacing any pending one
    pub fn commit_debounced(&mut self, snapshot: Snapshot, now: Instant) -> Result<(), EditorError> {
        self.ensure_idle()?;
        self.redo_stack.clear();
        self.pending = Some(PendingCommit {
            snapshot,
            deadline: now + self.debounce,
        });
        Ok(())
    }

    /// Commit the pending snapshot if its quiet period has elapsed
    pub fn flush_due(&mut self, now: Instant) -> bool {
        match &self.pending {
            Some(pending) if pending.deadline <= now => self.flush(),
            _ => false,
        }
    }

    /// Commit the pending snapshot regardless of its deadline
    pub fn flush(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => self.push(pending.snapshot),
            None => false,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Step back. `live` is the draft as currently shown.
    ///
    /// If `live` has uncommitted changes they are discarded in favour of
    /// the last committed snapshot (and become redoable). Otherwise the
    /// top entry moves to the redo stack and the one beneath it is
    /// returned. With fewer than two entries there is nothing to undo.
    pub fn undo(&mut self, live: &Snapshot) -> Option<Snapshot> {
        self.pending = None;

        let top = self.undo_stack.back()?;
        if top != live {
            let top = top.clone();
            self.push_redo(live.clone());
            return Some(top);
        }

        if self.undo_stack.len() < 2 {
            return None;
        }
        let top = self.undo_stack.pop_back()?;
        self.push_redo(top);
        self.undo_stack.back().cloned()
    }

    /// Step forward again after an undo
    pub fn redo(&mut self) -> Option<Snapshot> {
        self.pending = None;
        let snapshot = self.redo_stack.pop()?;
        self.push(snapshot.clone());
        Some(snapshot)
    }

    pub fn begin_replay(&mut self) {
        self.state = HistoryState::Replaying;
    }

    pub fn end_replay(&mut self) {
        self.state = HistoryState::Idle;
    }

    /// Drop all history and start again from `initial`
    pub fn reset(&mut self, initial: Snapshot) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.pending = None;
        self.state = HistoryState::Idle;
        self.undo_stack.push_back(initial);
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() >= 2
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn top(&self) -> Option<&Snapshot> {
        self.undo_stack.back()
    }

    /// Both stacks, oldest first, for persistence
    pub fn entries(&self) -> (Vec<Snapshot>, Vec<Snapshot>) {
        (
            self.undo_stack.iter().cloned().collect(),
            self.redo_stack.clone(),
        )
    }

    /// Replace both stacks with previously persisted entries. If `live`
    /// is not the newest entry it is committed on top and redo is dropped.
    pub fn restore_entries(&mut self, undo: Vec<Snapshot>, redo: Vec<Snapshot>, live: Snapshot) {
        self.undo_stack = undo.into();
        self.redo_stack = redo;
        self.pending = None;
        self.state = HistoryState::Idle;
        if self.push(live) {
            self.redo_stack.clear();
        }
        self.trim();
    }

    fn ensure_idle(&self) -> Result<(), EditorError> {
        match self.state {
            HistoryState::Idle => Ok(()),
            HistoryState::Replaying => Err(EditorError::Replaying),
        }
    }

    fn push(&mut self, snapshot: Snapshot) -> bool {
        if self.undo_stack.back() == Some(&snapshot) {
            return false;
        }
        self.undo_stack.push_back(snapshot);
        self.trim();
        true
    }

    fn push_redo(&mut self, snapshot: Snapshot) {
        self.redo_stack.push(snapshot);
        if self.redo_stack.len() > self.max_levels {
            self.redo_stack.remove(0);
        }
    }

    fn trim(&mut self) {
        while self.undo_stack.len() > self.max_levels {
            self.undo_stack.pop_front();
        }
        while self.redo_stack.len() > self.max_levels {
            self.redo_stack.remove(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn snap(text: &str) -> Snapshot {
        Document::from_markup(text).snapshot()
    }

    #[test]
    fn test_duplicate_commits_suppressed() {
        let mut stack = UndoStack::new();
        assert!(stack.commit_immediate(snap("a")).unwrap());
        assert!(!stack.commit_immediate(snap("a")).unwrap());
        assert_eq!(stack.undo_levels(), 1);
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_undo_redo() {
        let mut stack = UndoStack::new();
        for s in ["a", "b", "c"] {
            stack.commit_immediate(snap(s)).unwrap();
        }
        assert_eq!(stack.undo(&snap("c")), Some(snap("b")));
        assert_eq!(stack.undo(&snap("b")), Some(snap("a")));
        assert_eq!(stack.undo(&snap("a")), None);
        assert_eq!(stack.redo(), Some(snap("b")));
        assert_eq!(stack.redo(), Some(snap("c")));
        assert_eq!(stack.redo(), None);
    }

    #[test]
    fn test_new_commit_clears_redo() {
        let mut stack = UndoStack::new();
        stack.commit_immediate(snap("a")).unwrap();
        stack.commit_immediate(snap("b")).unwrap();
        stack.undo(&snap("b"));
        assert!(stack.can_redo());
        stack.commit_immediate(snap("c")).unwrap();
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut stack = UndoStack::with_limits(3, Duration::from_millis(300));
        for s in ["a", "b", "c", "d"] {
            stack.commit_immediate(snap(s)).unwrap();
        }
        assert_eq!(stack.undo_levels(), 3);
        assert_eq!(stack.undo(&snap("d")), Some(snap("c")));
        assert_eq!(stack.undo(&snap("c")), Some(snap("b")));
        assert_eq!(stack.undo(&snap("b")), None);
    }

    #[test]
    fn test_debounce_coalesces() {
        let mut stack = UndoStack::new();
        let t0 = Instant::now();
        stack.commit_immediate(snap("a")).unwrap();
        stack.commit_debounced(snap("ab"), t0).unwrap();
        stack.commit_debounced(snap("abc"), t0 + Duration::from_millis(100)).unwrap();
        assert!(!stack.flush_due(t0 + Duration::from_millis(350)));
        assert!(stack.flush_due(t0 + Duration::from_millis(400)));
        assert_eq!(stack.undo_levels(), 2);
        assert_eq!(stack.top(), Some(&snap("abc")));
    }

    #[test]
    fn test_undo_discards_uncommitted_text() {
        let mut stack = UndoStack::new();
        stack.commit_immediate(snap("a")).unwrap();
        stack.commit_debounced(snap("ab"), Instant::now()).unwrap();
        assert_eq!(stack.undo(&snap("ab")), Some(snap("a")));
        assert!(!stack.has_pending());
        assert_eq!(stack.redo(), Some(snap("ab")));
    }

    #[test]
    fn test_commit_rejected_while_replaying() {
        let mut stack = UndoStack::new();
        stack.begin_replay();
        assert!(matches!(
            stack.commit_immediate(snap("a")),
            Err(EditorError::Replaying)
        ));
        stack.end_replay();
        assert!(stack.commit_immediate(snap("a")).is_ok());
    }
}

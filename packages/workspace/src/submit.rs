//! Where proposed snippet edits go.

use async_trait::async_trait;
use pitchcraft_editor::ProposedEdit;
use tokio::sync::mpsc;

use crate::error::{WorkspaceError, WorkspaceResult};

#[async_trait]
pub trait SnippetEditSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn submit(&self, edit: ProposedEdit) -> WorkspaceResult<()>;
}

/// Forwards edits to whoever holds the receiving end
pub struct ChannelEditSink {
    tx: mpsc::Sender<ProposedEdit>,
}

impl ChannelEditSink {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ProposedEdit>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl SnippetEditSink for ChannelEditSink {
    fn name(&self) -> &'static str {
        "channel"
    }

    async fn submit(&self, edit: ProposedEdit) -> WorkspaceResult<()> {
        self.tx.send(edit).await.map_err(|_| WorkspaceError::SinkClosed)
    }
}

/// Records edits in the log and drops them
#[derive(Debug, Default)]
pub struct LogEditSink;

#[async_trait]
impl SnippetEditSink for LogEditSink {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn submit(&self, edit: ProposedEdit) -> WorkspaceResult<()> {
        tracing::info!(
            block = %edit.block_title,
            option = %edit.option_label,
            snippet_id = ?edit.snippet_id,
            chars = edit.content.chars().count(),
            "Proposed snippet edit"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit() -> ProposedEdit {
        ProposedEdit {
            block_title: "Costs".into(),
            option_label: "Fixed".into(),
            snippet_id: Some(12),
            content: "A fixed fee of [Amount].".into(),
            sort_order: None,
        }
    }

    #[tokio::test]
    async fn test_channel_sink_delivers() {
        let (sink, mut rx) = ChannelEditSink::channel(4);
        sink.submit(edit()).await.unwrap();
        assert_eq!(rx.recv().await, Some(edit()));
    }

    #[tokio::test]
    async fn test_channel_sink_reports_closed() {
        let (sink, rx) = ChannelEditSink::channel(1);
        drop(rx);
        assert!(matches!(sink.submit(edit()).await, Err(WorkspaceError::SinkClosed)));
    }
}

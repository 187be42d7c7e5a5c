use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{
    domain::{FileRef, NewConversionRecord},
    Result,
};

/// Port for acquiring a remote video as a local file.
#[async_trait]
pub trait VideoFetcher: Send + Sync {
    /// Resolve a sharing link to a freshly created local artifact path.
    ///
    /// `None` means no artifact could be produced (private, deleted, quota
    /// exceeded, remote failure); it is the only failure signal the remote
    /// side produces. `Err` is reserved for local I/O problems.
    async fn fetch(&self, link: &str) -> Result<Option<PathBuf>>;
}

/// What went wrong while publishing, as far as the platform tells us.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PublishKind {
    TooBig,
    TimedOut,
    Other,
}

/// Publish-time platform failure, classified at the adapter boundary so the
/// workflow can match on the kind instead of grepping free text.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct PublishError {
    pub kind: PublishKind,
    pub message: String,
}

/// Port for streaming a local artifact into the chat platform.
#[async_trait]
pub trait VideoPublisher: Send + Sync {
    async fn publish(&self, artifact: &Path) -> std::result::Result<FileRef, PublishError>;
}

/// Port for the append-only attempt ledger.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Idempotently ensure the backing table exists.
    async fn init(&self) -> Result<()>;

    /// Insert one record. Callers log and swallow failures.
    async fn append(&self, record: NewConversionRecord) -> Result<()>;
}

/// Port for per-conversation progress updates. Best-effort: delivery
/// failures are the sink's problem and never reach the workflow.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn update(&self, text: &str);
}

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::domain::{ConversionStatus, NewConversionRecord, UserId};
use crate::messages;
use crate::ports::{Ledger, ProgressSink, PublishError, PublishKind, VideoFetcher, VideoPublisher};

/// Host marker a submitted link must carry to be accepted.
pub const DRIVE_HOST: &str = "drive.google.com";

/// Terminal outcome of one conversion attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Link failed validation; nothing was attempted or recorded.
    Rejected,
    Completed { file_ref: String },
    Failed,
}

/// What the conversation reports back to the user at its terminal state.
#[derive(Clone, Debug)]
pub struct ConversionReport {
    pub outcome: Outcome,
    pub message: String,
}

/// Drives a single conversion attempt: validate, acquire, publish, record,
/// cleanup. The fetcher and ledger are shared across conversations; the
/// publisher and progress sink are per-conversation.
pub struct ConversionWorkflow {
    fetcher: Arc<dyn VideoFetcher>,
    ledger: Arc<dyn Ledger>,
}

impl ConversionWorkflow {
    pub fn new(fetcher: Arc<dyn VideoFetcher>, ledger: Arc<dyn Ledger>) -> Self {
        Self { fetcher, ledger }
    }

    /// Run one attempt to its terminal state.
    ///
    /// Every branch past validation writes exactly one ledger row, and the
    /// artifact (if one was produced) is deleted regardless of outcome.
    /// Ledger and cleanup failures are logged, never surfaced.
    pub async fn run(
        &self,
        user_id: UserId,
        link: &str,
        publisher: &dyn VideoPublisher,
        progress: &dyn ProgressSink,
    ) -> ConversionReport {
        if !link.contains(DRIVE_HOST) {
            return ConversionReport {
                outcome: Outcome::Rejected,
                message: messages::INVALID_LINK.to_string(),
            };
        }

        progress.update(messages::DOWNLOADING).await;

        let mut artifact: Option<PathBuf> = None;
        let (outcome, message) = match self.fetcher.fetch(link).await {
            Ok(Some(path)) => {
                artifact = Some(path.clone());
                progress.update(messages::UPLOADING).await;
                match publisher.publish(&path).await {
                    Ok(file_ref) => (
                        Outcome::Completed { file_ref: file_ref.0 },
                        messages::DONE.to_string(),
                    ),
                    Err(e) => {
                        tracing::error!("telegram upload error: {e}");
                        (Outcome::Failed, publish_failure_message(&e))
                    }
                }
            }
            Ok(None) => {
                tracing::error!("an unexpected error occurred: {}", messages::DOWNLOAD_FAILED);
                (
                    Outcome::Failed,
                    messages::unexpected_error(messages::DOWNLOAD_FAILED),
                )
            }
            Err(e) => {
                tracing::error!("an unexpected error occurred: {e}");
                (Outcome::Failed, messages::unexpected_error(&e.to_string()))
            }
        };

        self.record(user_id, link, &outcome).await;

        if let Some(path) = &artifact {
            cleanup_artifact(path).await;
        }

        ConversionReport { outcome, message }
    }

    async fn record(&self, user_id: UserId, link: &str, outcome: &Outcome) {
        let (status, remote_file_reference) = match outcome {
            Outcome::Rejected => return,
            Outcome::Completed { file_ref } => (ConversionStatus::Done, Some(file_ref.clone())),
            Outcome::Failed => (ConversionStatus::Error, None),
        };

        let record = NewConversionRecord {
            user_id: user_id.0.to_string(),
            original_link: link.to_string(),
            remote_file_reference,
            status,
        };

        if let Err(e) = self.ledger.append(record).await {
            tracing::error!("failed to log conversion to database: {e}");
        }
    }
}

fn publish_failure_message(e: &PublishError) -> String {
    match e.kind {
        PublishKind::TooBig => messages::TOO_BIG.to_string(),
        PublishKind::TimedOut => messages::TIMED_OUT.to_string(),
        PublishKind::Other => messages::upload_error(&e.message),
    }
}

async fn cleanup_artifact(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::info!("deleted local file: {}", path.display()),
        // Already gone counts as cleaned up.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::error!("error deleting file {}: {e}", path.display()),
    }
}

//! Telegram adapter (teloxide).
//!
//! Implements the `dvb-core` VideoPublisher over the Bot API and hosts the
//! dispatcher wiring in [`router`].

use std::path::Path;

use async_trait::async_trait;
use teloxide::{prelude::*, types::InputFile};

use dvb_core::{
    domain::FileRef,
    ports::{PublishError, PublishKind, VideoPublisher},
};

pub mod handlers;
pub mod router;

/// Uploads one artifact into one chat as a streamable video.
pub struct TelegramVideoPublisher {
    bot: Bot,
    chat_id: teloxide::types::ChatId,
}

impl TelegramVideoPublisher {
    pub fn new(bot: Bot, chat_id: teloxide::types::ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl VideoPublisher for TelegramVideoPublisher {
    async fn publish(&self, artifact: &Path) -> std::result::Result<FileRef, PublishError> {
        let sent = self
            .bot
            .send_video(self.chat_id, InputFile::file(artifact.to_path_buf()))
            .supports_streaming(true)
            .await
            .map_err(map_request_error)?;

        let Some(video) = sent.video() else {
            return Err(PublishError {
                kind: PublishKind::Other,
                message: "Telegram did not return a video attachment".to_string(),
            });
        };
        Ok(FileRef(video.file.id.clone()))
    }
}

fn map_request_error(e: teloxide::RequestError) -> PublishError {
    let kind = match &e {
        teloxide::RequestError::Network(n) if n.is_timeout() => PublishKind::TimedOut,
        _ => classify_error_text(&e.to_string()),
    };
    PublishError {
        kind,
        message: e.to_string(),
    }
}

/// The Bot API reports upload limits and timeouts only through free-text
/// error messages, so classification here is a substring match on the known
/// markers.
pub fn classify_error_text(text: &str) -> PublishKind {
    let lower = text.to_ascii_lowercase();
    if lower.contains("file is too big") || lower.contains("request entity too large") {
        return PublishKind::TooBig;
    }
    if lower.contains("timed out") {
        return PublishKind::TimedOut;
    }
    PublishKind::Other
}

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::prelude::*;
use tokio::sync::Mutex;

use dvb_core::{domain::UserId, ports::ProgressSink};

use crate::{router::AppState, TelegramVideoPublisher};

/// Status message created on first update and edited afterwards, so the
/// user watches one message move through download, upload, and the final
/// outcome.
struct StatusMessage {
    bot: Bot,
    chat_id: teloxide::types::ChatId,
    current: Mutex<Option<teloxide::types::MessageId>>,
}

impl StatusMessage {
    fn new(bot: Bot, chat_id: teloxide::types::ChatId) -> Self {
        Self {
            bot,
            chat_id,
            current: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ProgressSink for StatusMessage {
    async fn update(&self, text: &str) {
        let mut current = self.current.lock().await;
        match *current {
            Some(id) => {
                let _ = self.bot.edit_message_text(self.chat_id, id, text).await;
            }
            None => {
                if let Ok(m) = self.bot.send_message(self.chat_id, text).await {
                    *current = Some(m.id);
                }
            }
        }
    }
}

/// Free text received while the chat was in AWAITING_LINK: the submission.
pub async fn handle_link(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let Some(link) = msg.text() else {
        return Ok(());
    };

    let status = StatusMessage::new(bot.clone(), msg.chat.id);
    let publisher = TelegramVideoPublisher::new(bot, msg.chat.id);

    let report = state
        .workflow
        .run(UserId(user.id.0 as i64), link, &publisher, &status)
        .await;

    status.update(&report.message).await;
    Ok(())
}

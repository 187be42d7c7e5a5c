use std::{collections::HashSet, sync::Arc};

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};
use tokio::sync::Mutex;

use dvb_core::{config::Config, workflow::ConversionWorkflow};

use crate::handlers;

#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<ConversionWorkflow>,
    pub conversations: Arc<Conversations>,
}

/// Chats currently in the AWAITING_LINK state.
///
/// A chat enters on /convertvd and leaves the moment a link or /cancel
/// arrives, so each conversation handles exactly one submission.
#[derive(Default)]
pub struct Conversations {
    awaiting: Mutex<HashSet<i64>>,
}

impl Conversations {
    pub async fn begin(&self, chat_id: i64) {
        self.awaiting.lock().await.insert(chat_id);
    }

    /// Leave AWAITING_LINK; returns whether the chat was in it.
    pub async fn end(&self, chat_id: i64) -> bool {
        self.awaiting.lock().await.remove(&chat_id)
    }
}

pub async fn run_polling(cfg: Arc<Config>, workflow: Arc<ConversionWorkflow>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    if let Ok(me) = bot.get_me().await {
        tracing::info!("dvb started: @{}", me.username());
    }

    let state = Arc::new(AppState {
        workflow,
        conversations: Arc::new(Conversations::default()),
    });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}

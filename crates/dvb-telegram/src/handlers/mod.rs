//! Telegram update handlers.
//!
//! Commands drive the conversation state machine; free text inside a
//! conversation is the link submission.

use std::sync::Arc;

use teloxide::prelude::*;

use dvb_core::messages;

use crate::router::{AppState, Conversations};

mod commands;
mod link;

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    match route(&msg, &state.conversations).await {
        Route::Ignore => Ok(()),
        Route::Command => commands::handle_command(bot, msg, state).await,
        Route::LinkSubmission => link::handle_link(bot, msg, state).await,
        Route::Hint => {
            let _ = bot.send_message(msg.chat.id, messages::HINT).await;
            Ok(())
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Route {
    Ignore,
    Command,
    LinkSubmission,
    Hint,
}

/// Where an incoming message goes.
///
/// Only a text message with a sender counts as a link submission and
/// consumes the AWAITING_LINK state; senderless posts (anonymous admins,
/// channel posts) get the hint and leave the conversation open.
async fn route(msg: &Message, conversations: &Conversations) -> Route {
    let Some(text) = msg.text() else {
        return Route::Ignore;
    };
    if text.starts_with('/') {
        return Route::Command;
    }
    if msg.from().is_none() {
        return Route::Hint;
    }
    // Consumes the AWAITING_LINK state: one submission per conversation.
    if conversations.end(msg.chat.id.0).await {
        return Route::LinkSubmission;
    }
    Route::Hint
}

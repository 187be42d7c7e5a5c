use std::sync::Arc;

use teloxide::prelude::*;

use dvb_core::messages;

use crate::router::AppState;

/// Split `/cmd@botname args` into the bare command and its argument string.
fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

pub async fn handle_command(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let (cmd, _rest) = parse_command(msg.text().unwrap_or(""));

    match cmd.as_str() {
        "start" => {
            let _ = bot.send_message(msg.chat.id, messages::GREETING).await;
        }
        "convertvd" => {
            state.conversations.begin(msg.chat.id.0).await;
            let _ = bot.send_message(msg.chat.id, messages::ASK_LINK).await;
        }
        "cancel" => {
            // Only meaningful inside AWAITING_LINK; ignored otherwise.
            if state.conversations.end(msg.chat.id.0).await {
                let _ = bot.send_message(msg.chat.id, messages::CANCELLED).await;
            }
        }
        _ => {}
    }

    Ok(())
}

mod messenger;

pub use messenger::{Messenger, TelegramMessenger};

use teloxide::prelude::*;

use crate::config::AppConfig;

/// Sends a plain status message to every configured admin chat, logging a
/// warning on failure.
pub async fn notify_admins(bot: &Bot, config: &AppConfig, text: &str) {
    for admin_id in &config.admin_ids {
        if let Err(err) = bot.send_message(ChatId(*admin_id), text).await {
            tracing::warn!(
                target: "telegram",
                error = %err,
                admin_id,
                "failed to send admin notification"
            );
        }
    }
}

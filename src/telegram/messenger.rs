use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{FileId, InputFile, Message, ParseMode},
};

/// Outbound messaging seam. The worker and the delivery engine talk to this
/// trait instead of `teloxide::Bot` so tests can substitute a recording
/// double for the platform.
///
/// Photo sends return the file_id Telegram assigned to the uploaded photo,
/// when one is present in the response; the delivery engine caches it.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<()>;
    async fn send_photo_url(
        &self,
        chat_id: &str,
        image_url: &str,
        caption: &str,
        markdown: bool,
    ) -> Result<Option<String>>;
    async fn send_photo_by_handle(&self, chat_id: &str, handle: &str, caption: &str)
        -> Result<()>;
    async fn send_photo_bytes(
        &self,
        chat_id: &str,
        bytes: Vec<u8>,
        caption: &str,
    ) -> Result<Option<String>>;
}

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<()> {
        self.bot
            .send_message(parse_chat(chat_id)?, text)
            .parse_mode(ParseMode::MarkdownV2)
            .await?;
        Ok(())
    }

    async fn send_photo_url(
        &self,
        chat_id: &str,
        image_url: &str,
        caption: &str,
        markdown: bool,
    ) -> Result<Option<String>> {
        let url = url::Url::parse(image_url)
            .with_context(|| format!("invalid image url {image_url}"))?;
        let mut request = self
            .bot
            .send_photo(parse_chat(chat_id)?, InputFile::url(url))
            .caption(caption.to_string());
        if markdown {
            request = request.parse_mode(ParseMode::MarkdownV2);
        }
        let message = request.await?;
        Ok(largest_photo_id(&message))
    }

    async fn send_photo_by_handle(
        &self,
        chat_id: &str,
        handle: &str,
        caption: &str,
    ) -> Result<()> {
        self.bot
            .send_photo(
                parse_chat(chat_id)?,
                InputFile::file_id(FileId(handle.to_string())),
            )
            .caption(caption.to_string())
            .parse_mode(ParseMode::MarkdownV2)
            .await?;
        Ok(())
    }

    async fn send_photo_bytes(
        &self,
        chat_id: &str,
        bytes: Vec<u8>,
        caption: &str,
    ) -> Result<Option<String>> {
        let message = self
            .bot
            .send_photo(
                parse_chat(chat_id)?,
                InputFile::memory(bytes).file_name("image.jpg"),
            )
            .caption(caption.to_string())
            .parse_mode(ParseMode::MarkdownV2)
            .await?;
        Ok(largest_photo_id(&message))
    }
}

fn parse_chat(chat_id: &str) -> Result<ChatId> {
    let id = chat_id
        .parse::<i64>()
        .with_context(|| format!("chat id {chat_id} is not numeric"))?;
    Ok(ChatId(id))
}

// Telegram returns several sizes for one photo; the last entry is the largest.
fn largest_photo_id(message: &Message) -> Option<String> {
    message
        .photo()
        .and_then(|sizes| sizes.last())
        .map(|size| size.file.id.0.clone())
}

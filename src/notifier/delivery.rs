use std::{sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use url::Url;

use crate::{
    cache::{photo_key, PhotoCache},
    notifier::resize,
    telegram::Messenger,
};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches raw image bytes, ready for upload. Split out of the delivery
/// engine so tests can script the fetch layer without a network.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, image_url: &str) -> Option<Vec<u8>>;
}

/// Fetches with browser-like headers; some listing CDNs refuse requests that
/// look like bots. Bytes are passed through the resizer before returning.
pub struct HttpImageFetcher {
    http: Client,
}

impl HttpImageFetcher {
    pub fn new(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, image_url: &str) -> Option<Vec<u8>> {
        let url = match Url::parse(image_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            _ => return None,
        };

        let response = match self
            .http
            .get(url)
            .header(
                header::USER_AGENT,
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
            )
            .header(header::ACCEPT, "image/webp,image/apng,image/*,*/*;q=0.8")
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(target: "notifier", error = %err, image_url, "image fetch failed");
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            return None;
        }
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");
        if !content_type.contains("image") {
            return None;
        }

        let bytes = response.bytes().await.ok()?;
        resize::resize_if_needed(&bytes)
    }
}

/// Delivers one item's photo with a multi-layer fallback:
///
/// 1. cached Telegram file_id (no upload at all);
/// 2. passing the raw URL to Telegram;
/// 3. fetching the bytes ourselves and uploading them;
/// 4. a plain text message without the image.
///
/// Layers are tried strictly in order and the first success wins. The only
/// error that escapes is the final text send failing; everything above it
/// degrades silently. This engine is the sole writer of the photo cache.
pub struct ImageDelivery {
    messenger: Arc<dyn Messenger>,
    cache: Arc<dyn PhotoCache>,
    fetcher: Arc<dyn ImageFetcher>,
    cache_ttl_seconds: u64,
}

impl ImageDelivery {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        cache: Arc<dyn PhotoCache>,
        fetcher: Arc<dyn ImageFetcher>,
        cache_ttl_seconds: u64,
    ) -> Self {
        Self {
            messenger,
            cache,
            fetcher,
            cache_ttl_seconds,
        }
    }

    pub async fn deliver(&self, chat_id: &str, image_url: &str, text: &str) -> Result<()> {
        let key = photo_key(image_url);

        // Layer 1: cached file_id.
        match self.cache.get(&key).await {
            Ok(Some(handle)) => {
                match self
                    .messenger
                    .send_photo_by_handle(chat_id, &handle, text)
                    .await
                {
                    Ok(()) => return Ok(()),
                    Err(err) => {
                        // Telegram no longer accepts the handle; invalidate it.
                        tracing::debug!(
                            target: "notifier",
                            error = %err,
                            image_url,
                            "cached file_id rejected, trying other methods"
                        );
                        if let Err(err) = self.cache.delete(&key).await {
                            tracing::warn!(target: "notifier", error = %err, "cache delete failed");
                        }
                    }
                }
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(target: "notifier", error = %err, "cache lookup failed");
            }
        }

        // Layer 2: let Telegram fetch the URL itself.
        match self
            .messenger
            .send_photo_url(chat_id, image_url, text, true)
            .await
        {
            Ok(handle) => {
                self.remember(&key, handle).await;
                return Ok(());
            }
            Err(err) => {
                tracing::info!(
                    target: "notifier",
                    error = %err,
                    image_url,
                    "direct URL send failed, fetching with custom headers"
                );
            }
        }

        // Layer 3: fetch the bytes ourselves and upload.
        if let Some(bytes) = self.fetcher.fetch(image_url).await {
            match self.messenger.send_photo_bytes(chat_id, bytes, text).await {
                Ok(handle) => {
                    self.remember(&key, handle).await;
                    return Ok(());
                }
                Err(err) => {
                    tracing::warn!(
                        target: "notifier",
                        error = %err,
                        image_url,
                        "failed to send fetched image"
                    );
                }
            }
        }

        // Layer 4: give up on the image.
        tracing::warn!(target: "notifier", image_url, "all image methods failed, sending as text");
        self.messenger.send_text(chat_id, text).await
    }

    async fn remember(&self, key: &str, handle: Option<String>) {
        let Some(handle) = handle else { return };
        if let Err(err) = self.cache.set(key, &handle, self.cache_ttl_seconds).await {
            tracing::warn!(target: "notifier", error = %err, "failed to cache file_id");
        }
    }
}

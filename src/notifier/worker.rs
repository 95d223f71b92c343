use std::{sync::Arc, time::Duration};

use anyhow::Result;
use tokio::time::sleep;

use crate::{
    infrastructure::shutdown::ShutdownListener,
    notifier::{delivery::ImageDelivery, format},
    repository::MonitoringPort,
    telegram::Messenger,
};

/// Decorative image attached to the "N items found" summary message.
const ITEMS_FOUND_IMAGE_URL: &str =
    "https://tse4.mm.bing.net/th?id=OIG2.fso8nlFWoq9hafRkva2e&pid=ImgGn";

/// Pause between per-item sends so Telegram's flood limiter stays quiet.
const INTER_ITEM_DELAY: Duration = Duration::from_millis(500);

/// Background worker that reconciles pending monitoring tasks against newly
/// discovered items and pushes the notifications out.
///
/// One logical worker drives all outbound sends: tasks are processed one at
/// a time, items within a task one at a time. Any error inside a cycle is
/// logged and the loop carries on with its next scheduled pass.
pub struct Notifier {
    port: Arc<dyn MonitoringPort>,
    messenger: Arc<dyn Messenger>,
    delivery: ImageDelivery,
}

impl Notifier {
    pub fn new(
        port: Arc<dyn MonitoringPort>,
        messenger: Arc<dyn Messenger>,
        delivery: ImageDelivery,
    ) -> Self {
        Self {
            port,
            messenger,
            delivery,
        }
    }

    /// Runs the check-and-send cycle forever, sleeping `interval` between
    /// passes. Returns only once `shutdown` fires; the sleep races the
    /// shutdown signal so cancellation does not wait out the interval.
    pub async fn run(&self, interval: Duration, mut shutdown: ShutdownListener) {
        loop {
            if shutdown.is_shutdown() {
                break;
            }
            if let Err(err) = self.check_and_send_items().await {
                tracing::error!(target: "notifier", error = %err, "unexpected error during periodic check");
            }
            tracing::info!(target: "notifier", seconds = interval.as_secs(), "sleeping between cycles");
            tokio::select! {
                _ = sleep(interval) => {}
                _ = shutdown.wait() => break,
            }
        }
        tracing::info!(target: "notifier", "notifier stopped");
    }

    /// One reconciliation cycle. A failing task is logged and skipped; the
    /// remaining tasks still get processed.
    pub async fn check_and_send_items(&self) -> Result<()> {
        let pending = self.port.pending_tasks().await?;
        for task in pending {
            if let Err(err) = self.process_task(&task).await {
                tracing::error!(
                    target: "notifier",
                    error = %err,
                    chat_id = %task.chat_id,
                    task = %task.name,
                    "failed to process task"
                );
            }
        }
        Ok(())
    }

    async fn process_task(&self, task: &crate::domain::MonitoringTask) -> Result<()> {
        let items = self.port.items_to_send(task).await?;
        tracing::info!(
            target: "notifier",
            count = items.len(),
            chat_id = %task.chat_id,
            "found items to send"
        );

        if items.is_empty() {
            // Record that the check happened even though nothing was sent.
            self.port.update_last_updated(task).await?;
            return Ok(());
        }

        let caption = format!(
            "I have found {} items for monitoring '{}', maybe one of them is what you're looking for",
            items.len(),
            task.name
        );
        self.messenger
            .send_photo_url(&task.chat_id, ITEMS_FOUND_IMAGE_URL, &caption, false)
            .await?;

        // The port returns newest first; deliver oldest first.
        for item in items.iter().rev() {
            let text = format::format_item(item);
            match item.image_url() {
                Some(image_url) => {
                    self.delivery
                        .deliver(&task.chat_id, image_url, &text)
                        .await?
                }
                None => self.messenger.send_text(&task.chat_id, &text).await?,
            }
            sleep(INTER_ITEM_DELAY).await;
        }

        self.port.update_last_got_item(&task.chat_id).await?;
        self.port.update_last_updated(task).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Item, MonitoringTask},
        infrastructure::shutdown::Shutdown,
        notifier::support::{
            MemoryCache, ScriptedFetcher, ScriptedMessenger, ScriptedPort, SendRecord,
        },
    };

    fn task() -> MonitoringTask {
        serde_json::from_value(serde_json::json!({
            "id": 7,
            "chat_id": "1",
            "name": "flats in Warsaw",
            "url": "http://olx.example/flats",
        }))
        .expect("task record")
    }

    fn item(title: &str, image_url: Option<&str>) -> Item {
        serde_json::from_value(serde_json::json!({
            "title": title,
            "price": "1000",
            "location": "Warsaw",
            "created_at": "2024-03-05T10:00:00Z",
            "item_url": "http://olx.example/offer",
            "image_url": image_url,
        }))
        .expect("item record")
    }

    fn notifier(port: Arc<ScriptedPort>, messenger: Arc<ScriptedMessenger>) -> Notifier {
        let delivery = ImageDelivery::new(
            messenger.clone(),
            Arc::new(MemoryCache::default()),
            Arc::new(ScriptedFetcher::none()),
            86_400,
        );
        Notifier::new(port, messenger, delivery)
    }

    #[tokio::test]
    async fn empty_items_only_touch_last_updated() {
        let port = Arc::new(ScriptedPort {
            tasks: vec![task()],
            ..Default::default()
        });
        let messenger = Arc::new(ScriptedMessenger::default());

        notifier(port.clone(), messenger.clone())
            .check_and_send_items()
            .await
            .expect("cycle succeeds");

        assert_eq!(port.last_updated_calls.lock().clone(), vec![7]);
        assert!(port.last_got_item_calls.lock().is_empty());
        assert!(messenger.sends().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn items_are_delivered_oldest_first_with_flood_delay() {
        // Fetch order is newest first; item1 is the oldest and has no image.
        let port = Arc::new(ScriptedPort {
            tasks: vec![task()],
            items: vec![
                item("item3", Some("http://img/3.jpg")),
                item("item2", Some("http://img/2.jpg")),
                item("item1", None),
            ],
            ..Default::default()
        });
        let messenger = Arc::new(ScriptedMessenger {
            url_handle: Some("file_id".to_string()),
            ..Default::default()
        });

        let cache = Arc::new(MemoryCache::default());
        let delivery = ImageDelivery::new(
            messenger.clone(),
            cache.clone(),
            Arc::new(ScriptedFetcher::none()),
            86_400,
        );
        let worker = Notifier::new(port.clone(), messenger.clone(), delivery);

        let started = tokio::time::Instant::now();
        worker.check_and_send_items().await.expect("cycle succeeds");
        // Three items, 0.5 s flood pause after each.
        assert!(started.elapsed() >= Duration::from_millis(1500));

        let sends = messenger.sends();
        assert_eq!(sends.len(), 4);
        // Summary first, with a plain (non-markdown) caption.
        assert!(matches!(
            &sends[0],
            SendRecord::PhotoUrl { caption, markdown: false, .. }
                if caption.contains("3 items") && caption.contains("flats in Warsaw")
        ));
        // Then the oldest item as text, then the two photos in order.
        assert!(
            matches!(&sends[1], SendRecord::Text { text, .. } if text.contains("item1"))
        );
        assert!(matches!(
            &sends[2],
            SendRecord::PhotoUrl { url, caption, markdown: true, .. }
                if url == "http://img/2.jpg" && caption.contains("item2")
        ));
        assert!(matches!(
            &sends[3],
            SendRecord::PhotoUrl { url, caption, markdown: true, .. }
                if url == "http://img/3.jpg" && caption.contains("item3")
        ));

        // Each successful photo send cached its handle.
        let sets = cache.set_calls();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].0, "photo:http://img/2.jpg");
        assert_eq!(sets[1].0, "photo:http://img/3.jpg");

        assert_eq!(port.last_got_item_calls.lock().clone(), vec!["1".to_string()]);
        assert_eq!(port.last_updated_calls.lock().clone(), vec![7]);
    }

    #[tokio::test]
    async fn run_exits_when_shutdown_already_triggered() {
        let port = Arc::new(ScriptedPort::default());
        let messenger = Arc::new(ScriptedMessenger::default());
        let worker = notifier(port, messenger);

        let shutdown = Shutdown::new();
        shutdown.trigger();
        worker.run(Duration::from_secs(60), shutdown.listener()).await;
    }
}

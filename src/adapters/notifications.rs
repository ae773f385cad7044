//! Toast notification hub
//!
//! Fans notifications out to every connected UI over Server-Sent Events.
//!
//! - GET /api/notifications - SSE stream of notifications

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use schemaforge_core::notify::{Notification, NotificationSink};
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::debug;

use crate::adapters::api_handler::ApiState;

/// Default number of notifications buffered per subscriber
pub const DEFAULT_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct NotificationHub {
    sender: broadcast::Sender<Notification>,
}

impl NotificationHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl NotificationSink for NotificationHub {
    fn notify(&self, notification: Notification) {
        debug!(level = %notification.level, title = %notification.title, "posting notification");
        // No subscribers is not an error
        let _ = self.sender.send(notification);
    }
}

/// GET /api/notifications - Stream notifications via SSE
pub async fn stream_notifications(
    State(state): State<ApiState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.notifications.subscribe());

    let sse_stream = stream.filter_map(|result| match result {
        Ok(notification) => match serde_json::to_string(&notification) {
            Ok(json) => Some(Ok::<_, Infallible>(
                Event::default().event(notification.level.to_string()).data(json),
            )),
            Err(_) => None,
        },
        Err(_) => None, // Lagged
    });

    Sse::new(sse_stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hub_fans_out() {
        let hub = NotificationHub::new(8);
        let mut first = hub.subscribe();
        let mut second = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 2);

        hub.notify(Notification::success("Saved", "Order saved successfully"));

        assert_eq!(first.recv().await.unwrap().title, "Saved");
        assert_eq!(second.recv().await.unwrap().title, "Saved");
    }

    #[test]
    fn test_notify_without_subscribers() {
        let hub = NotificationHub::default();
        hub.notify(Notification::info("Nobody", "listening"));
        assert_eq!(hub.subscriber_count(), 0);
    }
}

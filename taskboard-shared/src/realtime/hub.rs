/// Per-project topic hub
///
/// Each project ID maps to its own `tokio::sync::broadcast` channel, created on
/// the first subscribe and dropped again once its last receiver is released.
/// Delivery is best-effort: a receiver that falls more than `capacity` frames
/// behind skips the frames it missed.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::protocol::Envelope;

pub type TopicReceiver = broadcast::Receiver<Arc<Envelope>>;

pub struct TopicHub {
    topics: RwLock<HashMap<String, broadcast::Sender<Arc<Envelope>>>>,
    capacity: usize,
}

impl TopicHub {
    /// `capacity` is the per-topic buffer; it must be non-zero
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn subscribe(&self, project_id: &str) -> TopicReceiver {
        let mut topics = self.topics.write().await;

        topics
            .entry(project_id.to_string())
            .or_insert_with(|| {
                debug!(project_id, "Creating realtime topic");
                broadcast::channel(self.capacity).0
            })
            .subscribe()
    }

    /// Sends to every current receiver of the envelope's topic
    ///
    /// Returns the number of receivers, including the publisher's own session
    /// when it has joined. A topic with no subscribers yields 0.
    pub async fn publish(&self, envelope: Envelope) -> usize {
        let topics = self.topics.read().await;

        match topics.get(&envelope.frame.project_id) {
            Some(sender) => sender.send(Arc::new(envelope)).unwrap_or(0),
            None => 0,
        }
    }

    /// Drops the topic if nobody is subscribed any more
    ///
    /// Call after the receiver obtained from [`subscribe`](Self::subscribe)
    /// has been dropped.
    pub async fn release(&self, project_id: &str) {
        let mut topics = self.topics.write().await;

        if let Some(sender) = topics.get(project_id) {
            if sender.receiver_count() == 0 {
                topics.remove(project_id);
                debug!(project_id, "Removed idle realtime topic");
            }
        }
    }

    pub async fn topic_count(&self) -> usize {
        self.topics.read().await.len()
    }

    pub async fn subscriber_count(&self, project_id: &str) -> usize {
        self.topics
            .read()
            .await
            .get(project_id)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::protocol::{EventName, Origin, ServerFrame};
    use serde_json::json;
    use tokio::sync::broadcast::error::{RecvError, TryRecvError};
    use uuid::Uuid;

    fn envelope(project_id: &str, n: i64) -> Envelope {
        Envelope {
            origin: Origin::Session(Uuid::new_v4()),
            frame: ServerFrame {
                event: EventName::TaskUpdated,
                project_id: project_id.to_string(),
                payload: json!({ "n": n }),
            },
        }
    }

    #[tokio::test]
    async fn test_topics_are_isolated() {
        let hub = TopicHub::new(16);
        let mut a = hub.subscribe("a").await;
        let mut b = hub.subscribe("b").await;

        assert_eq!(hub.publish(envelope("a", 1)).await, 1);

        assert_eq!(a.recv().await.unwrap().frame.payload, json!({"n": 1}));
        assert!(matches!(b.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_publish_without_topic_is_noop() {
        let hub = TopicHub::new(16);
        assert_eq!(hub.publish(envelope("nobody", 1)).await, 0);
        assert_eq!(hub.topic_count().await, 0);
    }

    #[tokio::test]
    async fn test_release_prunes_only_idle_topics() {
        let hub = TopicHub::new(16);
        let first = hub.subscribe("p").await;
        let second = hub.subscribe("p").await;
        assert_eq!(hub.subscriber_count("p").await, 2);

        drop(first);
        hub.release("p").await;
        assert_eq!(hub.topic_count().await, 1);

        drop(second);
        hub.release("p").await;
        assert_eq!(hub.topic_count().await, 0);
    }

    #[tokio::test]
    async fn test_lagging_receiver_skips_frames() {
        let hub = TopicHub::new(2);
        let mut rx = hub.subscribe("p").await;

        for n in 0..5 {
            hub.publish(envelope("p", n)).await;
        }

        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(3))));
        assert_eq!(rx.recv().await.unwrap().frame.payload, json!({"n": 3}));
        assert_eq!(rx.recv().await.unwrap().frame.payload, json!({"n": 4}));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        assert_eq!(TopicHub::new(0).capacity(), 1);
    }
}

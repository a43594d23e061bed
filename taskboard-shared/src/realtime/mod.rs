/// Realtime fan-out partitioned by project
///
/// Connected clients join project topics and publish `task-updated` /
/// `comment-added` frames, which are rebroadcast verbatim to every other
/// subscriber of the same project. Nothing on this path is authorized,
/// validated or persisted; frames are ephemeral refetch signals.
///
/// # Architecture
///
/// ```text
///  WebSocket ─> Session ─publish─> Fanout ─> TopicHub (broadcast per project) ─> other Sessions
///                                     │
///                                     └─> RedisRelay ─PUBLISH─> other instances
/// ```
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskboard_shared::realtime::{hub::TopicHub, session::Session, Fanout};
///
/// # async fn example() {
/// let fanout = Fanout::local(Arc::new(TopicHub::new(256)));
/// let (mut session, _outbound) = Session::new(fanout.clone());
/// session.join("project-1".to_string()).await;
/// # }
/// ```

pub mod hub;
pub mod protocol;
pub mod relay;
pub mod session;

use std::sync::Arc;
use tracing::warn;

use crate::redis::RedisClientError;
use hub::TopicHub;
use protocol::{Envelope, Origin, ServerFrame};
use relay::RedisRelay;

#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    #[error("Relay transport error: {0}")]
    Redis(#[from] RedisClientError),

    #[error("Relay message error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Publishes frames to the local hub and, when configured, the Redis relay
#[derive(Clone)]
pub struct Fanout {
    hub: Arc<TopicHub>,
    relay: Option<Arc<RedisRelay>>,
}

impl Fanout {
    /// Single-instance fan-out with no relay
    pub fn local(hub: Arc<TopicHub>) -> Self {
        Self { hub, relay: None }
    }

    pub fn with_relay(hub: Arc<TopicHub>, relay: Arc<RedisRelay>) -> Self {
        Self {
            hub,
            relay: Some(relay),
        }
    }

    pub fn hub(&self) -> &Arc<TopicHub> {
        &self.hub
    }

    pub fn relay(&self) -> Option<&Arc<RedisRelay>> {
        self.relay.as_ref()
    }

    /// Delivers locally, then relays; a relay failure is logged, not returned
    ///
    /// Returns the number of local receivers.
    pub async fn publish(&self, origin: Origin, frame: ServerFrame) -> usize {
        if let Some(relay) = &self.relay {
            if let Err(e) = relay.publish(&frame).await {
                warn!(error = %e, project_id = %frame.project_id, "Failed to relay realtime frame");
            }
        }

        self.hub.publish(Envelope { origin, frame }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::EventName;
    use serde_json::json;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_local_publish_reaches_hub() {
        let fanout = Fanout::local(Arc::new(TopicHub::new(8)));
        assert!(fanout.relay().is_none());

        let mut rx = fanout.hub().subscribe("p").await;
        let delivered = fanout
            .publish(
                Origin::Session(Uuid::new_v4()),
                ServerFrame {
                    event: EventName::TaskUpdated,
                    project_id: "p".to_string(),
                    payload: json!({"ok": true}),
                },
            )
            .await;

        assert_eq!(delivered, 1);
        assert_eq!(rx.recv().await.unwrap().frame.payload, json!({"ok": true}));
    }
}

/// Redis pub/sub relay between API instances
///
/// Frames published locally are also `PUBLISH`ed on
/// `taskboard:project:<project_id>` tagged with this instance's ID. Every
/// instance pattern-subscribes to `taskboard:project:*` and re-injects frames
/// from *other* instances into its own hub.

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::hub::TopicHub;
use super::protocol::{Envelope, Origin, ServerFrame};
use super::RealtimeError;
use crate::redis::{RedisClient, RedisClientError};

pub const CHANNEL_PREFIX: &str = "taskboard:project:";

const RECONNECT_DELAY: Duration = Duration::from_secs(2);

pub fn channel_for(project_id: &str) -> String {
    format!("{CHANNEL_PREFIX}{project_id}")
}

/// Message body on the Redis channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayMessage {
    pub instance_id: Uuid,
    pub frame: ServerFrame,
}

pub struct RedisRelay {
    client: RedisClient,
    instance_id: Uuid,
}

impl RedisRelay {
    pub fn new(client: RedisClient) -> Self {
        Self::with_instance_id(client, Uuid::new_v4())
    }

    pub fn with_instance_id(client: RedisClient, instance_id: Uuid) -> Self {
        Self {
            client,
            instance_id,
        }
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn client(&self) -> &RedisClient {
        &self.client
    }

    pub async fn publish(&self, frame: &ServerFrame) -> Result<(), RealtimeError> {
        let body = encode(self.instance_id, frame)?;
        self.client
            .publish(&channel_for(&frame.project_id), &body)
            .await?;
        Ok(())
    }

    /// Runs the listener until the task is aborted, reconnecting on failure
    pub fn spawn_listener(self: Arc<Self>, hub: Arc<TopicHub>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match self.listen(&hub).await {
                    Ok(()) => warn!("Realtime relay subscription closed, reconnecting"),
                    Err(e) => warn!(error = %e, "Realtime relay failed, reconnecting"),
                }
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        })
    }

    async fn listen(&self, hub: &TopicHub) -> Result<(), RealtimeError> {
        let mut pubsub = self.client.pubsub().await?;
        pubsub
            .psubscribe(format!("{CHANNEL_PREFIX}*"))
            .await
            .map_err(RedisClientError::from)?;

        info!(instance_id = %self.instance_id, "Realtime relay subscribed");

        let mut messages = pubsub.on_message();
        while let Some(msg) = messages.next().await {
            let body: String = match msg.get_payload() {
                Ok(body) => body,
                Err(e) => {
                    warn!(error = %e, "Unreadable relay payload");
                    continue;
                }
            };

            match decode(self.instance_id, &body) {
                Ok(Some(envelope)) => {
                    let delivered = hub.publish(envelope).await;
                    debug!(delivered, "Relayed frame from another instance");
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Malformed relay message"),
            }
        }

        Ok(())
    }
}

pub fn encode(instance_id: Uuid, frame: &ServerFrame) -> Result<String, RealtimeError> {
    let message = RelayMessage {
        instance_id,
        frame: frame.clone(),
    };
    Ok(serde_json::to_string(&message)?)
}

/// Turns a relay message into a hub envelope, or `None` if this instance sent it
pub fn decode(local_instance: Uuid, body: &str) -> Result<Option<Envelope>, RealtimeError> {
    let message: RelayMessage = serde_json::from_str(body)?;

    if message.instance_id == local_instance {
        return Ok(None);
    }

    Ok(Some(Envelope {
        origin: Origin::Instance(message.instance_id),
        frame: message.frame,
    }))
}

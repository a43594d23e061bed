/// Realtime wire frames
///
/// Client → server (JSON text frames, tagged by `type`):
///
/// ```json
/// {"type": "join-project",  "projectId": "p1"}
/// {"type": "leave-project", "projectId": "p1"}
/// {"type": "task-updated",  "projectId": "p1", "payload": {...}}
/// {"type": "comment-added", "projectId": "p1", "payload": {...}}
/// ```
///
/// Server → client:
///
/// ```json
/// {"type": "task-updated", "projectId": "p1", "payload": {...}}
/// ```
///
/// Project IDs are opaque strings on this path; payloads are relayed
/// verbatim and never inspected.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Events a subscriber may publish to a project topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventName {
    TaskUpdated,
    CommentAdded,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    JoinProject {
        #[serde(rename = "projectId")]
        project_id: String,
    },
    LeaveProject {
        #[serde(rename = "projectId")]
        project_id: String,
    },
    TaskUpdated {
        #[serde(rename = "projectId")]
        project_id: String,
        #[serde(default)]
        payload: Value,
    },
    CommentAdded {
        #[serde(rename = "projectId")]
        project_id: String,
        #[serde(default)]
        payload: Value,
    },
}

impl ClientMessage {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Splits a publish message into the frame to broadcast
    pub fn into_frame(self) -> Option<ServerFrame> {
        match self {
            ClientMessage::TaskUpdated { project_id, payload } => Some(ServerFrame {
                event: EventName::TaskUpdated,
                project_id,
                payload,
            }),
            ClientMessage::CommentAdded { project_id, payload } => Some(ServerFrame {
                event: EventName::CommentAdded,
                project_id,
                payload,
            }),
            ClientMessage::JoinProject { .. } | ClientMessage::LeaveProject { .. } => None,
        }
    }
}

/// Frame delivered to subscribers of a project topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerFrame {
    #[serde(rename = "type")]
    pub event: EventName,
    pub project_id: String,
    pub payload: Value,
}

/// Where a frame entered this process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Origin {
    /// A WebSocket session on this instance
    Session(Uuid),

    /// Another API instance, via the Redis relay
    Instance(Uuid),
}

/// A frame plus its origin, as carried through the hub
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub origin: Origin,
    pub frame: ServerFrame,
}

impl Envelope {
    /// True when the frame was published by `session` and must not echo back
    pub fn is_from(&self, session: Uuid) -> bool {
        self.origin == Origin::Session(session)
    }
}

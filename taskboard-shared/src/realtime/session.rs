/// One connected realtime client
///
/// A session tracks the topics it has joined. Each join spawns a forwarding
/// task that copies frames from the topic into the session's outbound queue,
/// skipping frames the session published itself. The transport (the
/// WebSocket handler) drains that queue.

use std::collections::HashMap;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use super::hub::TopicReceiver;
use super::protocol::{ClientMessage, Origin, ServerFrame};
use super::Fanout;

/// Outbound frames buffered per session before forwarders start lagging
pub const OUTBOUND_BUFFER: usize = 64;

pub struct Session {
    id: Uuid,
    fanout: Fanout,
    outbound: mpsc::Sender<ServerFrame>,
    joined: HashMap<String, JoinHandle<()>>,
}

impl Session {
    /// Creates a session and the receiver its transport should drain
    pub fn new(fanout: Fanout) -> (Self, mpsc::Receiver<ServerFrame>) {
        let (outbound, rx) = mpsc::channel(OUTBOUND_BUFFER);

        let session = Self {
            id: Uuid::new_v4(),
            fanout,
            outbound,
            joined: HashMap::new(),
        };

        (session, rx)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn joined(&self) -> impl Iterator<Item = &str> {
        self.joined.keys().map(String::as_str)
    }

    pub async fn handle(&mut self, message: ClientMessage) {
        match message {
            ClientMessage::JoinProject { project_id } => self.join(project_id).await,
            ClientMessage::LeaveProject { project_id } => self.leave(&project_id).await,
            publish => {
                if let Some(frame) = publish.into_frame() {
                    self.fanout.publish(Origin::Session(self.id), frame).await;
                }
            }
        }
    }

    /// Joining a topic twice is a no-op
    pub async fn join(&mut self, project_id: String) {
        if self.joined.contains_key(&project_id) {
            return;
        }

        let rx = self.fanout.hub().subscribe(&project_id).await;
        let forwarder = tokio::spawn(forward(self.id, rx, self.outbound.clone()));

        debug!(session_id = %self.id, project_id = %project_id, "Joined project topic");
        self.joined.insert(project_id, forwarder);
    }

    pub async fn leave(&mut self, project_id: &str) {
        if let Some(forwarder) = self.joined.remove(project_id) {
            forwarder.abort();
            let _ = forwarder.await;
            self.fanout.hub().release(project_id).await;
            debug!(session_id = %self.id, project_id, "Left project topic");
        }
    }

    /// Leaves every joined topic
    pub async fn close(&mut self) {
        let topics: Vec<String> = self.joined.keys().cloned().collect();
        for project_id in topics {
            self.leave(&project_id).await;
        }
    }
}

async fn forward(session: Uuid, mut rx: TopicReceiver, outbound: mpsc::Sender<ServerFrame>) {
    loop {
        match rx.recv().await {
            Ok(envelope) => {
                if envelope.is_from(session) {
                    continue;
                }
                if outbound.send(envelope.frame.clone()).await.is_err() {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                debug!(session_id = %session, skipped, "Realtime subscriber lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::hub::TopicHub;
    use crate::realtime::protocol::EventName;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    fn fanout() -> Fanout {
        Fanout::local(Arc::new(TopicHub::new(16)))
    }

    fn publish(project_id: &str, n: i64) -> ClientMessage {
        ClientMessage::TaskUpdated {
            project_id: project_id.to_string(),
            payload: json!({ "n": n }),
        }
    }

    async fn next(rx: &mut mpsc::Receiver<ServerFrame>) -> Option<ServerFrame> {
        timeout(Duration::from_millis(200), rx.recv()).await.ok().flatten()
    }

    #[tokio::test]
    async fn test_other_subscribers_receive_publisher_does_not() {
        let fanout = fanout();
        let (mut alice, mut alice_rx) = Session::new(fanout.clone());
        let (mut bob, mut bob_rx) = Session::new(fanout.clone());

        alice.join("p1".to_string()).await;
        bob.join("p1".to_string()).await;

        alice.handle(publish("p1", 7)).await;

        let frame = next(&mut bob_rx).await.unwrap();
        assert_eq!(frame.event, EventName::TaskUpdated);
        assert_eq!(frame.project_id, "p1");
        assert_eq!(frame.payload, json!({"n": 7}));

        assert!(next(&mut alice_rx).await.is_none());
    }

    #[tokio::test]
    async fn test_publisher_need_not_join() {
        let fanout = fanout();
        let (mut outsider, _outsider_rx) = Session::new(fanout.clone());
        let (mut member, mut member_rx) = Session::new(fanout.clone());

        member.join("p1".to_string()).await;
        outsider.handle(publish("p1", 1)).await;

        assert!(next(&mut member_rx).await.is_some());
    }

    #[tokio::test]
    async fn test_other_projects_not_delivered() {
        let fanout = fanout();
        let (mut alice, _alice_rx) = Session::new(fanout.clone());
        let (mut bob, mut bob_rx) = Session::new(fanout.clone());

        bob.join("p2".to_string()).await;
        alice.handle(publish("p1", 1)).await;

        assert!(next(&mut bob_rx).await.is_none());
    }

    #[tokio::test]
    async fn test_leave_stops_delivery_and_prunes_topic() {
        let fanout = fanout();
        let (mut alice, _alice_rx) = Session::new(fanout.clone());
        let (mut bob, mut bob_rx) = Session::new(fanout.clone());

        bob.handle(ClientMessage::JoinProject {
            project_id: "p1".to_string(),
        })
        .await;
        bob.handle(ClientMessage::LeaveProject {
            project_id: "p1".to_string(),
        })
        .await;

        assert_eq!(fanout.hub().topic_count().await, 0);

        alice.handle(publish("p1", 1)).await;
        assert!(next(&mut bob_rx).await.is_none());
    }

    #[tokio::test]
    async fn test_double_join_is_single_subscription() {
        let fanout = fanout();
        let (mut bob, _bob_rx) = Session::new(fanout.clone());

        bob.join("p1".to_string()).await;
        bob.join("p1".to_string()).await;

        assert_eq!(fanout.hub().subscriber_count("p1").await, 1);
        assert_eq!(bob.joined().count(), 1);
    }

    #[tokio::test]
    async fn test_close_leaves_everything() {
        let fanout = fanout();
        let (mut bob, _bob_rx) = Session::new(fanout.clone());

        bob.join("p1".to_string()).await;
        bob.join("p2".to_string()).await;
        bob.close().await;

        assert_eq!(fanout.hub().topic_count().await, 0);
        assert_eq!(bob.joined().count(), 0);
    }
}

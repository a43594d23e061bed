/// Realtime WebSocket endpoint
///
/// ```text
/// GET /ws  (Upgrade: websocket)
/// ```
///
/// Client frames:
///
/// ```json
/// {"type": "join-project", "projectId": "..."}
/// {"type": "leave-project", "projectId": "..."}
/// {"type": "task-updated", "projectId": "...", "payload": {...}}
/// {"type": "comment-added", "projectId": "...", "payload": {...}}
/// ```
///
/// Published payloads reach every other connection that joined the project
/// as `{"type", "projectId", "payload"}`. Frames that do not parse are
/// ignored. The connection is not authenticated.

use crate::app::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use taskboard_shared::realtime::{
    protocol::{ClientMessage, ServerFrame},
    session::Session,
    Fanout,
};
use tracing::{debug, info, warn};

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state.fanout))
}

async fn handle_socket(socket: WebSocket, fanout: Fanout) {
    let (mut sink, mut stream) = socket.split();
    let (mut session, mut outbound) = Session::new(fanout);
    let session_id = session.id();

    info!(session_id = %session_id, "Realtime client connected");

    let mut writer = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            let Some(message) = encode(&frame) else {
                continue;
            };
            if sink.send(message).await.is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => match ClientMessage::parse(&text) {
                    Ok(message) => session.handle(message).await,
                    Err(e) => debug!(session_id = %session_id, error = %e, "Ignoring malformed realtime frame"),
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(session_id = %session_id, error = %e, "Realtime socket error");
                    break;
                }
            },
            _ = &mut writer => break,
        }
    }

    session.close().await;
    writer.abort();

    info!(session_id = %session_id, "Realtime client disconnected");
}

fn encode(frame: &ServerFrame) -> Option<Message> {
    match serde_json::to_string(frame) {
        Ok(text) => Some(Message::Text(text)),
        Err(e) => {
            warn!(error = %e, project_id = %frame.project_id, "Failed to encode realtime frame");
            None
        }
    }
}

//! Viewer websocket: streams `toggleLoading` / `syncAll` / `syncQuestion`
//! messages to the presentation context.

use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use recollect_sync::{BroadcastViewer, ViewerMessage};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::state::AppState;

/// GET /ws
async fn viewer_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| forward_messages(socket, state.viewer))
}

fn encode(message: &ViewerMessage) -> Option<Message> {
    match serde_json::to_string(message) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            warn!(error = %e, kind = message.kind(), "viewer message could not be encoded");
            None
        }
    }
}

/// Relays broadcast messages to one viewer until either side goes away.
/// Inbound frames are ignored apart from close.
async fn forward_messages(mut socket: WebSocket, viewer: BroadcastViewer) {
    let viewer_id = Uuid::new_v4();
    let mut receiver = viewer.subscribe();
    info!(viewer_id = %viewer_id, "viewer connected");

    loop {
        tokio::select! {
            outbound = receiver.recv() => match outbound {
                Ok(message) => {
                    let Some(frame) = encode(&message) else { continue };
                    if socket.send(frame).await.is_err() {
                        debug!(viewer_id = %viewer_id, "viewer socket closed");
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(viewer_id = %viewer_id, skipped, "viewer lagging, messages dropped");
                }
                Err(RecvError::Closed) => break,
            },
            inbound = socket.recv() => match inbound {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(viewer_id = %viewer_id, error = %e, "viewer receive error");
                    break;
                }
            },
        }
    }

    info!(viewer_id = %viewer_id, "viewer disconnected");
}

/// Returns the router for the viewer context.
pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(viewer_socket))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_produces_type_tagged_text_frame() {
        // Arrange
        let message = ViewerMessage::ToggleLoading { value: true };

        // Act
        let frame = encode(&message).unwrap();

        // Assert
        let Message::Text(text) = frame else {
            panic!("expected a text frame");
        };
        let json: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(json["type"], "toggleLoading");
        assert_eq!(json["value"], true);
    }
}

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::select;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use super::messages::{ClientMessage, ServerMessage};
use crate::engine::FeedState;
use crate::models::ConnectionId;

/// Handle WebSocket upgrade request
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<FeedState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle WebSocket connection
///
/// The session owns the sending half of an unbounded channel; this task
/// drains it into the socket and feeds inbound frames to the lifecycle.
async fn handle_socket(socket: WebSocket, state: FeedState) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ServerMessage>();

    let connection_id = state.lifecycle.connect(Arc::new(outbound_tx));

    loop {
        select! {
            // Handle incoming messages from client
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_client_message(&text, connection_id, &state);
                    }
                    Some(Ok(Message::Close(_))) => break,
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        error!("WebSocket error on {}: {}", connection_id, e);
                        break;
                    }
                    None => break,
                    _ => {}
                }
            }

            // Forward server messages queued for this connection
            outbound = outbound_rx.recv() => {
                let Some(server_msg) = outbound else { break };
                match serde_json::to_string(&server_msg) {
                    Ok(json) => {
                        if sender.send(Message::Text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => error!("Failed to encode message for {}: {}", connection_id, e),
                }
            }
        }
    }

    state.lifecycle.disconnect(connection_id);
    info!("WebSocket connection closed: {}", connection_id);
}

/// Decode one text frame and dispatch it; malformed frames are dropped
fn handle_client_message(text: &str, connection_id: ConnectionId, state: &FeedState) {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(client_msg) => state.lifecycle.handle(connection_id, client_msg),
        Err(e) => debug!("Ignoring malformed frame from {}: {}", connection_id, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PriceSimulator;
    use std::time::Duration;

    fn connected_state() -> (FeedState, ConnectionId, mpsc::UnboundedReceiver<ServerMessage>) {
        let state = FeedState::new(PriceSimulator::with_seed(2), Duration::from_secs(1));
        let (tx, rx) = mpsc::unbounded_channel();
        let id = state.lifecycle.connect(Arc::new(tx));
        (state, id, rx)
    }

    #[test]
    fn test_text_frames_drive_lifecycle() {
        let (state, id, mut rx) = connected_state();

        handle_client_message(r#"{"event":"login","data":"bob@example.com"}"#, id, &state);
        handle_client_message(r#"{"event":"subscribe","data":"TSLA"}"#, id, &state);

        assert!(matches!(rx.try_recv().unwrap(), ServerMessage::LoginSuccess(_)));
        assert_eq!(rx.try_recv().unwrap(), ServerMessage::Subscribed("TSLA".to_string()));
        assert!(matches!(rx.try_recv().unwrap(), ServerMessage::PriceUpdate(_)));
    }

    #[test]
    fn test_malformed_frames_are_ignored() {
        let (state, id, mut rx) = connected_state();

        handle_client_message("not json", id, &state);
        handle_client_message(r#"{"event":"login"}"#, id, &state);
        handle_client_message(r#"{"event":"subscribe","data":42}"#, id, &state);

        assert!(rx.try_recv().is_err());
        assert_eq!(state.registry.authenticated_count(), 0);
    }
}

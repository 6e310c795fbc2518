//! WebSocket endpoint
//!
//! One socket per client. Inbound text frames are `ClientRequest` JSON;
//! outbound frames are whatever the gateway queues for this connection.
//! The dispatch pipeline itself is synchronous; this handler only moves
//! bytes between the socket and the gateway channel.

use crate::protocol::ClientRequest;
use crate::state::ServerState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use std::sync::Arc;

pub async fn ws_handler(
    State(state): State<Arc<ServerState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<ServerState>) {
    let (conn, mut events) = state.gateway.register();
    tracing::info!("connection {conn:?} opened");

    loop {
        tokio::select! {
            inbound = socket.recv() => match inbound {
                Some(Ok(Message::Text(text))) => handle_frame(&state, conn, &text),
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!("connection {conn:?} socket error: {e}");
                    break;
                }
            },
            outbound = events.recv() => match outbound {
                Some(event) => {
                    let payload = match serde_json::to_string(&event) {
                        Ok(payload) => payload,
                        Err(e) => {
                            tracing::error!("failed to encode event: {e}");
                            continue;
                        }
                    };
                    if socket.send(Message::Text(payload)).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    state.gateway.unregister(conn);
    state.registry.unbind_connection(conn);
    tracing::info!("connection {conn:?} closed");
}

fn handle_frame(state: &ServerState, conn: crate::broadcast::ConnectionId, text: &str) {
    match serde_json::from_str::<ClientRequest>(text) {
        Ok(request) => state.registry.dispatch(&state.gateway, conn, request),
        Err(e) => {
            tracing::debug!("connection {conn:?} sent malformed request: {e}");
            state.gateway.send(
                conn,
                &crate::protocol::ServerEvent::ActionRejected {
                    reason_code: "MALFORMED_REQUEST".to_string(),
                    message: e.to_string(),
                },
            );
        }
    }
}

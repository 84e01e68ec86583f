//! WebSocket endpoint that pushes new gestures to dashboards.
//!
//! Clients send no application messages. The read half is only watched for
//! close and error; ping/pong is answered by the transport.

use crate::state::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use futures::{SinkExt, StreamExt};
use gestura_core::GestureHub;
use std::sync::Arc;

pub fn realtime_routes(path: &str) -> Router<AppState> {
    Router::new().route(path, get(upgrade))
}

async fn upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

async fn handle_socket(socket: WebSocket, hub: Arc<GestureHub>) {
    let mut connection = hub.broadcaster().register();
    let id = connection.id;
    tracing::info!(connection = id, "WebSocket client connected");

    let (mut sink, mut stream) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = connection.recv().await {
            if let Err(e) = sink.send(Message::Text(frame.to_string().into())).await {
                tracing::debug!(connection = id, "WebSocket send failed: {}", e);
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = stream.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(connection = id, "WebSocket error: {}", e);
                    break;
                }
            }
        }
    });

    // Whichever half finishes first ends the connection.
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    hub.broadcaster().unregister(id);
    tracing::info!(connection = id, "WebSocket client disconnected");
}

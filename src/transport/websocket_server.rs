use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{error, info, warn};

use crate::{
    common::{ListenerId, ProtocolError, now_ms},
    protocol::{IncomingMessage, OutgoingMessage},
    server::{AppState, Session, handle_disconnect, handle_message},
    transport::middleware::authorized,
};

pub async fn websocket_handler(
    headers: HeaderMap,
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Result<Response, (StatusCode, &'static str)> {
    if !authorized(&state, &headers) {
        warn!("WebSocket authorization failed");
        return Err((StatusCode::UNAUTHORIZED, "Unauthorized"));
    }

    if let Some(name) = headers.get("client-name").and_then(|h| h.to_str().ok()) {
        info!("Incoming connection from client: {}", name);
    }

    Ok(ws
        .on_upgrade(move |socket| handle_socket(socket, state))
        .into_response())
}

pub async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let (tx, rx) = flume::unbounded();
    let session = Arc::new(Session::new(ListenerId::generate(), tx));
    let listener_id = session.listener_id.clone();
    state.gateway.register(session.clone());
    info!("WebSocket connected: listener={}", listener_id);

    session.send_message(&OutgoingMessage::Ready {
        listener_id: listener_id.clone(),
    });

    loop {
        tokio::select! {
            Ok(msg) = rx.recv_async() => {
                if let Err(e) = socket.send(msg).await {
                    error!("Socket send error: listener={} err={}", listener_id, e);
                    break;
                }
            }
            msg = socket.recv() => {
                let msg = match msg {
                    Some(Ok(msg)) => msg,
                    Some(Err(e)) => {
                        warn!("WebSocket error: listener={} err={}", listener_id, e);
                        break;
                    }
                    None => break,
                };

                let result = match msg {
                    Message::Text(text) => IncomingMessage::parse(text.as_str())
                        .map(|incoming| handle_message(&state, &session, incoming, now_ms())),
                    Message::Binary(_) => Err(ProtocolError::BinaryFrame),
                    Message::Close(_) => break,
                    // axum answers pings itself
                    _ => Ok(()),
                };

                if let Err(e) = result {
                    warn!("Rejected message from {}: {}", listener_id, e);
                    session.send_message(&OutgoingMessage::Error {
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    handle_disconnect(&state, &session);
    state.gateway.unregister(&listener_id);
    info!("Connection closed: listener={}", listener_id);
}

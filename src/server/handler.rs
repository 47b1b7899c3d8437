use tracing::{debug, info};

use crate::{
    protocol::{IncomingMessage, vote_kind_text},
    room::EnqueueRequest,
    server::{AppState, Session},
};

/// Applies one inbound listener event to the room registry.
pub fn handle_message(state: &AppState, session: &Session, msg: IncomingMessage, now_ms: u64) {
    let registry = &state.registry;
    let gateway = state.gateway.as_ref();
    let listener = &session.listener_id;

    match msg {
        IncomingMessage::Join { room_id } => {
            if let Some(previous) = session.set_room(Some(room_id.clone())) {
                if previous != room_id {
                    registry.leave(&previous, listener);
                    debug!("{} moved from room {} to {}", listener, previous, room_id);
                }
            }
            registry.join(&room_id, listener, now_ms, gateway);
        }
        IncomingMessage::Leave => {
            if let Some(room_id) = session.set_room(None) {
                registry.leave(&room_id, listener);
            }
        }
        IncomingMessage::Enqueue {
            room_id,
            url,
            title,
            duration,
        } => {
            let request = EnqueueRequest::from_wire(url, title, duration.as_ref());
            let item = registry.enqueue(&room_id, request, now_ms, gateway);
            info!("[{}] {} enqueued {} ({})", room_id, listener, item.id, item.url);
        }
        IncomingMessage::Vote { queue_id, kind } => {
            let Some(room_id) = session.room() else {
                debug!("{} voted without joining a room", listener);
                return;
            };
            let kind = vote_kind_text(kind.as_ref());
            registry.vote(&room_id, listener, &queue_id, kind, now_ms, gateway);
        }
    }
}

/// Connection closed: leave the last joined room.
pub fn handle_disconnect(state: &AppState, session: &Session) {
    if let Some(room_id) = session.set_room(None) {
        state.registry.leave(&room_id, &session.listener_id);
    }
}

use axum::extract::ws::Message;
use parking_lot::Mutex;

use crate::{
    common::{ListenerId, RoomId},
    protocol::OutgoingMessage,
};

/// One websocket connection.
pub struct Session {
    pub listener_id: ListenerId,
    /// Sender for outgoing WS messages, drained by the socket task.
    sender: flume::Sender<Message>,
    /// Last room joined; `vote` and disconnect act on it.
    room: Mutex<Option<RoomId>>,
}

impl Session {
    pub fn new(listener_id: ListenerId, sender: flume::Sender<Message>) -> Self {
        Self {
            listener_id,
            sender,
            room: Mutex::new(None),
        }
    }

    pub fn room(&self) -> Option<RoomId> {
        self.room.lock().clone()
    }

    /// Records `room` as current and returns the previous one.
    pub fn set_room(&self, room: Option<RoomId>) -> Option<RoomId> {
        std::mem::replace(&mut *self.room.lock(), room)
    }

    /// Queue a typed message. Never blocks; a closed socket drops it.
    pub fn send_message(&self, msg: &OutgoingMessage) {
        match serde_json::to_string(msg) {
            Ok(json) => {
                let _ = self.sender.send(Message::Text(json.into()));
            }
            Err(e) => tracing::error!("Failed to encode message for {}: {}", self.listener_id, e),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        tracing::debug!("Dropping session: {}", self.listener_id);
    }
}

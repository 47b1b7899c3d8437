use serde::{Deserialize, Serialize};

use crate::{
    common::{ListenerId, QueueId, RoomId},
    room::QueueItem,
};

/// Messages sent from server to listeners over WebSocket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum OutgoingMessage {
    #[serde(rename_all = "camelCase")]
    Ready { listener_id: ListenerId },
    #[serde(rename_all = "camelCase")]
    QueueUpdated { room_id: RoomId, queue: Vec<QueueItem> },
    #[serde(rename_all = "camelCase")]
    NowPlaying {
        queue_id: QueueId,
        url: String,
        title: String,
        /// Unix timestamp in milliseconds.
        started_at: u64,
        /// Seconds.
        duration: u64,
    },
    #[serde(rename_all = "camelCase")]
    Sync { queue_id: QueueId, position: u64 },
    #[serde(rename_all = "camelCase")]
    VotesUpdated {
        queue_id: QueueId,
        likes: usize,
        skips: usize,
    },
    Error { message: String },
}

/// Who receives an outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// Every listener currently in the room.
    Room,
    Listener(ListenerId),
}

/// A message produced by a room transition, not yet delivered.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub to: Recipient,
    pub message: OutgoingMessage,
}

impl Outbound {
    pub fn room(message: OutgoingMessage) -> Self {
        Self {
            to: Recipient::Room,
            message,
        }
    }

    pub fn direct(listener: &ListenerId, message: OutgoingMessage) -> Self {
        Self {
            to: Recipient::Listener(listener.clone()),
            message,
        }
    }
}

use serde::Deserialize;
use serde_json::Value;

use crate::{
    common::{ProtocolError, QueueId, RoomId},
    room::EnqueueRequest,
};

/// Messages sent from a listener to the server over WebSocket.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum IncomingMessage {
    #[serde(alias = "join-room", rename_all = "camelCase")]
    Join { room_id: RoomId },
    Leave,
    #[serde(rename_all = "camelCase")]
    Enqueue {
        room_id: RoomId,
        #[serde(default)]
        url: String,
        #[serde(default)]
        title: Option<String>,
        /// Any JSON value; unusable values fall back to the room default.
        #[serde(default)]
        duration: Option<Value>,
    },
    #[serde(rename_all = "camelCase")]
    Vote {
        #[serde(default)]
        queue_id: QueueId,
        /// Kept raw so unknown vote types are dropped by the room, not rejected here.
        #[serde(rename = "type", default)]
        kind: Option<Value>,
    },
}

impl IncomingMessage {
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Numeric reading of a loosely typed duration: numbers and numeric strings.
pub fn numeric_duration(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Vote type as text; non-string values become empty and are ignored downstream.
pub fn vote_kind_text(value: Option<&Value>) -> &str {
    match value {
        Some(Value::String(s)) => s.as_str(),
        _ => "",
    }
}

impl EnqueueRequest {
    pub fn from_wire(url: String, title: Option<String>, duration: Option<&Value>) -> Self {
        Self {
            url,
            title,
            duration: numeric_duration(duration),
        }
    }
}

use serde::Serialize;

use crate::{
    common::{QueueId, RoomId},
    room::{QueueItem, VoteCounts},
};

#[derive(Debug, Serialize)]
pub struct Health {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    pub version: Version,
    pub build_time: u64,
    pub git: GitInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub semver: String,
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GitInfo {
    pub branch: String,
    pub commit: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Milliseconds since startup.
    pub uptime: u64,
    pub rooms: usize,
    pub playing_rooms: usize,
    /// Listeners joined to a room.
    pub listeners: usize,
    /// Open websocket connections, joined or not.
    pub connections: usize,
    /// Resident set size in bytes, 0 where unavailable.
    pub memory: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NowPlayingView {
    pub queue_id: QueueId,
    pub url: String,
    pub title: String,
    pub started_at: u64,
    pub duration: u64,
    pub position: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub room_id: RoomId,
    pub listeners: usize,
    pub queue_length: usize,
    pub pending: usize,
    pub now_playing: Option<QueueId>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub listeners: usize,
    pub queue: Vec<QueueItem>,
    pub now_playing: Option<NowPlayingView>,
    pub votes: VoteCounts,
}

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::{
    common::{ListenerId, QueueId, RoomId, Shared},
    configs::RoomConfig,
    protocol::{OutgoingMessage, Outbound, Recipient, RoomSnapshot, RoomSummary},
    room::{EnqueueRequest, QueueItem, Room, RoomSettings},
};

/// Delivers a message to one connected listener.
///
/// Called while the room lock is held, so implementations must not block
/// and must not call back into the registry.
pub trait Broadcaster: Send + Sync {
    fn deliver(&self, listener: &ListenerId, message: &OutgoingMessage);
}

/// What one pass of the ticker did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub synced: usize,
    pub advanced: usize,
    pub evicted: usize,
}

/// All rooms of the process. Rooms are created on first reference and are
/// locked individually; operations on different rooms never contend.
pub struct RoomRegistry {
    rooms: DashMap<RoomId, Shared<Room>>,
    settings: RoomSettings,
    evict_idle: bool,
}

impl RoomRegistry {
    pub fn new(config: &RoomConfig) -> Self {
        Self {
            rooms: DashMap::new(),
            settings: RoomSettings::from(config),
            evict_idle: config.evict_idle_rooms,
        }
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    /// Runs `f` on the room, creating it if needed. The shard lock is released
    /// before the room lock is taken; a room retired in between is re-fetched.
    fn with_room<R>(&self, room_id: &RoomId, mut f: impl FnMut(&mut Room) -> R) -> R {
        loop {
            let room = self
                .rooms
                .entry(room_id.clone())
                .or_insert_with(|| {
                    debug!(room = %room_id, "creating room");
                    Arc::new(Mutex::new(Room::new(room_id.clone(), self.settings)))
                })
                .clone();

            let mut guard = room.lock();
            if !guard.retired {
                return f(&mut *guard);
            }
        }
    }

    /// Runs `f` only if the room exists.
    fn with_existing<R>(&self, room_id: &RoomId, f: impl FnOnce(&mut Room) -> R) -> Option<R> {
        let room = self.rooms.get(room_id).map(|r| r.value().clone())?;
        let mut guard = room.lock();
        if guard.retired {
            return None;
        }
        Some(f(&mut *guard))
    }

    pub fn join(&self, room_id: &RoomId, listener: &ListenerId, now_ms: u64, out: &dyn Broadcaster) {
        self.with_room(room_id, |room| {
            let outbound = room.join(listener, now_ms);
            dispatch(room, outbound, out);
        });
    }

    pub fn leave(&self, room_id: &RoomId, listener: &ListenerId) -> bool {
        self.with_existing(room_id, |room| room.leave(listener))
            .unwrap_or(false)
    }

    pub fn enqueue(
        &self,
        room_id: &RoomId,
        request: EnqueueRequest,
        now_ms: u64,
        out: &dyn Broadcaster,
    ) -> QueueItem {
        let mut request = Some(request);
        self.with_room(room_id, |room| {
            let request = request.take().unwrap_or_default();
            let (item, outbound) = room.enqueue(request, now_ms);
            dispatch(room, outbound, out);
            item
        })
    }

    pub fn vote(
        &self,
        room_id: &RoomId,
        listener: &ListenerId,
        queue_id: &QueueId,
        raw_kind: &str,
        now_ms: u64,
        out: &dyn Broadcaster,
    ) {
        self.with_room(room_id, |room| {
            let outbound = room.vote(listener, queue_id, raw_kind, now_ms);
            dispatch(room, outbound, out);
        });
    }

    /// One ticker pass over every room.
    pub fn tick(&self, now_ms: u64, out: &dyn Broadcaster) -> TickReport {
        let rooms: Vec<(RoomId, Shared<Room>)> = self
            .rooms
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let mut report = TickReport::default();
        for (room_id, room) in rooms {
            {
                let mut guard = room.lock();
                if guard.retired || !guard.is_playing() {
                    continue;
                }
                let before = guard.now_playing().map(|item| item.id.clone());
                let outbound = guard.tick(now_ms);
                report.synced += 1;
                if guard.now_playing().map(|item| item.id.clone()) != before {
                    report.advanced += 1;
                }
                dispatch(&*guard, outbound, out);
            }

            if self.evict_idle && self.evict_if_abandoned(&room_id) {
                report.evicted += 1;
            }
        }

        // rooms that never played anything are not visited above
        if self.evict_idle {
            let idle: Vec<RoomId> = self
                .rooms
                .iter()
                .filter(|entry| entry.value().try_lock().is_some_and(|r| r.is_abandoned()))
                .map(|entry| entry.key().clone())
                .collect();
            for room_id in idle {
                if self.evict_if_abandoned(&room_id) {
                    report.evicted += 1;
                }
            }
        }
        report
    }

    fn evict_if_abandoned(&self, room_id: &RoomId) -> bool {
        let removed = self
            .rooms
            .remove_if(room_id, |_, room| {
                let mut guard = room.lock();
                if guard.is_abandoned() {
                    guard.retired = true;
                    true
                } else {
                    false
                }
            })
            .is_some();
        if removed {
            info!(room = %room_id, "evicted idle room");
        }
        removed
    }

    pub fn snapshot(&self, room_id: &RoomId, now_ms: u64) -> Option<RoomSnapshot> {
        self.with_existing(room_id, |room| room.snapshot(now_ms))
    }

    pub fn summaries(&self) -> Vec<RoomSummary> {
        let rooms: Vec<Shared<Room>> = self.rooms.iter().map(|e| e.value().clone()).collect();
        let mut summaries: Vec<RoomSummary> = rooms.iter().map(|r| r.lock().summary()).collect();
        summaries.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        summaries
    }
}

/// Sends each message to its recipients, in order, while the room is locked.
fn dispatch(room: &Room, outbound: Vec<Outbound>, out: &dyn Broadcaster) {
    for Outbound { to, message } in outbound {
        match to {
            Recipient::Room => {
                for listener in room.listeners() {
                    out.deliver(listener, &message);
                }
            }
            Recipient::Listener(listener) => out.deliver(&listener, &message),
        }
    }
}

use std::collections::HashSet;

use tracing::debug;

use crate::{
    common::{ListenerId, QueueId, RoomId},
    configs::RoomConfig,
    protocol::{NowPlayingView, OutgoingMessage, Outbound, RoomSnapshot, RoomSummary},
    room::{
        EnqueueRequest, PlaybackClock, Queue, QueueItem, QueueStatus, VoteCounts, VoteKind,
        VoteTally,
    },
};

/// Room-level knobs taken from `[room]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomSettings {
    pub skip_ratio: f64,
    pub default_duration_secs: u64,
    pub history_limit: usize,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self::from(&RoomConfig::default())
    }
}

impl From<&RoomConfig> for RoomSettings {
    fn from(config: &RoomConfig) -> Self {
        Self {
            skip_ratio: config.skip_ratio,
            default_duration_secs: config.default_duration_secs,
            history_limit: config.history_limit,
        }
    }
}

/// One isolated listening session.
///
/// Every method is a complete state transition: it takes the current time,
/// mutates the room, and returns the messages the transition produced in the
/// order they must be delivered. Callers serialize access per room.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    settings: RoomSettings,
    queue: Queue,
    clock: PlaybackClock,
    listeners: HashSet<ListenerId>,
    votes: VoteTally,
    /// Set once the registry has dropped this room; holders must re-fetch.
    pub(crate) retired: bool,
}

impl Room {
    pub fn new(id: RoomId, settings: RoomSettings) -> Self {
        Self {
            id,
            settings,
            queue: Queue::default(),
            clock: PlaybackClock::default(),
            listeners: HashSet::new(),
            votes: VoteTally::default(),
            retired: false,
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn listeners(&self) -> impl Iterator<Item = &ListenerId> {
        self.listeners.iter()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    /// No listeners and nothing playing.
    pub fn is_abandoned(&self) -> bool {
        self.listeners.is_empty() && !self.clock.is_playing()
    }

    pub fn now_playing(&self) -> Option<&QueueItem> {
        self.clock
            .current()
            .and_then(|playback| self.queue.get(&playback.queue_id))
    }

    pub fn position(&self, now_ms: u64) -> u64 {
        self.clock.position(now_ms)
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        self.clock.is_due(now_ms)
    }

    pub fn counts(&self) -> VoteCounts {
        self.votes.counts()
    }

    pub fn skip_quorum_reached(&self) -> bool {
        self.votes
            .skip_quorum_reached(self.listeners.len(), self.settings.skip_ratio)
    }

    /// Adds the listener and returns the catch-up messages addressed to it alone.
    pub fn join(&mut self, listener: &ListenerId, now_ms: u64) -> Vec<Outbound> {
        if self.listeners.insert(listener.clone()) {
            debug!(room = %self.id, %listener, "listener joined");
        }

        let mut out = vec![Outbound::direct(listener, self.queue_message())];
        if let Some(now_playing) = self.now_playing_message() {
            out.push(Outbound::direct(listener, now_playing));
        }
        if let Some(sync) = self.sync_message(now_ms) {
            out.push(Outbound::direct(listener, sync));
        }
        out
    }

    /// Removes the listener. Their vote, if any, stays until the track changes.
    pub fn leave(&mut self, listener: &ListenerId) -> bool {
        let removed = self.listeners.remove(listener);
        if removed {
            debug!(room = %self.id, %listener, "listener left");
        }
        removed
    }

    /// Appends a track; starts it right away when the room is idle.
    pub fn enqueue(&mut self, request: EnqueueRequest, now_ms: u64) -> (QueueItem, Vec<Outbound>) {
        let item = self
            .queue
            .push(request, self.settings.default_duration_secs);
        debug!(room = %self.id, queue_id = %item.id, duration = item.duration, "enqueued");

        let mut out = vec![Outbound::room(self.queue_message())];
        if !self.clock.is_playing() {
            if let Some(started) = self.advance(now_ms) {
                out.push(Outbound::room(now_playing_event(&started, now_ms)));
            }
        }
        (item, out)
    }

    /// Records a vote and skips the current track once quorum is reached.
    ///
    /// Unknown vote types are dropped without any message. Votes naming an
    /// item other than the one playing are counted but never skip.
    pub fn vote(
        &mut self,
        listener: &ListenerId,
        queue_id: &QueueId,
        raw_kind: &str,
        now_ms: u64,
    ) -> Vec<Outbound> {
        let Some(kind) = VoteKind::parse(raw_kind) else {
            debug!(room = %self.id, %listener, kind = raw_kind, "ignoring unknown vote type");
            return Vec::new();
        };
        self.votes.cast(listener, kind);

        let counts = self.votes.counts();
        let mut out = vec![Outbound::room(OutgoingMessage::VotesUpdated {
            queue_id: queue_id.clone(),
            likes: counts.likes,
            skips: counts.skips,
        })];

        if self.clock.is_current(queue_id) && self.skip_quorum_reached() {
            debug!(room = %self.id, %queue_id, skips = counts.skips, "skip quorum reached");
            self.queue.set_status(queue_id, QueueStatus::Skipped);
            out.push(self.advance_message(now_ms));
        }
        out
    }

    /// Starts the first pending item, or goes idle when none is left.
    ///
    /// An item still marked playing is ended as skipped first, so at most
    /// one item is ever playing.
    pub fn advance(&mut self, now_ms: u64) -> Option<QueueItem> {
        if let Some(previous) = self.clock.stop() {
            self.queue.set_status(&previous.queue_id, QueueStatus::Skipped);
        }

        let started = self.queue.start_next();
        match &started {
            Some(item) => {
                self.clock.start(item, now_ms);
                self.votes.clear();
                debug!(room = %self.id, queue_id = %item.id, "now playing");
            }
            None => debug!(room = %self.id, "queue exhausted, room idle"),
        }

        let pruned = self.queue.prune_history(self.settings.history_limit);
        if pruned > 0 {
            debug!(room = %self.id, pruned, "dropped finished items");
        }
        started
    }

    /// Periodic sync; finishes the current track when its duration has elapsed.
    pub fn tick(&mut self, now_ms: u64) -> Vec<Outbound> {
        let Some(sync) = self.sync_message(now_ms) else {
            return Vec::new();
        };

        let mut out = vec![Outbound::room(sync)];
        if self.clock.is_due(now_ms) {
            if let Some(playback) = self.clock.current() {
                let finished = playback.queue_id.clone();
                self.queue.set_status(&finished, QueueStatus::Done);
                debug!(room = %self.id, queue_id = %finished, "track finished");
            }
            out.push(self.advance_message(now_ms));
        }
        out
    }

    pub fn snapshot(&self, now_ms: u64) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.id.clone(),
            listeners: self.listeners.len(),
            queue: self.queue.items().to_vec(),
            now_playing: self.now_playing_view(now_ms),
            votes: self.votes.counts(),
        }
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            room_id: self.id.clone(),
            listeners: self.listeners.len(),
            queue_length: self.queue.len(),
            pending: self.queue.count(QueueStatus::Pending),
            now_playing: self.clock.current().map(|p| p.queue_id.clone()),
        }
    }

    /// After a skip or a finish: announce the new track, or the final queue when idle.
    fn advance_message(&mut self, now_ms: u64) -> Outbound {
        match self.advance(now_ms) {
            Some(started) => Outbound::room(now_playing_event(&started, now_ms)),
            None => Outbound::room(self.queue_message()),
        }
    }

    fn queue_message(&self) -> OutgoingMessage {
        OutgoingMessage::QueueUpdated {
            room_id: self.id.clone(),
            queue: self.queue.items().to_vec(),
        }
    }

    fn now_playing_message(&self) -> Option<OutgoingMessage> {
        let playback = self.clock.current()?;
        let item = self.queue.get(&playback.queue_id)?;
        Some(now_playing_event(item, playback.started_at))
    }

    fn sync_message(&self, now_ms: u64) -> Option<OutgoingMessage> {
        let playback = self.clock.current()?;
        Some(OutgoingMessage::Sync {
            queue_id: playback.queue_id.clone(),
            position: self.clock.position(now_ms),
        })
    }

    fn now_playing_view(&self, now_ms: u64) -> Option<NowPlayingView> {
        let playback = self.clock.current()?;
        let item = self.queue.get(&playback.queue_id)?;
        Some(NowPlayingView {
            queue_id: item.id.clone(),
            url: item.url.clone(),
            title: item.title.clone(),
            started_at: playback.started_at,
            duration: item.duration,
            position: self.clock.position(now_ms),
        })
    }
}

fn now_playing_event(item: &QueueItem, started_at: u64) -> OutgoingMessage {
    OutgoingMessage::NowPlaying {
        queue_id: item.id.clone(),
        url: item.url.clone(),
        title: item.title.clone(),
        started_at,
        duration: item.duration,
    }
}

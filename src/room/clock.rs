use crate::{common::QueueId, room::QueueItem};

/// The item currently playing and when it started.
#[derive(Debug, Clone, PartialEq)]
pub struct Playback {
    pub queue_id: QueueId,
    /// Unix timestamp in milliseconds.
    pub started_at: u64,
    /// Seconds.
    pub duration: u64,
}

/// Per-room playback cursor. Position is derived from wall-clock time on
/// every read, so missed ticks never drift it.
#[derive(Debug, Default)]
pub struct PlaybackClock {
    current: Option<Playback>,
}

impl PlaybackClock {
    pub fn start(&mut self, item: &QueueItem, now_ms: u64) {
        self.current = Some(Playback {
            queue_id: item.id.clone(),
            started_at: now_ms,
            duration: item.duration,
        });
    }

    pub fn stop(&mut self) -> Option<Playback> {
        self.current.take()
    }

    pub fn current(&self) -> Option<&Playback> {
        self.current.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_current(&self, queue_id: &QueueId) -> bool {
        self.current.as_ref().is_some_and(|p| &p.queue_id == queue_id)
    }

    /// Whole seconds since start, 0 when idle or when the clock went backwards.
    pub fn position(&self, now_ms: u64) -> u64 {
        self.current
            .as_ref()
            .map(|p| now_ms.saturating_sub(p.started_at) / 1000)
            .unwrap_or(0)
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        self.current
            .as_ref()
            .is_some_and(|p| self.position(now_ms) >= p.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::QueueStatus;

    fn item(duration: u64) -> QueueItem {
        QueueItem {
            id: "q_test".into(),
            url: "a.mp3".into(),
            title: "a.mp3".into(),
            duration,
            status: QueueStatus::Playing,
        }
    }

    #[test]
    fn test_idle_clock() {
        let clock = PlaybackClock::default();
        assert_eq!(clock.position(123_456), 0);
        assert!(!clock.is_due(123_456));
        assert!(!clock.is_playing());
    }

    #[test]
    fn test_position_truncates_to_seconds() {
        let mut clock = PlaybackClock::default();
        clock.start(&item(10), 1_000);
        assert_eq!(clock.position(1_000), 0);
        assert_eq!(clock.position(1_999), 0);
        assert_eq!(clock.position(4_500), 3);
        // clock skew
        assert_eq!(clock.position(500), 0);
    }

    #[test]
    fn test_due_at_duration() {
        let mut clock = PlaybackClock::default();
        clock.start(&item(10), 0);
        assert!(!clock.is_due(9_999));
        assert!(clock.is_due(10_000));
        assert!(clock.is_current(&"q_test".into()));

        let stopped = clock.stop().unwrap();
        assert_eq!(stopped.duration, 10);
        assert!(!clock.is_due(10_000));
    }
}

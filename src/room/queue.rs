use serde::{Deserialize, Serialize};

use crate::common::QueueId;

/// Lifecycle of a queue item. Transitions only move forward:
/// `Pending -> Playing -> {Skipped, Done}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Pending,
    Playing,
    Skipped,
    Done,
}

impl QueueStatus {
    pub fn can_become(self, next: QueueStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Playing)
                | (Self::Playing, Self::Skipped)
                | (Self::Playing, Self::Done)
        )
    }

    pub fn is_finished(self) -> bool {
        matches!(self, Self::Skipped | Self::Done)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    pub id: QueueId,
    pub url: String,
    pub title: String,
    /// Whole seconds.
    pub duration: u64,
    pub status: QueueStatus,
}

/// A track request as it arrives, before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnqueueRequest {
    pub url: String,
    pub title: Option<String>,
    pub duration: Option<f64>,
}

impl EnqueueRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_duration(mut self, secs: f64) -> Self {
        self.duration = Some(secs);
        self
    }
}

/// Positive finite durations round up to whole seconds; anything else
/// (absent, zero, negative, NaN) takes the default.
pub fn resolve_duration(requested: Option<f64>, default_secs: u64) -> u64 {
    match requested {
        Some(secs) if secs.is_finite() && secs > 0.0 => secs.ceil() as u64,
        _ => default_secs,
    }
}

/// Ordered track list of one room. Insertion order is play order.
#[derive(Debug, Default)]
pub struct Queue {
    items: Vec<QueueItem>,
}

impl Queue {
    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &QueueId) -> Option<&QueueItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn count(&self, status: QueueStatus) -> usize {
        self.items.iter().filter(|item| item.status == status).count()
    }

    /// Appends a pending item built from `request`, applying title and duration defaults.
    pub fn push(&mut self, request: EnqueueRequest, default_duration_secs: u64) -> QueueItem {
        let mut id = QueueId::generate();
        while self.get(&id).is_some() {
            id = QueueId::generate();
        }

        let title = match request.title {
            Some(title) if !title.is_empty() => title,
            _ => request.url.clone(),
        };

        let item = QueueItem {
            id,
            title,
            url: request.url,
            duration: resolve_duration(request.duration, default_duration_secs),
            status: QueueStatus::Pending,
        };
        self.items.push(item.clone());
        item
    }

    /// Moves the first pending item to `Playing` and returns a copy of it.
    pub fn start_next(&mut self) -> Option<QueueItem> {
        let next = self
            .items
            .iter_mut()
            .find(|item| item.status == QueueStatus::Pending)?;
        next.status = QueueStatus::Playing;
        Some(next.clone())
    }

    /// Applies a forward status transition. Returns false when the item is
    /// unknown or the transition would move backwards.
    pub fn set_status(&mut self, id: &QueueId, status: QueueStatus) -> bool {
        match self.items.iter_mut().find(|item| &item.id == id) {
            Some(item) if item.status.can_become(status) => {
                item.status = status;
                true
            }
            _ => false,
        }
    }

    /// Drops the oldest finished items until at most `limit` remain.
    pub fn prune_history(&mut self, limit: usize) -> usize {
        let finished = self.items.iter().filter(|i| i.status.is_finished()).count();
        let mut excess = finished.saturating_sub(limit);
        if excess == 0 {
            return 0;
        }

        let removed = excess;
        self.items.retain(|item| {
            if excess > 0 && item.status.is_finished() {
                excess -= 1;
                false
            } else {
                true
            }
        });
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_applies_defaults() {
        let mut queue = Queue::default();
        let item = queue.push(EnqueueRequest::new("a.mp3"), 180);
        assert_eq!(item.title, "a.mp3");
        assert_eq!(item.duration, 180);
        assert_eq!(item.status, QueueStatus::Pending);

        let item = queue.push(EnqueueRequest::new("b.mp3").with_title(""), 180);
        assert_eq!(item.title, "b.mp3");

        let item = queue.push(
            EnqueueRequest::new("c.mp3").with_title("C").with_duration(2.5),
            180,
        );
        assert_eq!(item.title, "C");
        assert_eq!(item.duration, 3);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_resolve_duration_rejects_unusable_values() {
        assert_eq!(resolve_duration(None, 180), 180);
        assert_eq!(resolve_duration(Some(0.0), 180), 180);
        assert_eq!(resolve_duration(Some(-4.0), 180), 180);
        assert_eq!(resolve_duration(Some(f64::NAN), 180), 180);
        assert_eq!(resolve_duration(Some(10.0), 180), 10);
    }

    #[test]
    fn test_start_next_is_fifo() {
        let mut queue = Queue::default();
        let a = queue.push(EnqueueRequest::new("a"), 10);
        let b = queue.push(EnqueueRequest::new("b"), 10);

        assert_eq!(queue.start_next().map(|i| i.id), Some(a.id.clone()));
        assert!(queue.set_status(&a.id, QueueStatus::Done));
        assert_eq!(queue.start_next().map(|i| i.id), Some(b.id.clone()));
        assert!(queue.set_status(&b.id, QueueStatus::Skipped));
        assert_eq!(queue.start_next(), None);
    }

    #[test]
    fn test_status_never_returns_to_pending() {
        let mut queue = Queue::default();
        let a = queue.push(EnqueueRequest::new("a"), 10);
        assert!(!queue.set_status(&a.id, QueueStatus::Done));
        queue.start_next();
        assert!(!queue.set_status(&a.id, QueueStatus::Pending));
        assert!(queue.set_status(&a.id, QueueStatus::Done));
        assert!(!queue.set_status(&a.id, QueueStatus::Playing));
        assert!(!queue.set_status(&"q_missing".into(), QueueStatus::Done));
    }

    #[test]
    fn test_prune_history_keeps_live_items() {
        let mut queue = Queue::default();
        for n in 0..5 {
            queue.push(EnqueueRequest::new(format!("t{}", n)), 10);
        }
        for _ in 0..4 {
            let item = queue.start_next().unwrap();
            queue.set_status(&item.id, QueueStatus::Done);
        }
        queue.start_next();

        assert_eq!(queue.prune_history(1), 3);
        let urls: Vec<&str> = queue.items().iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["t3", "t4"]);
        assert_eq!(queue.prune_history(1), 0);
    }
}

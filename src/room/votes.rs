use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::common::ListenerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Like,
    Skip,
}

impl VoteKind {
    /// Exact, case-sensitive match on `like` / `skip`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "like" => Some(Self::Like),
            "skip" => Some(Self::Skip),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VoteCounts {
    pub likes: usize,
    pub skips: usize,
}

/// Minimum skip votes needed: `ceil(max(connected, 1) * ratio)`.
pub fn skip_threshold(connected: usize, ratio: f64) -> usize {
    (connected.max(1) as f64 * ratio).ceil() as usize
}

/// One vote per listener; a later vote replaces the earlier one.
#[derive(Debug, Default)]
pub struct VoteTally {
    votes: HashMap<ListenerId, VoteKind>,
}

impl VoteTally {
    pub fn cast(&mut self, listener: &ListenerId, kind: VoteKind) {
        self.votes.insert(listener.clone(), kind);
    }

    pub fn clear(&mut self) {
        self.votes.clear();
    }

    pub fn counts(&self) -> VoteCounts {
        self.votes
            .values()
            .fold(VoteCounts::default(), |mut counts, kind| {
                match kind {
                    VoteKind::Like => counts.likes += 1,
                    VoteKind::Skip => counts.skips += 1,
                }
                counts
            })
    }

    pub fn skip_quorum_reached(&self, connected: usize, ratio: f64) -> bool {
        self.counts().skips >= skip_threshold(connected, ratio)
    }
}

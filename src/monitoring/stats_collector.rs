use std::fs;

use crate::{protocol::Stats, server::AppState};

/// Resident set size in bytes from `/proc/self/status`, 0 where unavailable.
pub fn resident_memory() -> u64 {
    fs::read_to_string("/proc/self/status")
        .ok()
        .and_then(|status| {
            status
                .lines()
                .find(|line| line.starts_with("VmRSS:"))
                .and_then(|line| line.split_whitespace().nth(1))
                .and_then(|kb| kb.parse::<u64>().ok())
        })
        .map(|kb| kb * 1024)
        .unwrap_or(0)
}

pub fn collect_stats(state: &AppState) -> Stats {
    let summaries = state.registry.summaries();

    Stats {
        uptime: state.start_time.elapsed().as_millis() as u64,
        rooms: summaries.len(),
        playing_rooms: summaries.iter().filter(|s| s.now_playing.is_some()).count(),
        listeners: summaries.iter().map(|s| s.listeners).sum(),
        connections: state.gateway.len(),
        memory: resident_memory(),
    }
}

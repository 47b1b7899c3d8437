use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct RoomConfig {
    /// Period of the sync/advance ticker.
    pub tick_interval_ms: u64,
    /// Fraction of connected listeners whose skip votes force an advance.
    pub skip_ratio: f64,
    /// Applied when an enqueue carries no usable duration.
    pub default_duration_secs: u64,
    /// Finished (done or skipped) items kept per room.
    pub history_limit: usize,
    /// Drop rooms with no listeners and nothing playing on each tick.
    pub evict_idle_rooms: bool,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            skip_ratio: 0.5,
            default_duration_secs: 180,
            history_limit: 200,
            evict_idle_rooms: true,
        }
    }
}

//! Shared queue, playback cursor and skip voting for each listening room.

pub mod clock;
pub mod queue;
pub mod registry;
pub mod state;
pub mod ticker;
pub mod votes;

pub use clock::{Playback, PlaybackClock};
pub use queue::{EnqueueRequest, Queue, QueueItem, QueueStatus, resolve_duration};
pub use registry::{Broadcaster, RoomRegistry, TickReport};
pub use state::{Room, RoomSettings};
pub use votes::{VoteCounts, VoteKind, VoteTally, skip_threshold};

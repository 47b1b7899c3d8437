pub mod incoming;
pub mod models;
pub mod outgoing;

pub use incoming::*;
pub use models::*;
pub use outgoing::*;

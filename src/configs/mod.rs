pub mod base;
pub mod logging;
pub mod room;
pub mod server;

pub use base::*;
pub use logging::*;
pub use room::*;
pub use server::*;

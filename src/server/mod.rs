pub mod app_state;
pub mod gateway;
pub mod handler;
pub mod session;

pub use app_state::AppState;
pub use gateway::Gateway;
pub use handler::{handle_disconnect, handle_message};
pub use session::Session;

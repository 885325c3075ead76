//! Bot module - state shared with command handlers.

mod state;

pub use state::AppState;

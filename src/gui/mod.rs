mod app;
mod message;
pub mod state;
mod widgets;

pub use app::{SteelscanApp, run};
pub use message::Message;
pub use state::{AppState, StateError, ViewMode};

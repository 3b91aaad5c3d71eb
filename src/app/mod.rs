//! Application layer - state, event handling and the app actor

pub mod actor;
pub mod commands;
pub mod editor;
pub mod state;

pub use actor::AppActor;
pub use state::AppState;

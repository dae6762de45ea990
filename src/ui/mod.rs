//! Ratatui front-end split across logical submodules: the event loop, the
//! central application state machine, the modal forms, and small layout
//! helpers.

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;

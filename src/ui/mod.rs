//! Terminal User Interface module.
//!
//! - `loop_runner` - main event loop and terminal management
//! - `input` - key dispatch into the controller
//! - `render` - view dispatch and overlays
//! - `list` - topic list view
//! - `form` - add/edit form view
//! - `picker` - related-topic picker overlay
//! - `status` - status bar and toast

mod form;
mod input;
mod list;
mod loop_runner;
mod picker;
mod render;
mod status;

pub use loop_runner::{run, Action};

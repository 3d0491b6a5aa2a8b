//! Terminal client for administering a library of topics.
//!
//! - [`api`] - HTTP client for the `/library` endpoints
//! - [`app`] - the controller: view state, commands and event handling
//! - [`form`] - the editable draft and file attachments
//! - [`picker`] - related-topic multi-select
//! - [`toast`] - transient notifications
//! - [`ui`] - ratatui rendering and key dispatch

pub mod api;
pub mod app;
pub mod config;
pub mod form;
pub mod picker;
pub mod task;
pub mod toast;
pub mod ui;
pub mod util;

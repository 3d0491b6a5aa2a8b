//! Draft form state for creating and editing a topic.
//!
//! - [`draft`] - `Draft`, its repeatable rows and field navigation
//! - [`attachment`] - files picked from disk for upload

mod attachment;
mod draft;

pub use attachment::{load_selection, AttachedFile, AttachmentError, MAX_ATTACHMENT_SIZE};
pub use draft::{Draft, FormField, ValidationError};

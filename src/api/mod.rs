//! Backend collaborator for the library feature.
//!
//! - [`client`] - `TopicClient`, the reqwest-based HTTP client
//! - [`payload`] - multipart encoding of a topic submission
//! - [`types`] - wire types (`Topic`, detail rows, replies) and `ApiError`
//!
//! Every call reports `{ status, message }` the same way; see
//! [`ApiReply`] for how body and HTTP status are reconciled.

mod client;
mod payload;
mod types;

pub use client::TopicClient;
pub use payload::TopicPayload;
pub use types::{ApiError, ApiReply, PodcastDetail, RelatedTopic, Topic, VideoDetail};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while talking to the library API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Malformed response: {0}")]
    Decode(String),
    #[error("Failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(#[from] crate::util::UrlValidationError),
}

// ============================================================================
// Topic Entity
// ============================================================================

/// A library topic as returned by `GET /library`.
///
/// The backend is loose about types: `important` arrives as `0/1` or a
/// boolean, `createdAt` as epoch milliseconds or an RFC 3339 string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub topic: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "flag_from_bool_or_int")]
    pub important: bool,
    #[serde(default, deserialize_with = "timestamp_from_millis_or_rfc3339")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub web_site_link: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Related topics; the wire name is historical, entries carry names.
    #[serde(
        default,
        rename = "relatedTopicId",
        deserialize_with = "null_as_default"
    )]
    pub related_topics: Vec<RelatedTopic>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub video_details: Vec<VideoDetail>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub podcast_details: Vec<PodcastDetail>,
    /// Server-side path or URL of the attached document, if any.
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub podcast_files: Vec<String>,
}

/// Reference to another topic, keyed by display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedTopic {
    pub topic: String,
}

/// One row of the repeatable video section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoDetail {
    pub video_name: String,
    pub video_link: String,
    pub video_description: String,
}

/// One row of the repeatable podcast section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PodcastDetail {
    pub podcast_name: String,
    pub podcast_link: String,
    pub podcast_description: String,
}

// ============================================================================
// Response Envelope
// ============================================================================

/// Common `{ status, message, data }` wrapper used by every endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub status: Option<u16>,
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Outcome of a create, update or delete call.
///
/// `status` is the status reported in the JSON body when present, otherwise
/// the HTTP status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiReply {
    pub status: u16,
    pub message: Option<String>,
}

impl ApiReply {
    pub const OK: u16 = 200;
    pub const REJECTED: u16 = 400;

    pub fn is_success(&self) -> bool {
        self.status == Self::OK
    }

    pub fn is_rejected(&self) -> bool {
        self.status == Self::REJECTED
    }
}

// ============================================================================
// Lenient Deserializers
// ============================================================================

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn flag_from_bool_or_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        None => false,
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(n)) => n != 0,
        Some(Flag::Text(s)) => matches!(s.trim(), "1" | "true" | "TRUE" | "True"),
    })
}

fn timestamp_from_millis_or_rfc3339<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Stamp {
        Millis(i64),
        Text(String),
    }

    Ok(match Option::<Stamp>::deserialize(deserializer)? {
        None => None,
        Some(Stamp::Millis(ms)) => DateTime::from_timestamp_millis(ms),
        Some(Stamp::Text(s)) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
    })
}

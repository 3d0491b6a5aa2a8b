//! Multipart body for the create/update endpoint.

use super::types::{ApiError, PodcastDetail, VideoDetail};
use crate::form::AttachedFile;
use reqwest::multipart::{Form, Part};

/// Everything `POST /library` and `PUT /library/{id}` accept.
///
/// Built from the draft by the controller; owning its data lets the request
/// run on a background task while the draft stays editable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicPayload {
    pub topic: String,
    pub important: bool,
    pub description: String,
    pub tags: Vec<String>,
    pub web_site_link: String,
    /// Names of the related topics.
    pub related_topics: Vec<String>,
    pub video_details: Vec<VideoDetail>,
    pub podcast_details: Vec<PodcastDetail>,
    pub document: Option<AttachedFile>,
    pub podcast_files: Vec<AttachedFile>,
}

impl TopicPayload {
    /// Text fields in wire order, as `(name, value)` pairs.
    pub fn text_fields(&self) -> Result<Vec<(&'static str, String)>, ApiError> {
        Ok(vec![
            ("topic", self.topic.clone()),
            ("important", self.important.to_string()),
            ("description", self.description.clone()),
            ("tags", self.tags.join(",")),
            ("webSiteLink", self.web_site_link.clone()),
            ("relatedTopicId", self.related_topics.join(",")),
            ("videoDetails", serde_json::to_string(&self.video_details)?),
            ("podcastDetails", serde_json::to_string(&self.podcast_details)?),
        ])
    }

    /// Build the multipart form.
    ///
    /// `documentFiles` is always present: a file part when a document is
    /// attached, an empty text part otherwise. Each pending podcast file
    /// becomes its own `podcastFiles` part.
    pub fn into_form(self) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for (name, value) in self.text_fields()? {
            form = form.text(name, value);
        }

        form = match self.document {
            Some(doc) => form.part("documentFiles", file_part(doc)),
            None => form.text("documentFiles", ""),
        };

        for file in self.podcast_files {
            form = form.part("podcastFiles", file_part(file));
        }

        Ok(form)
    }
}

fn file_part(file: AttachedFile) -> Part {
    Part::bytes(file.bytes).file_name(file.file_name)
}

use super::attachment::AttachedFile;
use crate::api::{PodcastDetail, Topic, TopicPayload, VideoDetail};
use crate::util::validate_web_link;
use thiserror::Error;

/// Why a draft cannot be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Topic name is required")]
    MissingTopic,
    #[error("Website link is not a valid http(s) URL: {0}")]
    InvalidWebsiteLink(String),
}

// ============================================================================
// Form Fields
// ============================================================================

/// A focusable position in the form, in display order.
///
/// Row-indexed variants address one row of a repeatable section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Topic,
    Important,
    WebSiteLink,
    Description,
    TagInput,
    Tag(usize),
    Related,
    VideoName(usize),
    VideoLink(usize),
    VideoDescription(usize),
    PodcastName(usize),
    PodcastLink(usize),
    PodcastDescription(usize),
    PodcastFile(usize),
    Document,
}

impl FormField {
    pub fn label(self) -> &'static str {
        match self {
            Self::Topic => "Topic",
            Self::Important => "Important",
            Self::WebSiteLink => "Website",
            Self::Description => "Description",
            Self::TagInput => "Add tag",
            Self::Tag(_) => "Tag",
            Self::Related => "Related topics",
            Self::VideoName(_) => "Video name",
            Self::VideoLink(_) => "Video link",
            Self::VideoDescription(_) => "Video description",
            Self::PodcastName(_) => "Podcast name",
            Self::PodcastLink(_) => "Podcast link",
            Self::PodcastDescription(_) => "Podcast description",
            Self::PodcastFile(_) => "Podcast files",
            Self::Document => "Document",
        }
    }

    /// Whether typing edits this field's text.
    pub fn is_text(self) -> bool {
        !matches!(self, Self::Important | Self::Tag(_) | Self::Related)
    }

    pub fn video_row(self) -> Option<usize> {
        match self {
            Self::VideoName(i) | Self::VideoLink(i) | Self::VideoDescription(i) => Some(i),
            _ => None,
        }
    }

    pub fn podcast_row(self) -> Option<usize> {
        match self {
            Self::PodcastName(i)
            | Self::PodcastLink(i)
            | Self::PodcastDescription(i)
            | Self::PodcastFile(i) => Some(i),
            _ => None,
        }
    }
}

// ============================================================================
// Draft
// ============================================================================

/// Editable copy of a topic before it is persisted.
///
/// Owned by the controller and changed only through these methods. A fresh
/// draft is *seeded*: one empty video row and one empty podcast row.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub topic: String,
    pub important: bool,
    pub web_site_link: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Text typed into the tag box, not yet added.
    pub tag_input: String,
    pub video_details: Vec<VideoDetail>,
    pub podcast_details: Vec<PodcastDetail>,
    pub document: Option<AttachedFile>,
    /// Every podcast file picked on any podcast row, in pick order.
    pub podcast_files: Vec<AttachedFile>,
    /// Path typed into the document field, not yet loaded.
    pub document_path: String,
    /// Path(s) typed into each podcast row's file field, not yet loaded.
    /// Grows on demand, so it may be shorter than `podcast_details`.
    pub podcast_paths: Vec<String>,
}

impl Default for Draft {
    fn default() -> Self {
        Self::seeded()
    }
}

impl Draft {
    pub fn seeded() -> Self {
        Self {
            topic: String::new(),
            important: false,
            web_site_link: String::new(),
            description: String::new(),
            tags: Vec::new(),
            tag_input: String::new(),
            video_details: vec![VideoDetail::default()],
            podcast_details: vec![PodcastDetail::default()],
            document: None,
            podcast_files: Vec::new(),
            document_path: String::new(),
            podcast_paths: Vec::new(),
        }
    }

    /// Discard all edits and return to the seeded state.
    pub fn reset(&mut self) {
        *self = Self::seeded();
    }

    /// Add the trimmed tag input as a tag; the input is cleared either way.
    ///
    /// Returns false when the input was blank. Duplicates are allowed.
    pub fn add_tag(&mut self) -> bool {
        let input = std::mem::take(&mut self.tag_input);
        let tag = input.trim();
        if tag.is_empty() {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn remove_tag(&mut self, index: usize) -> Option<String> {
        (index < self.tags.len()).then(|| self.tags.remove(index))
    }

    pub fn add_video(&mut self) {
        self.video_details.push(VideoDetail::default());
    }

    pub fn remove_video(&mut self, index: usize) -> Option<VideoDetail> {
        (index < self.video_details.len()).then(|| self.video_details.remove(index))
    }

    pub fn add_podcast(&mut self) {
        self.podcast_details.push(PodcastDetail::default());
    }

    pub fn remove_podcast(&mut self, index: usize) -> Option<PodcastDetail> {
        if index >= self.podcast_details.len() {
            return None;
        }
        if index < self.podcast_paths.len() {
            self.podcast_paths.remove(index);
        }
        Some(self.podcast_details.remove(index))
    }

    /// Path text typed on podcast row `row`.
    pub fn podcast_path(&self, row: usize) -> &str {
        self.podcast_paths.get(row).map_or("", String::as_str)
    }

    pub fn clear_podcast_path(&mut self, row: usize) {
        if let Some(path) = self.podcast_paths.get_mut(row) {
            path.clear();
        }
    }

    fn podcast_path_mut(&mut self, row: usize) -> Option<&mut String> {
        if row >= self.podcast_details.len() {
            return None;
        }
        if self.podcast_paths.len() <= row {
            self.podcast_paths.resize(row + 1, String::new());
        }
        self.podcast_paths.get_mut(row)
    }

    /// Queue podcast files picked on podcast row `row`.
    ///
    /// Files from every row land in one flat list; the row is only logged.
    pub fn attach_podcast_files(&mut self, files: Vec<AttachedFile>, row: usize) {
        tracing::debug!(
            row,
            added = files.len(),
            total = self.podcast_files.len() + files.len(),
            "Podcast files selected"
        );
        self.podcast_files.extend(files);
    }

    /// Replace the pending document.
    pub fn attach_document(&mut self, file: AttachedFile) {
        tracing::debug!(file = %file.file_name, "Document selected");
        self.document = Some(file);
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.topic.trim().is_empty() {
            return Err(ValidationError::MissingTopic);
        }
        let link = self.web_site_link.trim();
        if !link.is_empty() && validate_web_link(link).is_err() {
            return Err(ValidationError::InvalidWebsiteLink(link.to_string()));
        }
        Ok(())
    }

    /// Patch a topic fetched for editing onto this draft.
    ///
    /// The draft already holds one seeded row per section, so `len - 1` rows
    /// are appended before the row values are patched index by index. A
    /// topic with no rows leaves the seeded row in place.
    pub fn hydrate(&mut self, topic: &Topic) {
        for _ in 1..topic.video_details.len() {
            self.add_video();
        }
        for _ in 1..topic.podcast_details.len() {
            self.add_podcast();
        }
        self.tags.extend(topic.tags.iter().cloned());

        self.topic = topic.topic.clone();
        self.important = topic.important;
        self.description = topic.description.clone().unwrap_or_default();
        self.web_site_link = topic.web_site_link.clone().unwrap_or_default();

        for (row, detail) in self.video_details.iter_mut().zip(&topic.video_details) {
            *row = detail.clone();
        }
        for (row, detail) in self.podcast_details.iter_mut().zip(&topic.podcast_details) {
            *row = detail.clone();
        }
    }

    /// Snapshot the draft as a submission payload.
    pub fn to_payload(&self, related_topics: Vec<String>) -> TopicPayload {
        TopicPayload {
            topic: self.topic.trim().to_string(),
            important: self.important,
            description: self.description.clone(),
            tags: self.tags.clone(),
            web_site_link: self.web_site_link.trim().to_string(),
            related_topics,
            video_details: self.video_details.clone(),
            podcast_details: self.podcast_details.clone(),
            document: self.document.clone(),
            podcast_files: self.podcast_files.clone(),
        }
    }

    // ========================================================================
    // Field Navigation
    // ========================================================================

    /// All focusable fields in display order for the current row counts.
    pub fn fields(&self) -> Vec<FormField> {
        let mut fields = vec![
            FormField::Topic,
            FormField::Important,
            FormField::WebSiteLink,
            FormField::Description,
            FormField::TagInput,
        ];
        fields.extend((0..self.tags.len()).map(FormField::Tag));
        fields.push(FormField::Related);
        for i in 0..self.video_details.len() {
            fields.extend([
                FormField::VideoName(i),
                FormField::VideoLink(i),
                FormField::VideoDescription(i),
            ]);
        }
        for i in 0..self.podcast_details.len() {
            fields.extend([
                FormField::PodcastName(i),
                FormField::PodcastLink(i),
                FormField::PodcastDescription(i),
                FormField::PodcastFile(i),
            ]);
        }
        fields.push(FormField::Document);
        fields
    }

    pub fn text(&self, field: FormField) -> Option<&str> {
        let s = match field {
            FormField::Topic => &self.topic,
            FormField::WebSiteLink => &self.web_site_link,
            FormField::Description => &self.description,
            FormField::TagInput => &self.tag_input,
            FormField::Tag(i) => self.tags.get(i)?,
            FormField::VideoName(i) => &self.video_details.get(i)?.video_name,
            FormField::VideoLink(i) => &self.video_details.get(i)?.video_link,
            FormField::VideoDescription(i) => &self.video_details.get(i)?.video_description,
            FormField::PodcastName(i) => &self.podcast_details.get(i)?.podcast_name,
            FormField::PodcastLink(i) => &self.podcast_details.get(i)?.podcast_link,
            FormField::PodcastDescription(i) => {
                &self.podcast_details.get(i)?.podcast_description
            }
            FormField::PodcastFile(i) => {
                self.podcast_details.get(i)?;
                return Some(self.podcast_path(i));
            }
            FormField::Document => &self.document_path,
            FormField::Important | FormField::Related => return None,
        };
        Some(s.as_str())
    }

    /// Mutable text buffer behind an editable field.
    pub fn text_mut(&mut self, field: FormField) -> Option<&mut String> {
        if !field.is_text() {
            return None;
        }
        let s = match field {
            FormField::Topic => &mut self.topic,
            FormField::WebSiteLink => &mut self.web_site_link,
            FormField::Description => &mut self.description,
            FormField::TagInput => &mut self.tag_input,
            FormField::VideoName(i) => &mut self.video_details.get_mut(i)?.video_name,
            FormField::VideoLink(i) => &mut self.video_details.get_mut(i)?.video_link,
            FormField::VideoDescription(i) => {
                &mut self.video_details.get_mut(i)?.video_description
            }
            FormField::PodcastName(i) => &mut self.podcast_details.get_mut(i)?.podcast_name,
            FormField::PodcastLink(i) => &mut self.podcast_details.get_mut(i)?.podcast_link,
            FormField::PodcastDescription(i) => {
                &mut self.podcast_details.get_mut(i)?.podcast_description
            }
            FormField::PodcastFile(i) => self.podcast_path_mut(i)?,
            FormField::Document => &mut self.document_path,
            FormField::Important | FormField::Tag(_) | FormField::Related => return None,
        };
        Some(s)
    }
}

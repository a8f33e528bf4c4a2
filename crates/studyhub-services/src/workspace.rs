//! Organization page orchestrator.
//!
//! Presents one organization's channel → topic → note hierarchy and mediates
//! every mutation against it. Local fields are a cache of backend state,
//! invalidated by re-fetch after each mutation. Per-channel topic loads are
//! independent and unordered; each writes only its own key of the
//! `topics_by_channel` map, so completion order does not matter.

use std::collections::HashMap;

use studyhub_api_client::ApiClient;
use studyhub_core::error::{ApiError, ApiResult, FieldError};
use studyhub_core::models::{Channel, CreateNoteRequest, Note, Topic};
use studyhub_core::store::{Rating, RatingStore};

use crate::cascade::{CascadeAction, CascadeReport};

/// Note titles are the first 50 characters of the content.
const NOTE_TITLE_MAX_CHARS: usize = 50;

/// Derive a note title from its content: the full content when it fits,
/// otherwise the first 50 characters plus an ellipsis. Char-based so
/// multibyte content never splits mid-character.
pub fn derive_title(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(NOTE_TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

pub struct Workspace {
    api: ApiClient,
    ratings: RatingStore,
    org_id: String,
    pub organization_name: String,
    pub channels: Vec<Channel>,
    pub topics_by_channel: HashMap<String, Vec<Topic>>,
    pub notes: Vec<Note>,
    pub selected_channel: Option<String>,
    pub selected_topic: Option<String>,
    staged_attachment: Option<(String, Vec<u8>)>,
}

impl Workspace {
    pub fn new(api: ApiClient, ratings: RatingStore, org_id: impl Into<String>) -> Self {
        let org_id = org_id.into();
        Self {
            api,
            ratings,
            organization_name: format!("Organization {}", org_id),
            org_id,
            channels: Vec::new(),
            topics_by_channel: HashMap::new(),
            notes: Vec::new(),
            selected_channel: None,
            selected_topic: None,
            staged_attachment: None,
        }
    }

    pub fn org_id(&self) -> &str {
        &self.org_id
    }

    /// Load the whole page: organization name, channels, topics per channel,
    /// then evaluate the selection rules. Read failures degrade to empty
    /// views with a warning; they never block the page.
    pub async fn load(&mut self) {
        self.load_organization_name().await;
        self.reload_channels().await;
        self.reload_all_topics().await;
        self.apply_selection_rules().await;
    }

    /// Name lookup falls back to a placeholder label.
    async fn load_organization_name(&mut self) {
        match self.api.get_organization(&self.org_id).await {
            Ok(org) => self.organization_name = org.organization_name,
            Err(e) => {
                tracing::debug!(org_id = %self.org_id, error = %e, "organization name unavailable");
                self.organization_name = format!("Organization {}", self.org_id);
            }
        }
    }

    async fn reload_channels(&mut self) {
        match self.api.list_channels(&self.org_id).await {
            Ok(channels) => self.channels = channels,
            Err(e) => {
                tracing::warn!(org_id = %self.org_id, error = %e, "failed to load channels");
                self.channels = Vec::new();
            }
        }
    }

    /// Fetch topics for every channel concurrently. Loads are independent;
    /// one channel failing leaves its previous entry alone and does not
    /// block the others.
    async fn reload_all_topics(&mut self) {
        let mut handles = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            let api = self.api.clone();
            let channel_id = channel.id.clone();
            handles.push(tokio::spawn(async move {
                let result = api.list_topics(&channel_id).await;
                (channel_id, result)
            }));
        }

        for handle in handles {
            match handle.await {
                Ok((channel_id, Ok(topics))) => {
                    self.topics_by_channel.insert(channel_id, topics);
                }
                Ok((channel_id, Err(e))) => {
                    tracing::warn!(channel_id = %channel_id, error = %e, "failed to load topics");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "topic load task panicked");
                }
            }
        }

        // Drop cached topics of channels that no longer exist.
        let live: Vec<String> = self.channels.iter().map(|c| c.id.clone()).collect();
        self.topics_by_channel.retain(|id, _| live.contains(id));
    }

    async fn reload_topics_for(&mut self, channel_id: &str) {
        match self.api.list_topics(channel_id).await {
            Ok(topics) => {
                self.topics_by_channel
                    .insert(channel_id.to_string(), topics);
            }
            Err(e) => {
                tracing::warn!(channel_id = %channel_id, error = %e, "failed to load topics");
            }
        }
    }

    async fn reload_notes(&mut self) {
        let Some(topic_id) = self.selected_topic.clone() else {
            self.notes.clear();
            return;
        };
        match self.api.list_notes(&topic_id).await {
            Ok(notes) => self.notes = notes,
            Err(e) => {
                tracing::warn!(topic_id = %topic_id, error = %e, "failed to load notes");
                self.notes = Vec::new();
            }
        }
    }

    /// The reactive selection cascade, evaluated whenever channels, topics,
    /// or selection change: a selected channel with no selected topic
    /// auto-selects its first topic; a dangling selection is cleared; the
    /// note list always tracks the selected topic.
    pub async fn apply_selection_rules(&mut self) {
        if let Some(channel_id) = self.selected_channel.clone() {
            if !self.channels.iter().any(|c| c.id == channel_id) {
                self.selected_channel = None;
                self.selected_topic = None;
            }
        }

        match self.selected_channel.clone() {
            Some(channel_id) => {
                let topics = self
                    .topics_by_channel
                    .get(&channel_id)
                    .cloned()
                    .unwrap_or_default();
                let topic_still_valid = self
                    .selected_topic
                    .as_ref()
                    .map(|t| topics.iter().any(|topic| &topic.id == t))
                    .unwrap_or(false);
                if !topic_still_valid {
                    self.selected_topic = topics.first().map(|t| t.id.clone());
                }
            }
            None => {
                self.selected_topic = None;
            }
        }

        self.reload_notes().await;
    }

    /// Select a channel by id. The first of its topics is auto-selected when
    /// no topic of that channel is already selected.
    pub async fn select_channel(&mut self, channel_id: &str) -> ApiResult<()> {
        if !self.channels.iter().any(|c| c.id == channel_id) {
            return Err(ApiError::NotFound {
                detail: format!("Channel {} is not part of this organization", channel_id),
            });
        }
        self.selected_channel = Some(channel_id.to_string());
        self.apply_selection_rules().await;
        Ok(())
    }

    /// Select a topic by id; its parent channel becomes the selected channel.
    pub async fn select_topic(&mut self, topic_id: &str) -> ApiResult<()> {
        let parent = self.topics_by_channel.iter().find_map(|(channel_id, topics)| {
            topics
                .iter()
                .any(|t| t.id == topic_id)
                .then(|| channel_id.clone())
        });
        let Some(channel_id) = parent else {
            return Err(ApiError::NotFound {
                detail: format!("Topic {} is not loaded in this organization", topic_id),
            });
        };
        self.selected_channel = Some(channel_id);
        self.selected_topic = Some(topic_id.to_string());
        self.reload_notes().await;
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected_channel = None;
        self.selected_topic = None;
        self.notes.clear();
    }

    /// Create a channel, reload the full channel list, select the new one.
    /// A duplicate name surfaces as [`ApiError::Duplicate`].
    pub async fn create_channel(&mut self, name: &str) -> ApiResult<Channel> {
        let channel = self.api.create_channel(name, &self.org_id).await?;
        self.reload_channels().await;
        self.reload_topics_for(&channel.id).await;
        self.selected_channel = Some(channel.id.clone());
        self.apply_selection_rules().await;
        Ok(channel)
    }

    /// Create a topic, reloading only the parent channel's topics. When the
    /// parent channel is selected the new topic becomes the selection. On
    /// failure nothing is touched, so a retry sees unchanged state.
    pub async fn create_topic(&mut self, channel_id: &str, name: &str) -> ApiResult<Topic> {
        let topic = self
            .api
            .create_topic(name, channel_id, &self.org_id)
            .await?;
        self.reload_topics_for(channel_id).await;
        if self.selected_channel.as_deref() == Some(channel_id) {
            self.selected_topic = Some(topic.id.clone());
            self.reload_notes().await;
        }
        Ok(topic)
    }

    /// Delete a channel: each topic's notes, then the topic, for every topic
    /// of the channel, then the channel itself. Children go before parents;
    /// individual failures are recorded and skipped, and the channel delete
    /// is attempted regardless of topic outcomes.
    pub async fn delete_channel(&mut self, channel_id: &str) -> CascadeReport {
        let mut report = CascadeReport::new();

        let topics = match self.topics_by_channel.get(channel_id) {
            Some(cached) => cached.clone(),
            None => self.api.list_topics(channel_id).await.unwrap_or_else(|e| {
                tracing::warn!(channel_id = %channel_id, error = %e, "could not enumerate topics before channel delete");
                Vec::new()
            }),
        };

        for topic in &topics {
            let notes = self.api.list_notes(&topic.id).await.unwrap_or_else(|e| {
                tracing::warn!(topic_id = %topic.id, error = %e, "could not enumerate notes before topic delete");
                Vec::new()
            });
            for note in &notes {
                let result = self.api.delete_note(&note.id).await;
                report.record(CascadeAction::DeleteNote, &note.id, &result);
            }
            let result = self.api.delete_topic(&topic.id).await;
            report.record(CascadeAction::DeleteTopic, &topic.id, &result);
        }

        let result = self.api.delete_channel(channel_id).await;
        report.record(CascadeAction::DeleteChannel, channel_id, &result);

        self.reload_channels().await;
        self.topics_by_channel.remove(channel_id);
        if self.selected_channel.as_deref() == Some(channel_id) {
            self.selected_channel = None;
            self.selected_topic = None;
            self.notes.clear();
        }
        self.apply_selection_rules().await;
        report
    }

    /// Delete a topic, then reload topics for all channels to keep the
    /// hierarchical view consistent.
    pub async fn delete_topic(&mut self, topic_id: &str) -> ApiResult<()> {
        self.api.delete_topic(topic_id).await?;
        if self.selected_topic.as_deref() == Some(topic_id) {
            self.selected_topic = None;
            self.notes.clear();
        }
        self.reload_all_topics().await;
        self.apply_selection_rules().await;
        Ok(())
    }

    /// Send a note into the selected topic. Content must be non-empty after
    /// trimming; the title is derived from the content. Backend 422s arrive
    /// as [`ApiError::Validation`] with field errors aggregated.
    pub async fn send_note(&mut self, content: &str) -> ApiResult<Note> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ApiError::Validation {
                errors: vec![FieldError {
                    field: "content".to_string(),
                    message: "message must not be empty".to_string(),
                }],
            });
        }
        let Some(topic_id) = self.selected_topic.clone() else {
            return Err(ApiError::Validation {
                errors: vec![FieldError {
                    field: "topic_id".to_string(),
                    message: "no topic selected".to_string(),
                }],
            });
        };

        let request = CreateNoteRequest {
            title: derive_title(content),
            content: content.to_string(),
            content_type: "text".to_string(),
            topic_id,
            organization_id: self.org_id.clone(),
        };
        let note = self.api.create_note(&request).await?;
        self.reload_notes().await;
        Ok(note)
    }

    pub async fn delete_note(&mut self, note_id: &str) -> ApiResult<()> {
        self.api.delete_note(note_id).await?;
        self.reload_notes().await;
        Ok(())
    }

    /// Optimistic like toggle: the local count and rating cache move first,
    /// then the backend call; both are reverted if the call fails.
    pub async fn toggle_like(&mut self, note_id: &str) -> ApiResult<i64> {
        let previous = self.rating_of(note_id);
        let (delta, next) = match previous {
            Some(Rating::Liked) => (-1, None),
            Some(Rating::Disliked) | None => (1, Some(Rating::Liked)),
        };

        self.bump_likes(note_id, delta);
        self.remember_rating(note_id, next);

        if let Err(e) = self.api.give_like(note_id).await {
            self.bump_likes(note_id, -delta);
            self.remember_rating(note_id, previous);
            return Err(e);
        }
        Ok(self.likes_of(note_id))
    }

    /// Optimistic dislike toggle. A previous like is withdrawn (count -1);
    /// the likes count is otherwise untouched.
    pub async fn toggle_dislike(&mut self, note_id: &str) -> ApiResult<i64> {
        let previous = self.rating_of(note_id);
        let (delta, next) = match previous {
            Some(Rating::Disliked) => (0, None),
            Some(Rating::Liked) => (-1, Some(Rating::Disliked)),
            None => (0, Some(Rating::Disliked)),
        };

        self.bump_likes(note_id, delta);
        self.remember_rating(note_id, next);

        if let Err(e) = self.api.give_dislike(note_id).await {
            self.bump_likes(note_id, -delta);
            self.remember_rating(note_id, previous);
            return Err(e);
        }
        Ok(self.likes_of(note_id))
    }

    fn rating_of(&self, note_id: &str) -> Option<Rating> {
        self.ratings.get(note_id).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "rating cache unreadable");
            None
        })
    }

    fn remember_rating(&self, note_id: &str, rating: Option<Rating>) {
        if let Err(e) = self.ratings.set(note_id, rating) {
            tracing::warn!(error = %e, "failed to persist rating");
        }
    }

    fn bump_likes(&mut self, note_id: &str, delta: i64) {
        if let Some(note) = self.notes.iter_mut().find(|n| n.id == note_id) {
            note.likes += delta;
        }
    }

    fn likes_of(&self, note_id: &str) -> i64 {
        self.notes
            .iter()
            .find(|n| n.id == note_id)
            .map(|n| n.likes)
            .unwrap_or(0)
    }

    /// Stage a file for upload. Staging is local; nothing is sent until
    /// [`upload_attachment`](Self::upload_attachment) is called.
    pub fn stage_attachment(&mut self, filename: impl Into<String>, bytes: Vec<u8>) {
        self.staged_attachment = Some((filename.into(), bytes));
    }

    pub fn staged_attachment_name(&self) -> Option<&str> {
        self.staged_attachment.as_ref().map(|(name, _)| name.as_str())
    }

    /// Upload the staged file and return its URL. The URL is handed to the
    /// caller; it is not attached to the next note.
    pub async fn upload_attachment(&mut self) -> ApiResult<String> {
        let Some((filename, bytes)) = self.staged_attachment.take() else {
            return Err(ApiError::Validation {
                errors: vec![FieldError {
                    field: "file".to_string(),
                    message: "no file staged".to_string(),
                }],
            });
        };
        match self.api.upload_file(&filename, bytes).await {
            Ok(response) => Ok(response.file_url),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;
    use studyhub_core::config::ClientConfig;

    fn offline_workspace(dir: &std::path::Path) -> Workspace {
        let config = ClientConfig {
            base_url: "http://localhost:1".to_string(),
            request_timeout: Duration::from_secs(1),
            state_dir: PathBuf::from(dir),
        };
        let api = ApiClient::new(&config).unwrap();
        Workspace::new(api, RatingStore::new(dir), "1")
    }

    #[test]
    fn clearing_selection_drops_dependent_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut workspace = offline_workspace(dir.path());
        workspace.selected_channel = Some("11".to_string());
        workspace.selected_topic = Some("21".to_string());
        workspace.notes = vec![serde_json::from_value(serde_json::json!({
            "id": 31, "content": "hi", "topic_id": 21
        }))
        .unwrap()];

        workspace.clear_selection();

        assert!(workspace.selected_channel.is_none());
        assert!(workspace.selected_topic.is_none());
        assert!(workspace.notes.is_empty());
    }

    #[test]
    fn title_of_short_content_is_the_content() {
        assert_eq!(derive_title("Hello"), "Hello");
        let exactly_fifty = "a".repeat(50);
        assert_eq!(derive_title(&exactly_fifty), exactly_fifty);
    }

    #[test]
    fn title_of_long_content_is_first_fifty_chars_plus_ellipsis() {
        let content = "b".repeat(51);
        let title = derive_title(&content);
        assert_eq!(title, format!("{}...", "b".repeat(50)));
        assert_eq!(title.chars().count(), 53);
    }

    #[test]
    fn title_derivation_respects_char_boundaries() {
        let content = "é".repeat(60);
        let title = derive_title(&content);
        assert!(title.starts_with(&"é".repeat(50)));
        assert!(title.ends_with("..."));
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id;

/// A chat-like content item within a topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    #[serde(deserialize_with = "id::string_id", alias = "note_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub content: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(deserialize_with = "id::string_id")]
    pub topic_id: String,
    #[serde(deserialize_with = "id::opt_string_id", default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub likes: i64,
}

fn default_content_type() -> String {
    "text".to_string()
}

/// Request DTO for POST /notes/.
#[derive(Debug, Clone, Serialize)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
    pub content_type: String,
    pub topic_id: String,
    pub organization_id: String,
}

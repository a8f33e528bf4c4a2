use serde::{Deserialize, Serialize};

use super::id;

/// A thread within a channel, containing notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    #[serde(deserialize_with = "id::string_id", alias = "topic_id")]
    pub id: String,
    #[serde(alias = "name")]
    pub topic_name: String,
    #[serde(deserialize_with = "id::string_id")]
    pub channel_id: String,
}

/// Request DTO for POST /topics/.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTopicRequest {
    pub topic_name: String,
    pub channel_id: String,
    pub organization_id: String,
}

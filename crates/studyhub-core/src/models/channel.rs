use serde::{Deserialize, Serialize};

use super::id;

/// A subject/course-like grouping within an organization, containing topics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    #[serde(deserialize_with = "id::string_id", alias = "channel_id")]
    pub id: String,
    #[serde(alias = "name")]
    pub channel_name: String,
    #[serde(deserialize_with = "id::string_id")]
    pub organization_id: String,
}

/// Request DTO for POST /channels/.
#[derive(Debug, Clone, Serialize)]
pub struct CreateChannelRequest {
    pub channel_name: String,
    pub organization_id: String,
}

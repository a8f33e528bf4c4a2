use serde::{Deserialize, Serialize};

/// Response of POST /upload. The returned URL is handed back to the caller;
/// it is not wired into the next note payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(alias = "url")]
    pub file_url: String,
}

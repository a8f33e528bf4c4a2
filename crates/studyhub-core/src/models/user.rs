use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id;

/// User entity. The backend serves snake_case; older payloads use camelCase,
/// both are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "id::string_id", alias = "user_id")]
    pub id: String,
    pub email: String,
    pub username: String,
    #[serde(alias = "firstName", default)]
    pub first_name: String,
    #[serde(alias = "lastName", default)]
    pub last_name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(alias = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(alias = "updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// Request DTO for POST /auth/register.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Response of POST /auth/login.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}
